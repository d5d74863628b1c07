//! Centralized error type for the ingestion and knowledge pipeline.

use thiserror::Error;

/// All externally-visible failure kinds of the pipeline.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// PDF could not be opened or decoded.
    #[error("failed to ingest document: {0}")]
    IngestError(String),

    /// `store_rule`/`register_source` referenced a source title that was never registered.
    #[error("unknown source: {0}")]
    UnknownSource(String),

    /// Attempted to change the authority level of an already-registered source.
    #[error("source conflict for {title}: authority level {existing} cannot become {attempted}")]
    SourceConflict {
        title: String,
        existing: u8,
        attempted: u8,
    },

    /// A value violated an invariant from the data model (confidence range, closed vocabulary, ...).
    #[error("validation error: {0}")]
    ValidationError(String),

    /// `store_rule` was called with an id that already exists.
    #[error("duplicate rule: {0}")]
    DuplicateRule(String),

    /// The correction model endpoint could not be reached or timed out.
    #[error("correction model unavailable: {0}")]
    ModelUnavailable(String),

    /// A returned correction failed the post-validation gate.
    #[error("correction rejected for rule {rule_id}: {reason}")]
    CorrectionRejected { rule_id: String, reason: String },

    /// `get_rule`/`apply_correction` referenced an id that does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Underlying storage failure (disk full, corrupt file, ...).
    #[error("storage error: {0}")]
    Storage(String),

    /// Bundle (de)serialization failure during export/import.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Generic I/O failure outside of document ingestion.
    #[error("I/O error: {0}")]
    Io(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Storage(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages_are_readable() {
        let err = Error::UnknownSource("Brihat Parashara Hora Shastra".to_string());
        assert_eq!(
            err.to_string(),
            "unknown source: Brihat Parashara Hora Shastra"
        );

        let err = Error::SourceConflict {
            title: "Saravali".to_string(),
            existing: 1,
            attempted: 3,
        };
        assert!(err.to_string().contains("authority level 1"));
    }

    #[test]
    fn error_is_clone_and_eq() {
        let a = Error::NotFound("rule-1".to_string());
        let b = a.clone();
        assert_eq!(a, b);
        assert_ne!(a, Error::DuplicateRule("rule-1".to_string()));
    }

    #[test]
    fn conversions_propagate_via_question_mark() {
        fn parse() -> Result<serde_json::Value> {
            Ok(serde_json::from_str("not json")?)
        }
        assert!(matches!(parse(), Err(Error::Serialization(_))));
    }
}
