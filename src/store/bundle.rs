//! Export/import bundle format (§4.4, §6): a JSON snapshot of a filtered
//! rule set plus the source rows it references, built to round-trip.

use super::{KnowledgeStore, SearchFilters, StoreOutcome};
use crate::error::{Error, Result};
use crate::model::{Rule, SourceBook};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const SCHEMA_VERSION: &str = "1";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleMetadata {
    pub schema_version: String,
    pub exported_at: DateTime<Utc>,
    pub total_rules: usize,
    pub filters_applied: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bundle {
    pub metadata: BundleMetadata,
    pub sources: Vec<SourceBook>,
    pub rules: Vec<Rule>,
}

/// How `import_bundle` reconciles bundle rows against an existing store.
/// `Append` and `SkipDuplicates` both insert only rows that don't already
/// exist: `store_rule` is idempotent by deterministic id, so there is no
/// non-skipping append to distinguish between them at the storage layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStrategy {
    /// Wipe `rules` and `sources` before importing.
    Replace,
    /// Insert rows that don't already exist; leave existing rows untouched.
    Append,
    /// Same effect as `Append`, named for callers that want to state intent explicitly.
    SkipDuplicates,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportReport {
    pub sources_imported: u64,
    pub rules_imported: u64,
    pub rules_skipped: u64,
}

impl KnowledgeStore {
    /// Rules matching `filters`, plus every source they reference. Importing
    /// the result into an empty store with [`MergeStrategy::Replace`] restores
    /// an identical rule set: `store_rule` recomputes the same id from the
    /// same `(source_title, original_text, conditions)` triple.
    pub fn export(&self, filters: &SearchFilters) -> Result<Bundle> {
        let rules = self.search(filters)?;

        let mut titles: Vec<&str> = rules.iter().map(|r| r.source_title.as_str()).collect();
        titles.sort_unstable();
        titles.dedup();

        let mut sources = Vec::with_capacity(titles.len());
        for title in titles {
            if let Some(source) = self.get_source(title)? {
                sources.push(source);
            }
        }

        Ok(Bundle {
            metadata: BundleMetadata {
                schema_version: SCHEMA_VERSION.to_string(),
                exported_at: Utc::now(),
                total_rules: rules.len(),
                filters_applied: Some(format!("{filters:?}")),
            },
            sources,
            rules,
        })
    }

    pub fn import_bundle(&self, bundle: Bundle, strategy: MergeStrategy) -> Result<ImportReport> {
        if bundle.metadata.schema_version != SCHEMA_VERSION {
            return Err(Error::ValidationError(format!(
                "unsupported bundle schema version: {}",
                bundle.metadata.schema_version
            )));
        }

        if strategy == MergeStrategy::Replace {
            self.clear()?;
        }

        let mut report = ImportReport::default();

        for source in bundle.sources {
            match self.register_source(source) {
                Ok(_) => report.sources_imported += 1,
                Err(Error::SourceConflict { .. }) => {}
                Err(err) => return Err(err),
            }
        }

        for rule in bundle.rules {
            match self.store_rule(rule) {
                Ok(StoreOutcome::Stored) => report.rules_imported += 1,
                Ok(StoreOutcome::Duplicate) => report.rules_skipped += 1,
                Err(_) => report.rules_skipped += 1,
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AuthorityLevel, Conditions, Planet, Polarity};
    use tempfile::tempdir;

    fn rule(source_title: &str, text: &str) -> Rule {
        let now = Utc::now();
        Rule {
            id: String::new(),
            original_text: text.to_string(),
            corrected_text: None,
            conditions: Conditions {
                planet: Some(Planet::Jupiter),
                house: Some(9),
                ..Default::default()
            },
            effects: vec!["fortune in higher learning".to_string()],
            polarity: Polarity::Positive,
            tags: vec![],
            category: crate::model::Category::PlanetaryPlacement,
            source_title: source_title.to_string(),
            page: None,
            chapter: None,
            verse: None,
            authority_level: AuthorityLevel::Classical,
            confidence: 0.75,
            extraction_method: "basic_placement".to_string(),
            correction: None,
            validated: false,
            last_corrected_digest: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn export_then_import_into_fresh_store_round_trips() {
        let source_dir = tempdir().unwrap();
        let source_store = KnowledgeStore::open(source_dir.path().join("a.sqlite")).unwrap();
        source_store
            .register_source(SourceBook::new("Phaladeepika", None, AuthorityLevel::Classical))
            .unwrap();
        source_store
            .store_rule(rule("Phaladeepika", "Jupiter in the 9th house gives fortune in higher learning"))
            .unwrap();

        let bundle = source_store.export(&SearchFilters::new()).unwrap();
        assert_eq!(bundle.metadata.total_rules, 1);

        let dest_dir = tempdir().unwrap();
        let dest_store = KnowledgeStore::open(dest_dir.path().join("b.sqlite")).unwrap();
        let report = dest_store.import_bundle(bundle.clone(), MergeStrategy::Replace).unwrap();
        assert_eq!(report.rules_imported, 1);

        let restored = dest_store.export(&SearchFilters::new()).unwrap();
        assert_eq!(restored.rules.len(), bundle.rules.len());
        assert_eq!(restored.rules[0].id, bundle.rules[0].id);
    }

    #[test]
    fn append_strategy_skips_duplicates_on_reimport() {
        let dir = tempdir().unwrap();
        let store = KnowledgeStore::open(dir.path().join("store.sqlite")).unwrap();
        store
            .register_source(SourceBook::new("Phaladeepika", None, AuthorityLevel::Classical))
            .unwrap();
        store
            .store_rule(rule("Phaladeepika", "Jupiter in the 9th house gives fortune in higher learning"))
            .unwrap();

        let bundle = store.export(&SearchFilters::new()).unwrap();
        let report = store.import_bundle(bundle, MergeStrategy::Append).unwrap();
        assert_eq!(report.rules_imported, 0);
        assert_eq!(report.rules_skipped, 1);
    }
}
