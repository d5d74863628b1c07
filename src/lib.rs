//! Turns classical Vedic astrology texts into a searchable, provenance-tracked
//! knowledge base: PDF ingestion and sentence segmentation, pattern-based rule
//! extraction with confidence scoring, an LLM-backed readability corrector
//! gated by non-LLM validation, and a SQLite-backed store with multi-criteria
//! search and export/import.
//!
//! The pipeline is single-threaded and cooperative end to end (document
//! parsing -> extraction -> storage; correction runs as a separate pass over
//! already-stored rules). The [`KnowledgeStore`] is the only shared mutable
//! resource and serializes writes through a single connection.

pub mod config;
pub mod corrector;
pub mod document;
pub mod error;
pub mod extractor;
pub mod ids;
pub mod lexicon;
pub mod model;
pub mod store;

pub use config::PipelineConfig;
pub use corrector::{CorrectionModel, CorrectionReport, Corrector, RawCorrection};
pub use document::DocumentProcessor;
pub use error::{Error, Result};
pub use extractor::{CandidateRule, RuleExtractor};
pub use model::{
    AspectKind, AuthorityLevel, Category, Conditions, Correction, CorrectionTag, Nakshatra,
    Planet, Polarity, Rule, Sign, SourceBook, Strength,
};
pub use store::{Bundle, ImportReport, KnowledgeStore, MergeStrategy, OrderBy, SearchFilters, StoreOutcome};

use chrono::Utc;
use std::path::Path;

/// Counts from a single `ingest_book` pass, surfaced so partial failures are
/// visible without aborting the call (§7 propagation policy).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestReport {
    pub sentences_total: u64,
    pub sentences_astrological: u64,
    pub rules_stored: u64,
    pub average_confidence: f64,
}

/// The whole Document Processor -> Rule Extractor -> Knowledge Store pipeline
/// for one book. `source` is registered first (idempotent if already known);
/// re-running on the same PDF is safe, since rule ids are deterministic.
pub fn ingest_book(
    store: &KnowledgeStore,
    pdf_path: &Path,
    source: SourceBook,
    extractor: &RuleExtractor,
) -> Result<IngestReport> {
    let source = store.register_source(source)?;
    let processed = DocumentProcessor::process_path(pdf_path)?;

    let mut rules_stored = 0u64;
    let mut confidence_sum = 0.0;
    let now = Utc::now();

    for sentence in &processed.sentences {
        for candidate in extractor.extract(&sentence.text)? {
            let rule = Rule {
                id: String::new(),
                original_text: candidate.original_text,
                corrected_text: None,
                conditions: candidate.conditions,
                effects: candidate.effects,
                polarity: candidate.polarity,
                tags: candidate.tags,
                category: candidate.category,
                source_title: source.title.clone(),
                page: Some(sentence.page),
                chapter: None,
                verse: None,
                authority_level: source.authority_level,
                confidence: candidate.confidence,
                extraction_method: candidate.extraction_method,
                correction: None,
                validated: false,
                last_corrected_digest: None,
                created_at: now,
                updated_at: now,
            };

            if let Ok(StoreOutcome::Stored) = store.store_rule(rule) {
                rules_stored += 1;
                confidence_sum += candidate.confidence;
            }
        }
    }

    let average_confidence = if rules_stored > 0 {
        confidence_sum / rules_stored as f64
    } else {
        0.0
    };

    store.record_extraction_stats(
        &source.title,
        processed.sentences_total,
        processed.sentences_astrological,
        rules_stored,
        average_confidence,
        "pattern_battery",
        now,
    )?;

    Ok(IngestReport {
        sentences_total: processed.sentences_total,
        sentences_astrological: processed.sentences_astrological,
        rules_stored,
        average_confidence,
    })
}
