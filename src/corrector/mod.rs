//! LLM Corrector (component C): repairs OCR-era readability defects in
//! `original_text` without altering astrological identity (§4.3).
//!
//! The model endpoint sits behind [`CorrectionModel`], a narrow blocking
//! trait, so the core crate never depends on a networking stack: production
//! wiring implements it against a real local-model process, tests implement
//! it with a deterministic in-memory stub.

mod validate;

pub use validate::ValidationFailure;

use crate::error::{Error, Result};
use crate::ids::sha256_hex;
use crate::model::{Correction, CorrectionTag, Rule};
use crate::store::KnowledgeStore;
use chrono::Utc;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// One model-produced correction for a single input prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct RawCorrection {
    pub corrected_text: String,
    pub confidence: f64,
    pub tags: Vec<CorrectionTag>,
}

/// A blocking batch-in/batch-out model endpoint. `correct` must return
/// exactly `prompts.len()` corrections, in the same order as `prompts`.
pub trait CorrectionModel: Send + Sync {
    fn correct(&self, prompts: &[String]) -> Result<Vec<RawCorrection>>;

    /// Identifier recorded on every audit row produced from this model's output.
    fn model_id(&self) -> &str;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CorrectionReport {
    pub attempted: u64,
    pub accepted: u64,
    pub rejected: u64,
}

pub struct Corrector {
    model: Arc<dyn CorrectionModel>,
    batch_size: usize,
    timeout: Duration,
}

impl Corrector {
    pub fn new(model: Arc<dyn CorrectionModel>) -> Self {
        Self {
            model,
            batch_size: 5,
            timeout: Duration::from_secs(60),
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Processes up to `limit` stored rules whose `last_corrected_digest`
    /// does not match their current `original_text`, in deterministic
    /// batches. Safe to re-run: already-corrected rules are skipped.
    pub fn correct_pending(&self, store: &KnowledgeStore, limit: u32) -> Result<CorrectionReport> {
        let candidates = store.rules_needing_correction(limit)?;
        let pending: Vec<Rule> = candidates.into_iter().filter(|r| needs_correction(r)).collect();

        let mut report = CorrectionReport::default();
        for batch in pending.chunks(self.batch_size) {
            self.correct_batch(store, batch, &mut report)?;
        }
        Ok(report)
    }

    fn correct_batch(&self, store: &KnowledgeStore, batch: &[Rule], report: &mut CorrectionReport) -> Result<()> {
        report.attempted += batch.len() as u64;

        let prompts: Vec<String> = batch.iter().map(build_prompt).collect();
        let completions = match self.run_with_timeout(prompts) {
            Ok(completions) => completions,
            // Model unavailable: skip the batch, leave digests untouched so it's retried later.
            Err(_) => return Ok(()),
        };

        if completions.len() != batch.len() {
            // Wrong count: discard the entire batch's corrections.
            return Ok(());
        }

        for (rule, completion) in batch.iter().zip(completions) {
            self.apply_one(store, rule, completion, report)?;
        }
        Ok(())
    }

    fn run_with_timeout(&self, prompts: Vec<String>) -> Result<Vec<RawCorrection>> {
        let model = Arc::clone(&self.model);
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let result = model.correct(&prompts);
            let _ = tx.send(result);
        });

        match rx.recv_timeout(self.timeout) {
            Ok(result) => result,
            Err(_) => Err(Error::ModelUnavailable("correction model timed out".to_string())),
        }
    }

    fn apply_one(
        &self,
        store: &KnowledgeStore,
        rule: &Rule,
        completion: RawCorrection,
        report: &mut CorrectionReport,
    ) -> Result<()> {
        let now = Utc::now();

        if let Err(failure) = validate::validate_correction(rule, &completion) {
            store.record_correction_audit(
                &rule.id,
                false,
                Some(&failure.to_string()),
                &[],
                Some(self.model.model_id()),
                Some(completion.confidence),
                now,
            )?;
            report.rejected += 1;
            return Ok(());
        }

        let digest = sha256_hex(&rule.original_text);
        let correction = Correction {
            confidence: completion.confidence,
            fixes_applied: completion.tags.clone(),
            model_id: self.model.model_id().to_string(),
            timestamp: now,
        };
        store.apply_correction(&rule.id, &completion.corrected_text, &correction, &digest, now)?;

        let fixes: Vec<String> = completion.tags.iter().map(|t| t.as_str().to_string()).collect();
        store.record_correction_audit(
            &rule.id,
            true,
            None,
            &fixes,
            Some(self.model.model_id()),
            Some(completion.confidence),
            now,
        )?;
        report.accepted += 1;
        Ok(())
    }
}

fn needs_correction(rule: &Rule) -> bool {
    match &rule.last_corrected_digest {
        Some(digest) => *digest != sha256_hex(&rule.original_text),
        None => true,
    }
}

fn build_prompt(rule: &Rule) -> String {
    format!(
        "Fix only OCR-like defects (word spacing, hyphenation, missing punctuation, spelling) in the \
         following astrological rule text. Preserve every planet, sign, nakshatra, house, and ordinal \
         token verbatim. Do not invent new claims. Text: \"{}\"",
        rule.original_text
    )
}
