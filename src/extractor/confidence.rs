//! Confidence scoring for candidate rules produced by the pattern battery.
//!
//! Total confidence is a weighted sum of four sub-scores, clamped to
//! `[0.0, 1.0]`. Fallback extraction methods apply a cap on top of the
//! computed value (see [`ConfidenceScore::capped`]).

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Weights applied to each sub-score. Configuration, not a compile-time constant,
/// per the open question on confidence-weight provenance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceWeights {
    pub pattern_match_quality: f64,
    pub classical_term_density: f64,
    pub structure_score: f64,
    pub completeness: f64,
}

impl Default for ConfidenceWeights {
    fn default() -> Self {
        Self {
            pattern_match_quality: 0.40,
            classical_term_density: 0.25,
            structure_score: 0.20,
            completeness: 0.15,
        }
    }
}

/// The four sub-scores computed for a single candidate sentence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceBreakdown {
    /// Fraction of {planet, house_or_sign, effect} present, in [0, 1].
    pub pattern_match_quality: f64,
    /// `min(1.0, lexicon_term_count * 0.1)`.
    pub classical_term_density: f64,
    /// Sentence-length and subject/verb/object heuristic, in [0, 1].
    pub structure_score: f64,
    /// Bonus for having both a condition and an explicit effect.
    pub completeness: f64,
}

impl ConfidenceBreakdown {
    fn validate(&self) -> Result<()> {
        let fields = [
            self.pattern_match_quality,
            self.classical_term_density,
            self.structure_score,
            self.completeness,
        ];
        for v in fields {
            if !(0.0..=1.0).contains(&v) {
                return Err(Error::ValidationError(format!(
                    "confidence sub-score out of range: {v}"
                )));
            }
        }
        Ok(())
    }
}

/**
 * A computed, weighted confidence value together with the inputs that produced it.
 *
 * DESIGN DECISION: confidence is a weighted sum of four independent
 * sub-scores (`ConfidenceBreakdown`) rather than a single heuristic.
 * WHY: each sub-score answers a different question — did the pattern
 * battery find a recognizable shape, how dense is the classical vocabulary,
 * does the sentence look well-formed, is the claim complete — and a caller
 * tuning extraction quality for a specific source (e.g. a noisier OCR scan)
 * needs to reweight those independently rather than retune one opaque number.
 *
 * REASONING CHAIN:
 * 1. `ConfidenceBreakdown::validate` rejects any sub-score outside [0, 1]
 *    before the weighted sum runs, so a bug upstream in the battery can't
 *    silently produce a nonsensical total.
 * 2. The weighted sum is clamped to [0, 1] again afterward as a belt-and-
 *    suspenders guard against a weight set that doesn't sum to 1.0.
 * 3. `capped` is a separate, later step: it models "this confidence came
 *    from a fallback strategy, not a real pattern match" and can only ever
 *    lower the value, never raise it.
 *
 * RELATED: `ConfidenceWeights` (the runtime-configurable weight set),
 * `extractor::mod::RuleExtractor::finish` (where breakdown and cap are assembled)
 */
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceScore {
    value: f64,
    breakdown: ConfidenceBreakdown,
}

impl ConfidenceScore {
    pub fn calculate(breakdown: ConfidenceBreakdown, weights: &ConfidenceWeights) -> Result<Self> {
        breakdown.validate()?;
        let value = breakdown.pattern_match_quality * weights.pattern_match_quality
            + breakdown.classical_term_density * weights.classical_term_density
            + breakdown.structure_score * weights.structure_score
            + breakdown.completeness * weights.completeness;
        Ok(Self {
            value: value.clamp(0.0, 1.0),
            breakdown,
        })
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn breakdown(&self) -> &ConfidenceBreakdown {
        &self.breakdown
    }

    /// Apply a fallback-strategy cap (0.55 relaxed, 0.40 keyword-only) on top of the
    /// computed value. The cap never raises confidence, only lowers it.
    pub fn capped(mut self, cap: f64) -> Self {
        self.value = self.value.min(cap);
        self
    }
}
