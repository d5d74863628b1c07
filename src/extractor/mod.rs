//! Rule Extractor (component B): turns one relevance-filtered sentence into
//! zero or more candidate rules, via an ordered pattern battery with two
//! capped fallback strategies (§4.2).

pub mod confidence;
pub mod effects;
pub mod patterns;

use crate::error::Result;
use crate::lexicon::{contains_strong_keyword, count_lexicon_terms, EFFECT_INDICATORS};
use crate::model::{Category, Conditions, Polarity};
use confidence::{ConfidenceBreakdown, ConfidenceScore, ConfidenceWeights};
use patterns::PatternMatch;

/// One extracted claim before storage: same shape as [`crate::model::Rule`]
/// minus the fields storage assigns (id, timestamps, authority, source).
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateRule {
    pub original_text: String,
    pub conditions: Conditions,
    pub effects: Vec<String>,
    pub polarity: Polarity,
    pub category: Category,
    pub tags: Vec<String>,
    pub extraction_method: String,
    pub confidence: f64,
}

/**
 * Turns relevance-filtered sentences into candidate rules.
 *
 * DESIGN DECISION: ordered pattern battery with two capped fallback tiers,
 * rather than a single scoring function over all sentences.
 * WHY: confidence needs to mean something comparable across very different
 * extraction paths. A sentence that matched a named pattern (e.g. "Mars in
 * the 7th house") should never rank below a sentence that only weakly
 * implies a claim through loose keyword co-occurrence, even if the
 * four-term weighted score happens to come out close.
 *
 * REASONING CHAIN:
 * 1. Try the six-pattern battery (`extractor::patterns`) first, in priority
 *    order, stop at the first match (see `extract_clause`).
 * 2. If nothing in the battery matches, try `relaxed_fallback`: at least
 *    two of {planet, house, sign} present anywhere in the clause, capped
 *    at 0.55 so it can never outrank a real pattern match.
 * 3. If that fails too, try `keyword_fallback`: one strong keyword plus one
 *    condition token, capped at 0.40.
 * 4. The two caps are fixed constants, not `PipelineConfig` fields — making
 *    them tunable would let a caller erase the floor between
 *    pattern-derived and fallback-derived confidence.
 *
 * RELATED: `extractor::confidence` (the weighted score the battery path
 * computes), `extractor::patterns` (the battery itself)
 */
pub struct RuleExtractor {
    weights: ConfidenceWeights,
    min_confidence: f64,
}

impl Default for RuleExtractor {
    fn default() -> Self {
        Self {
            weights: ConfidenceWeights::default(),
            min_confidence: 0.3,
        }
    }
}

impl RuleExtractor {
    pub fn new(weights: ConfidenceWeights, min_confidence: f64) -> Self {
        Self { weights, min_confidence }
    }

    /// Run the pattern battery over `sentence`, splitting on `;` so each
    /// conjunctive clause is scored independently. Candidates below
    /// `min_confidence` are discarded here, not left for the caller to filter.
    pub fn extract(&self, sentence: &str) -> Result<Vec<CandidateRule>> {
        let mut out = Vec::new();
        for clause in sentence.split(';') {
            let clause = clause.trim();
            if clause.is_empty() {
                continue;
            }
            if let Some(candidate) = self.extract_clause(clause)? {
                // Zero confidence is never storable, regardless of `min_confidence`.
                if candidate.confidence > 0.0 && candidate.confidence >= self.min_confidence {
                    out.push(candidate);
                }
            }
        }
        Ok(out)
    }

    /// Tries the battery in priority order — ascendant-specific (2, promoted
    /// ahead of 1 for the regex-specificity reason below), basic placement
    /// (1), aspect (3), lordship (4), nakshatra (5), yoga (6) — then the two
    /// capped fallbacks. Stops at the first match.
    fn extract_clause(&self, clause: &str) -> Result<Option<CandidateRule>> {
        // `ascendant_specific` is tried first even though it is priority 2: its
        // regex is strictly more specific than `basic_placement`'s and would
        // never fire once the shorter pattern had already matched and returned.
        if let Some(m) = patterns::ascendant_specific(clause) {
            return self.finish(clause, m, Vec::new(), None);
        }
        if let Some(m) = patterns::basic_placement(clause) {
            return self.finish(clause, m, Vec::new(), None);
        }
        if let Some((m, tags)) = patterns::aspect(clause) {
            return self.finish(clause, m, tags, None);
        }
        if let Some(m) = patterns::lordship(clause) {
            return self.finish(clause, m, Vec::new(), None);
        }
        if let Some(m) = patterns::nakshatra(clause) {
            return self.finish(clause, m, Vec::new(), None);
        }
        if let Some((m, tags)) = patterns::yoga(clause) {
            return self.finish(clause, m, tags, None);
        }
        if let Some(candidate) = self.relaxed_fallback(clause)? {
            return Ok(Some(candidate));
        }
        self.keyword_fallback(clause)
    }

    /// Relaxed fallback: at least two of {planet, house, sign} present
    /// anywhere in the clause, confidence capped at 0.55.
    fn relaxed_fallback(&self, clause: &str) -> Result<Option<CandidateRule>> {
        let planet = patterns::find_planet(clause);
        let house = patterns::find_house(clause);
        let sign = patterns::find_sign(clause);

        let hits = [planet.is_some(), house.is_some(), sign.is_some()]
            .iter()
            .filter(|h| **h)
            .count();
        if hits < 2 {
            return Ok(None);
        }

        let conditions = Conditions {
            planet,
            house,
            sign,
            ..Default::default()
        };
        let m = PatternMatch {
            conditions,
            category: Category::Other,
            extraction_method: "relaxed_fallback",
        };
        self.finish(clause, m, Vec::new(), Some(0.55))
    }

    /// Keyword-only fallback: a strong astrological keyword plus at least one
    /// condition token, confidence capped at 0.40.
    fn keyword_fallback(&self, clause: &str) -> Result<Option<CandidateRule>> {
        if !contains_strong_keyword(clause) {
            return Ok(None);
        }

        let planet = patterns::find_planet(clause);
        let house = patterns::find_house(clause);
        let sign = patterns::find_sign(clause);
        if planet.is_none() && house.is_none() && sign.is_none() {
            return Ok(None);
        }

        let conditions = Conditions {
            planet,
            house,
            sign,
            ..Default::default()
        };
        let m = PatternMatch {
            conditions,
            category: Category::Other,
            extraction_method: "keyword_fallback",
        };
        self.finish(clause, m, Vec::new(), Some(0.40))
    }

    fn finish(
        &self,
        clause: &str,
        m: PatternMatch,
        extra_tags: Vec<String>,
        cap: Option<f64>,
    ) -> Result<Option<CandidateRule>> {
        let effect = effects::extract_effects(clause);

        let breakdown = ConfidenceBreakdown {
            pattern_match_quality: pattern_match_quality(&m.conditions, !effect.effects.is_empty()),
            classical_term_density: (count_lexicon_terms(clause) as f64 * 0.1).min(1.0),
            structure_score: structure_score(clause),
            completeness: completeness(&m.conditions, &effect.effects),
        };

        let mut score = ConfidenceScore::calculate(breakdown, &self.weights)?;
        if let Some(cap) = cap {
            score = score.capped(cap);
        }

        let mut tags = extra_tags;
        if let Some(topic) = effect.topic_tag {
            tags.push(topic.to_string());
        }

        Ok(Some(CandidateRule {
            original_text: clause.to_string(),
            conditions: m.conditions,
            effects: effect.effects,
            polarity: effect.polarity,
            category: m.category,
            tags,
            extraction_method: m.extraction_method.to_string(),
            confidence: score.value(),
        }))
    }
}

/// Fraction of {planet, house_or_sign, effect} present, in `[0, 1]`.
fn pattern_match_quality(conditions: &Conditions, has_effect: bool) -> f64 {
    let mut present = 0;
    if conditions.planet.is_some() {
        present += 1;
    }
    if conditions.house.is_some() || conditions.sign.is_some() {
        present += 1;
    }
    if has_effect {
        present += 1;
    }
    present as f64 / 3.0
}

/// Sentence-length and effect-indicator-presence heuristic, in `[0, 1]`.
fn structure_score(clause: &str) -> f64 {
    let len = clause.chars().count();
    let length_component = if (15..=220).contains(&len) { 1.0 } else { 0.5 };
    let lower = clause.to_lowercase();
    let indicator_component = if EFFECT_INDICATORS.iter().any(|i| lower.contains(i)) {
        1.0
    } else {
        0.5
    };
    (length_component + indicator_component) / 2.0
}

/// Bonus for having both a condition and a non-empty extracted effect.
fn completeness(conditions: &Conditions, effects: &[String]) -> f64 {
    if conditions.has_minimum_key() && effects.iter().any(|e| !e.is_empty()) {
        1.0
    } else {
        0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Planet;

    #[test]
    fn basic_placement_sentence_yields_high_confidence_candidate() {
        let extractor = RuleExtractor::default();
        let candidates = extractor
            .extract("Mars in the 7th house causes discord in marriage")
            .unwrap();
        assert_eq!(candidates.len(), 1);
        let c = &candidates[0];
        assert_eq!(c.conditions.planet, Some(Planet::Mars));
        assert_eq!(c.conditions.house, Some(7));
        assert_eq!(c.effects, vec!["discord in marriage".to_string()]);
        assert_eq!(c.extraction_method, "basic_placement");
        assert!(c.confidence > 0.5);
    }

    #[test]
    fn conjunctive_clauses_are_split_and_scored_independently() {
        let extractor = RuleExtractor::default();
        let candidates = extractor
            .extract("Mars in the 7th house causes discord; Venus in the 2nd house brings wealth")
            .unwrap();
        assert_eq!(candidates.len(), 2);
    }

    #[test]
    fn relaxed_fallback_is_capped_at_point_five_five() {
        let extractor = RuleExtractor::default();
        let candidates = extractor
            .extract("Mars situated together with the 7th house region brings change")
            .unwrap();
        if let Some(c) = candidates.iter().find(|c| c.extraction_method == "relaxed_fallback") {
            assert!(c.confidence <= 0.55);
        }
    }

    #[test]
    fn irrelevant_sentence_yields_no_candidates() {
        let extractor = RuleExtractor::default();
        let candidates = extractor.extract("The weather today is pleasant and mild").unwrap();
        assert!(candidates.is_empty());
    }

    #[test]
    fn named_yoga_without_planet_still_produces_a_candidate_tag() {
        let extractor = RuleExtractor::new(ConfidenceWeights::default(), 0.0);
        let candidates = extractor.extract("Gajakesari Yoga gives wealth and fame").unwrap();
        assert_eq!(candidates.len(), 1);
        assert!(candidates[0].tags.contains(&"Gajakesari Yoga".to_string()));
        assert!(!candidates[0].conditions.has_minimum_key());
    }
}
