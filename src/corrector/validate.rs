//! Mandatory non-LLM post-validation gate (§4.3). This is the sole source of
//! correctness guarantees against a nondeterministic model: a correction is
//! applied only if it passes every check.

use super::RawCorrection;
use crate::lexicon::HOUSE_ORDINALS;
use crate::model::{Conditions, Rule};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationFailure {
    MissingConditionToken(String),
    LengthRatioOutOfRange(f64),
    EffectWordsNotRetained { effect: String, retained_fraction: f64 },
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationFailure::MissingConditionToken(token) => {
                write!(f, "condition token '{token}' missing from corrected text")
            }
            ValidationFailure::LengthRatioOutOfRange(ratio) => {
                write!(f, "length ratio {ratio:.2} outside [0.5, 2.0]")
            }
            ValidationFailure::EffectWordsNotRetained { effect, retained_fraction } => {
                write!(
                    f,
                    "effect phrase '{effect}' retained only {:.0}% of content words",
                    retained_fraction * 100.0
                )
            }
        }
    }
}

/**
 * Runs all four checks from §4.3 and rejects on the first failure.
 *
 * DESIGN DECISION: small, single-purpose `check_*` functions composed by
 * one public entry point, each returning a specific `ValidationFailure`
 * variant rather than a bare bool or a generic error string.
 * WHY: a correction model is the one nondeterministic component in the
 * pipeline; this gate is the sole thing standing between its output and a
 * stored rule, so every rejection needs to be attributable to exactly
 * which guarantee it broke, both for debugging a misbehaving model and for
 * the audit row `Corrector::apply_one` writes on rejection.
 *
 * REASONING CHAIN:
 * 1. `check_condition_tokens` first: every typed condition field the
 *    pattern battery extracted must still appear in the corrected text,
 *    case-insensitively, with house numbers accepted as either a digit or
 *    an ordinal word. A correction that silently drops "Mars" or "7th" has
 *    changed the claim's identity, not just its readability.
 * 2. `check_length_ratio` next: the corrected text must stay within
 *    `[0.5, 2.0]` of the original's length — short-circuits before the
 *    more expensive word-retention check on an obviously truncated or
 *    padded result.
 * 3. `check_effect_retention` last: each effect phrase must keep at least
 *    60% of its content words (>3 chars), so a "fix" can't rewrite the
 *    claimed outcome while leaving the planet/house untouched.
 * 4. UTF-8 validity is not checked explicitly: `RawCorrection::corrected_text`
 *    is a `String`, which the type system already guarantees is valid UTF-8.
 *
 * RELATED: `Corrector::apply_one` (the only caller; records the returned
 * `ValidationFailure` to `correction_audit` on rejection)
 */
pub fn validate_correction(rule: &Rule, completion: &RawCorrection) -> Result<(), ValidationFailure> {
    check_condition_tokens(&rule.conditions, &completion.corrected_text)?;
    check_length_ratio(&rule.original_text, &completion.corrected_text)?;
    check_effect_retention(&rule.effects, &completion.corrected_text)?;
    Ok(())
}

fn check_condition_tokens(conditions: &Conditions, corrected: &str) -> Result<(), ValidationFailure> {
    let lower = corrected.to_lowercase();

    if let Some(p) = conditions.planet {
        require_contains(&lower, p.canonical_name())?;
    }
    if let Some(s) = conditions.sign {
        require_contains(&lower, s.canonical_name())?;
    }
    if let Some(n) = conditions.nakshatra {
        require_contains(&lower, n.canonical_name())?;
    }
    if let Some(a) = conditions.ascendant {
        require_contains(&lower, a.canonical_name())?;
    }
    if let Some(house) = conditions.house {
        require_house_token(&lower, house)?;
    }
    if let Some(lord_of) = conditions.lord_of {
        require_house_token(&lower, lord_of)?;
    }
    Ok(())
}

fn require_contains(lower_corrected: &str, token: &str) -> Result<(), ValidationFailure> {
    if lower_corrected.contains(&token.to_lowercase()) {
        Ok(())
    } else {
        Err(ValidationFailure::MissingConditionToken(token.to_string()))
    }
}

/// A house number may survive correction as a digit form ("7th") or an
/// ordinal word ("seventh"); either spelling satisfies the check.
fn require_house_token(lower_corrected: &str, house: u8) -> Result<(), ValidationFailure> {
    let found = HOUSE_ORDINALS
        .iter()
        .any(|(variant, n)| *n == house && lower_corrected.contains(variant));
    if found {
        Ok(())
    } else {
        Err(ValidationFailure::MissingConditionToken(house.to_string()))
    }
}

fn check_length_ratio(original: &str, corrected: &str) -> Result<(), ValidationFailure> {
    let original_len = original.chars().count().max(1) as f64;
    let corrected_len = corrected.chars().count() as f64;
    let ratio = corrected_len / original_len;
    if (0.5..=2.0).contains(&ratio) {
        Ok(())
    } else {
        Err(ValidationFailure::LengthRatioOutOfRange(ratio))
    }
}

fn check_effect_retention(effects: &[String], corrected: &str) -> Result<(), ValidationFailure> {
    let lower_corrected = corrected.to_lowercase();
    for effect in effects {
        let words: Vec<&str> = effect.split_whitespace().filter(|w| w.len() > 3).collect();
        if words.is_empty() {
            continue;
        }
        let retained = words.iter().filter(|w| lower_corrected.contains(&w.to_lowercase())).count();
        let fraction = retained as f64 / words.len() as f64;
        if fraction < 0.6 {
            return Err(ValidationFailure::EffectWordsNotRetained {
                effect: effect.clone(),
                retained_fraction: fraction,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CorrectionTag, Planet};

    fn rule_with(original: &str, house: Option<u8>, planet: Option<Planet>, effects: Vec<&str>) -> Rule {
        use crate::model::{AuthorityLevel, Category, Polarity};
        let now = chrono::Utc::now();
        Rule {
            id: "r".to_string(),
            original_text: original.to_string(),
            corrected_text: None,
            conditions: Conditions { planet, house, ..Default::default() },
            effects: effects.into_iter().map(|s| s.to_string()).collect(),
            polarity: Polarity::Negative,
            tags: vec![],
            category: Category::PlanetaryPlacement,
            source_title: "Saravali".to_string(),
            page: None,
            chapter: None,
            verse: None,
            authority_level: AuthorityLevel::Classical,
            confidence: 0.8,
            extraction_method: "basic_placement".to_string(),
            correction: None,
            validated: false,
            last_corrected_digest: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn completion(text: &str) -> RawCorrection {
        RawCorrection {
            corrected_text: text.to_string(),
            confidence: 0.9,
            tags: vec![CorrectionTag::Spacing],
        }
    }

    #[test]
    fn passes_when_all_tokens_and_effects_survive() {
        let rule = rule_with(
            "Mars in the7th house causesdiscord in marriage",
            Some(7),
            Some(Planet::Mars),
            vec!["discord in marriage"],
        );
        let result = validate_correction(&rule, &completion("Mars in the 7th house causes discord in marriage"));
        assert!(result.is_ok());
    }

    #[test]
    fn rejects_when_planet_token_dropped() {
        let rule = rule_with("Mars in the 7th house", Some(7), Some(Planet::Mars), vec!["discord"]);
        let result = validate_correction(&rule, &completion("Venus in the 7th house brings discord"));
        assert!(matches!(result, Err(ValidationFailure::MissingConditionToken(_))));
    }

    #[test]
    fn rejects_when_length_ratio_out_of_range() {
        let rule = rule_with("Mars in the 7th house", Some(7), Some(Planet::Mars), vec![]);
        let result = validate_correction(&rule, &completion("Mars"));
        assert!(matches!(result, Err(ValidationFailure::LengthRatioOutOfRange(_))));
    }

    #[test]
    fn accepts_house_token_spelled_as_ordinal_word() {
        let rule = rule_with("Mars in 7th house", Some(7), Some(Planet::Mars), vec!["discord"]);
        let result = validate_correction(&rule, &completion("Mars in the seventh house causes discord"));
        assert!(result.is_ok());
    }
}
