//! Effect-phrase extraction (§4.2): split the clause at an effect indicator
//! and fall back to a keyword-category label when no indicator appears.

use crate::lexicon::{category_for_keyword, infer_polarity_from_words, EFFECT_INDICATORS};
use crate::model::Polarity;

/// The effect phrase(s), polarity, and an optional topic tag (e.g.
/// "marriage", "wealth") drawn from the keyword-category map when no
/// effect indicator was present to delimit the phrase directly.
pub struct EffectExtraction {
    pub effects: Vec<String>,
    pub polarity: Polarity,
    pub topic_tag: Option<&'static str>,
}

/// Find the first effect indicator in `clause` and take everything after it
/// as the effect phrase. Falls back to the keyword-category map, and finally
/// to the whole clause, when no indicator is present.
pub fn extract_effects(clause: &str) -> EffectExtraction {
    let lower = clause.to_lowercase();

    for indicator in EFFECT_INDICATORS {
        if let Some(pos) = lower.find(indicator) {
            let after = &clause[pos + indicator.len()..];
            let phrase = after.trim_matches(|c: char| c.is_whitespace() || c == ',' || c == '.');
            if !phrase.is_empty() {
                return EffectExtraction {
                    effects: vec![phrase.to_string()],
                    polarity: infer_polarity_from_words(clause),
                    topic_tag: category_for_keyword(clause),
                };
            }
        }
    }

    EffectExtraction {
        effects: vec![clause.trim().to_string()],
        polarity: infer_polarity_from_words(clause),
        topic_tag: category_for_keyword(clause),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_at_first_effect_indicator() {
        let result = extract_effects("Mars in the 7th house causes discord in marriage");
        assert_eq!(result.effects, vec!["discord in marriage".to_string()]);
        assert_eq!(result.polarity, Polarity::Negative);
    }

    #[test]
    fn falls_back_to_whole_clause_without_indicator() {
        let result = extract_effects("Venus in the 2nd house and family happiness");
        assert_eq!(result.effects, vec!["Venus in the 2nd house and family happiness".to_string()]);
    }
}
