//! Astrological relevance filter (§4.1).

use crate::lexicon::{contains_strong_keyword, NAKSHATRA_VARIANTS, PLANET_VARIANTS, SIGN_VARIANTS};
use regex::Regex;
use std::sync::OnceLock;

fn house_in_context_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b([1-9]|1[0-2])(st|nd|rd|th)\b.{0,20}\b(house|bhava|nakshatra)\b").unwrap()
    })
}

/// A sentence is astrological iff it contains a planet, sign, or nakshatra
/// lexicon term, a house ordinal in context, or a strong astrological keyword.
pub fn is_astrological(sentence: &str) -> bool {
    let lower = sentence.to_lowercase();

    if PLANET_VARIANTS.iter().any(|(v, _)| lower.contains(v)) {
        return true;
    }
    if SIGN_VARIANTS.iter().any(|(v, _)| lower.contains(v)) {
        return true;
    }
    if NAKSHATRA_VARIANTS.iter().any(|(v, _)| lower.contains(v)) {
        return true;
    }
    if house_in_context_re().is_match(sentence) {
        return true;
    }
    contains_strong_keyword(sentence)
}
