//! Classical-text lexicons: spelling variant tables, keyword sets, and the
//! effect-indicator/keyword-category maps used by the document processor and
//! rule extractor. Kept as plain data so the pattern code never has to change
//! when a new spelling variant or yoga name is added.

use crate::model::{AspectKind, Nakshatra, Planet, Sign};

/// `(variant, canonical Planet)` pairs. Lookups are case-insensitive.
pub const PLANET_VARIANTS: &[(&str, Planet)] = &[
    ("sun", Planet::Sun),
    ("surya", Planet::Sun),
    ("ravi", Planet::Sun),
    ("moon", Planet::Moon),
    ("chandra", Planet::Moon),
    ("soma", Planet::Moon),
    ("mars", Planet::Mars),
    ("mangal", Planet::Mars),
    ("mangala", Planet::Mars),
    ("kuja", Planet::Mars),
    ("angaraka", Planet::Mars),
    ("mercury", Planet::Mercury),
    ("budh", Planet::Mercury),
    ("budha", Planet::Mercury),
    ("jupiter", Planet::Jupiter),
    ("guru", Planet::Jupiter),
    ("brihaspati", Planet::Jupiter),
    ("venus", Planet::Venus),
    ("shukra", Planet::Venus),
    ("sukra", Planet::Venus),
    ("saturn", Planet::Saturn),
    ("shani", Planet::Saturn),
    ("sani", Planet::Saturn),
    ("rahu", Planet::Rahu),
    ("ketu", Planet::Ketu),
];

/// `(variant, canonical Sign)` pairs, including Sanskrit names.
pub const SIGN_VARIANTS: &[(&str, Sign)] = &[
    ("aries", Sign::Aries),
    ("mesha", Sign::Aries),
    ("taurus", Sign::Taurus),
    ("vrishabha", Sign::Taurus),
    ("gemini", Sign::Gemini),
    ("mithuna", Sign::Gemini),
    ("cancer", Sign::Cancer),
    ("karka", Sign::Cancer),
    ("leo", Sign::Leo),
    ("simha", Sign::Leo),
    ("virgo", Sign::Virgo),
    ("kanya", Sign::Virgo),
    ("libra", Sign::Libra),
    ("tula", Sign::Libra),
    ("scorpio", Sign::Scorpio),
    ("vrishchika", Sign::Scorpio),
    ("sagittarius", Sign::Sagittarius),
    ("dhanu", Sign::Sagittarius),
    ("capricorn", Sign::Capricorn),
    ("makara", Sign::Capricorn),
    ("aquarius", Sign::Aquarius),
    ("kumbha", Sign::Aquarius),
    ("pisces", Sign::Pisces),
    ("meena", Sign::Pisces),
];

/// `(variant, canonical Nakshatra)` pairs.
pub const NAKSHATRA_VARIANTS: &[(&str, Nakshatra)] = &[
    ("ashwini", Nakshatra::Ashwini),
    ("bharani", Nakshatra::Bharani),
    ("krittika", Nakshatra::Krittika),
    ("rohini", Nakshatra::Rohini),
    ("mrigashira", Nakshatra::Mrigashira),
    ("mrigasira", Nakshatra::Mrigashira),
    ("ardra", Nakshatra::Ardra),
    ("punarvasu", Nakshatra::Punarvasu),
    ("pushya", Nakshatra::Pushya),
    ("ashlesha", Nakshatra::Ashlesha),
    ("magha", Nakshatra::Magha),
    ("purva phalguni", Nakshatra::PurvaPhalguni),
    ("uttara phalguni", Nakshatra::UttaraPhalguni),
    ("hasta", Nakshatra::Hasta),
    ("chitra", Nakshatra::Chitra),
    ("swati", Nakshatra::Swati),
    ("vishakha", Nakshatra::Vishakha),
    ("anuradha", Nakshatra::Anuradha),
    ("jyeshtha", Nakshatra::Jyeshtha),
    ("mula", Nakshatra::Mula),
    ("purva ashadha", Nakshatra::PurvaAshadha),
    ("uttara ashadha", Nakshatra::UttaraAshadha),
    ("shravana", Nakshatra::Shravana),
    ("dhanishta", Nakshatra::Dhanishta),
    ("shatabhisha", Nakshatra::Shatabhisha),
    ("purva bhadrapada", Nakshatra::PurvaBhadrapada),
    ("uttara bhadrapada", Nakshatra::UttaraBhadrapada),
    ("revati", Nakshatra::Revati),
];

/// House ordinal words and Sanskrit bhava names, mapped to their integer house.
/// "13th" and beyond is deliberately absent; lookups outside 1..=12 are rejected.
pub const HOUSE_ORDINALS: &[(&str, u8)] = &[
    ("1st", 1), ("first", 1), ("lagna", 1),
    ("2nd", 2), ("second", 2),
    ("3rd", 3), ("third", 3),
    ("4th", 4), ("fourth", 4),
    ("5th", 5), ("fifth", 5),
    ("6th", 6), ("sixth", 6),
    ("7th", 7), ("seventh", 7),
    ("8th", 8), ("eighth", 8),
    ("9th", 9), ("ninth", 9),
    ("10th", 10), ("tenth", 10),
    ("11th", 11), ("eleventh", 11),
    ("12th", 12), ("twelfth", 12), ("vyaya", 12),
];

/// Words that introduce an aspect/conjunction relationship (pattern 3).
pub const ASPECT_WORDS: &[(&str, AspectKind)] = &[
    ("aspects", AspectKind::Aspects),
    ("aspect", AspectKind::Aspects),
    ("conjunct", AspectKind::Conjunct),
    ("conjunction with", AspectKind::Conjunct),
    ("with", AspectKind::With),
];

/// Named yogas recognized by the yoga pattern (pattern 6). Others are still
/// captured, but only via the generic "X yoga is formed/occurs/gives" phrase.
pub const NAMED_YOGAS: &[&str] = &[
    "Gajakesari Yoga",
    "Raj Yoga",
    "Dhana Yoga",
    "Budhaditya Yoga",
    "Panch Mahapurusha Yoga",
    "Neechabhanga Raja Yoga",
    "Kemadruma Yoga",
    "Chandra-Mangala Yoga",
    "Vipreet Raja Yoga",
    "Kala Sarpa Yoga",
];

/// Verb phrases marking the transition from condition to predicted outcome.
pub const EFFECT_INDICATORS: &[&str] = &[
    "causes", "gives", "indicates", "brings", "creates", "produces",
    "results in", "leads to", "bestows", "grants", "confers",
];

/// Strong astrological keywords used by the relevance filter and the
/// keyword-only fallback extraction strategy.
pub const STRONG_KEYWORDS: &[&str] = &[
    "lagna", "ascendant", "bhava", "dasha", "yoga", "nakshatra",
    "aspect", "conjunct", "exalt", "debilitat", "lord of",
];

/// Dominant keyword class -> derived category label, used when a sentence has
/// no explicit effect indicator.
pub const KEYWORD_CATEGORY_MAP: &[(&str, &str)] = &[
    ("marriage", "marriage"), ("spouse", "marriage"), ("wedding", "marriage"),
    ("wealth", "wealth"), ("money", "wealth"), ("prosperity", "wealth"), ("riches", "wealth"),
    ("career", "career"), ("profession", "career"), ("job", "career"),
    ("health", "health"), ("disease", "health"), ("illness", "health"),
    ("spiritual", "spiritual"), ("moksha", "spiritual"), ("devotion", "spiritual"),
    ("conflict", "conflict"), ("discord", "conflict"), ("enemy", "conflict"), ("dispute", "conflict"),
];

/// Closed positive/negative word lists used to infer polarity when no
/// indicator-driven effect phrase is available.
pub const POSITIVE_WORDS: &[&str] = &[
    "fortune", "prosperity", "success", "wealth", "happiness", "auspicious",
    "gains", "benefic", "favorable", "blessed", "harmony", "courage",
];
pub const NEGATIVE_WORDS: &[&str] = &[
    "discord", "conflict", "affliction", "malefic", "loss", "misfortune",
    "trouble", "obstacle", "illness", "danger", "debilitat", "enmity",
];

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

pub fn lookup_planet(word: &str) -> Option<Planet> {
    let needle = normalize(word);
    PLANET_VARIANTS
        .iter()
        .find(|(variant, _)| *variant == needle)
        .map(|(_, planet)| *planet)
}

pub fn lookup_sign(word: &str) -> Option<Sign> {
    let needle = normalize(word);
    SIGN_VARIANTS
        .iter()
        .find(|(variant, _)| *variant == needle)
        .map(|(_, sign)| *sign)
}

pub fn lookup_nakshatra(phrase: &str) -> Option<Nakshatra> {
    let needle = normalize(phrase);
    NAKSHATRA_VARIANTS
        .iter()
        .find(|(variant, _)| *variant == needle)
        .map(|(_, n)| *n)
}

/// Resolve an ordinal word, digit-suffixed ordinal ("7th"), or bhava name to
/// a house number in 1..=12. Anything outside that range (e.g. "13th") is
/// rejected, per the boundary-behavior contract.
pub fn lookup_house(word: &str) -> Option<u8> {
    let needle = normalize(word);
    if let Some((_, house)) = HOUSE_ORDINALS.iter().find(|(variant, _)| *variant == needle) {
        return Some(*house);
    }
    // Plain digit form ("7") is also accepted.
    if let Ok(n) = needle.parse::<u8>() {
        if (1..=12).contains(&n) {
            return Some(n);
        }
    }
    None
}

pub fn category_for_keyword(text: &str) -> Option<&'static str> {
    let lower = text.to_lowercase();
    KEYWORD_CATEGORY_MAP
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|(_, category)| *category)
}

pub fn contains_strong_keyword(text: &str) -> bool {
    let lower = text.to_lowercase();
    STRONG_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

/// Count how many lexicon terms (planets, signs, nakshatras, strong keywords)
/// appear in `text`, used by `classical_term_density`.
pub fn count_lexicon_terms(text: &str) -> usize {
    let lower = text.to_lowercase();
    let mut count = 0;
    for (variant, _) in PLANET_VARIANTS {
        if lower.contains(variant) {
            count += 1;
        }
    }
    for (variant, _) in SIGN_VARIANTS {
        if lower.contains(variant) {
            count += 1;
        }
    }
    for (variant, _) in NAKSHATRA_VARIANTS {
        if lower.contains(variant) {
            count += 1;
        }
    }
    for kw in STRONG_KEYWORDS {
        if lower.contains(kw) {
            count += 1;
        }
    }
    count
}

pub fn infer_polarity_from_words(text: &str) -> crate::model::Polarity {
    let lower = text.to_lowercase();
    let positive = POSITIVE_WORDS.iter().any(|w| lower.contains(w));
    let negative = NEGATIVE_WORDS.iter().any(|w| lower.contains(w));
    match (positive, negative) {
        (true, true) => crate::model::Polarity::Mixed,
        (true, false) => crate::model::Polarity::Positive,
        (false, true) => crate::model::Polarity::Negative,
        (false, false) => crate::model::Polarity::Neutral,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn planet_variants_resolve_case_insensitively() {
        assert_eq!(lookup_planet("Mangal"), Some(Planet::Mars));
        assert_eq!(lookup_planet("MARS"), Some(Planet::Mars));
        assert_eq!(lookup_planet("pluto"), None);
    }

    #[test]
    fn house_ordinal_boundaries() {
        assert_eq!(lookup_house("1st"), Some(1));
        assert_eq!(lookup_house("Lagna"), Some(1));
        assert_eq!(lookup_house("12th"), Some(12));
        assert_eq!(lookup_house("twelfth"), Some(12));
        assert_eq!(lookup_house("Vyaya"), Some(12));
        assert_eq!(lookup_house("13th"), None);
        assert_eq!(lookup_house("0"), None);
    }

    #[test]
    fn keyword_category_map_picks_dominant_class() {
        assert_eq!(
            category_for_keyword("brings conflicts in marriage"),
            Some("conflict")
        );
    }

    #[test]
    fn polarity_inference_from_closed_word_lists() {
        assert_eq!(
            infer_polarity_from_words("brings great fortune and prosperity"),
            crate::model::Polarity::Positive
        );
        assert_eq!(
            infer_polarity_from_words("causes discord and affliction"),
            crate::model::Polarity::Negative
        );
    }
}
