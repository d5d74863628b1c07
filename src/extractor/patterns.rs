/**
 * The ordered pattern battery (§4.2).
 *
 * DESIGN DECISION: one function per pattern shape, each returning `Some`
 * only on a confident, specific match; no shared "try everything and pick
 * the best score" scorer.
 * WHY: astrological sentences are highly formulaic (classical texts reuse a
 * small set of sentence templates), so a first-match battery is both
 * cheaper and more predictable than fuzzy multi-candidate scoring — the
 * caller always knows which named pattern produced a rule from
 * `extraction_method`.
 *
 * REASONING CHAIN:
 * 1. Six sentence shapes cover the bulk of classical placement/lordship/
 *    nakshatra/yoga phrasing (basic placement, ascendant-qualified
 *    placement, aspect/conjunction, house lordship, nakshatra, yoga).
 * 2. Each shape gets its own regex and lookup, so a false match in one
 *    pattern can't leak into another's field extraction.
 * 3. `RuleExtractor::extract_clause` tries them in priority order and stops
 *    at the first match; everything it doesn't recognize falls through to
 *    the two capped fallback strategies.
 * 4. `ascendant_specific` runs ahead of `basic_placement` in that order
 *    even though it is priority 2, not 1: its regex is strictly more
 *    specific, so ordering it first costs nothing and lets an
 *    ascendant-qualified sentence keep its extra `ascendant` field instead
 *    of being captured by the shorter pattern first.
 *
 * RELATED: `extractor/mod.rs` (battery order, fallback strategies),
 * `lexicon.rs` (the closed-vocabulary lookups each pattern calls into)
 */

use crate::lexicon::{lookup_house, lookup_nakshatra, lookup_planet, lookup_sign, NAMED_YOGAS};
use crate::model::{AspectKind, Category, Conditions, Planet, Sign};
use regex::Regex;
use std::sync::OnceLock;

/// A pattern match: the typed conditions it extracted, the category it
/// implies, and the `extraction_method` identifier for provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternMatch {
    pub conditions: Conditions,
    pub category: Category,
    pub extraction_method: &'static str,
}

fn planet_alt() -> &'static str {
    r"(?:Sun|Moon|Mars|Mercury|Jupiter|Venus|Saturn|Rahu|Ketu)"
}

fn sign_alt() -> &'static str {
    r"(?:Aries|Taurus|Gemini|Cancer|Leo|Virgo|Libra|Scorpio|Sagittarius|Capricorn|Aquarius|Pisces)"
}

fn house_word_alt() -> &'static str {
    r"(?:\d{1,2}(?:st|nd|rd|th)|first|second|third|fourth|fifth|sixth|seventh|eighth|ninth|tenth|eleventh|twelfth|lagna|vyaya)"
}

macro_rules! cached_regex {
    ($name:ident, $body:expr) => {
        fn $name() -> &'static Regex {
            static RE: OnceLock<Regex> = OnceLock::new();
            RE.get_or_init(|| Regex::new(&$body).unwrap())
        }
    };
}

cached_regex!(basic_placement_house_re, format!(
    r"(?i)\b({})\b\s+in\s+(?:the\s+)?({})\s+house\b",
    planet_alt(), house_word_alt()
));
cached_regex!(basic_placement_sign_re, format!(
    r"(?i)\b({})\b\s+in\s+({})\b",
    planet_alt(), sign_alt()
));
cached_regex!(ascendant_specific_re, format!(
    r"(?i)for\s+({})\s+(?:ascendant|lagna),?\s+({})\s+in\s+(?:the\s+)?({})\s+house\b",
    sign_alt(), planet_alt(), house_word_alt()
));
cached_regex!(aspect_re, format!(
    r"(?i)\b({})\b\s+(aspects|conjunct|with)\s+({})\b",
    planet_alt(), planet_alt()
));
cached_regex!(lordship_re, format!(
    r"(?i)(?:the\s+)?lord\s+of\s+(?:the\s+)?({0})\s+in\s+(?:the\s+)?(({0})\s+house|{1})\b",
    house_word_alt(), sign_alt()
));
cached_regex!(nakshatra_re, format!(
    r"(?i)\b({})\b\s+in\s+([A-Za-z]+(?:\s+[A-Za-z]+)?)\s+nakshatra\b",
    planet_alt()
));
cached_regex!(yoga_phrase_re, r"(?i)\b([A-Za-z][A-Za-z\s-]*?)\s+yoga\s+(?:is\s+formed|occurs|gives)\b".to_string());

/// 1. Basic placement: "<Planet> in (the )?<House> house" or "<Planet> in <Sign>".
pub fn basic_placement(clause: &str) -> Option<PatternMatch> {
    if let Some(caps) = basic_placement_house_re().captures(clause) {
        let planet = lookup_planet(&caps[1])?;
        let house = lookup_house(&caps[2])?;
        return Some(PatternMatch {
            conditions: Conditions {
                planet: Some(planet),
                house: Some(house),
                ..Default::default()
            },
            category: Category::PlanetaryPlacement,
            extraction_method: "basic_placement",
        });
    }
    if let Some(caps) = basic_placement_sign_re().captures(clause) {
        let planet = lookup_planet(&caps[1])?;
        let sign = lookup_sign(&caps[2])?;
        return Some(PatternMatch {
            conditions: Conditions {
                planet: Some(planet),
                sign: Some(sign),
                ..Default::default()
            },
            category: Category::PlanetaryPlacement,
            extraction_method: "basic_placement",
        });
    }
    None
}

/// 2. Ascendant specific: "For <Sign> (ascendant|lagna), <Planet> in <House> house".
pub fn ascendant_specific(clause: &str) -> Option<PatternMatch> {
    let caps = ascendant_specific_re().captures(clause)?;
    let ascendant = lookup_sign(&caps[1])?;
    let planet = lookup_planet(&caps[2])?;
    let house = lookup_house(&caps[3])?;
    Some(PatternMatch {
        conditions: Conditions {
            planet: Some(planet),
            house: Some(house),
            ascendant: Some(ascendant),
            ..Default::default()
        },
        category: Category::PlanetaryPlacement,
        extraction_method: "ascendant_specific",
    })
}

/// 3. Aspect / conjunction: "<Planet> (aspects|conjunct|with) <Planet>".
/// The second planet is recorded as a tag (`with:<Planet>`); `conditions`
/// has no second-planet slot in the closed schema.
pub fn aspect(clause: &str) -> Option<(PatternMatch, Vec<String>)> {
    let caps = aspect_re().captures(clause)?;
    let first = lookup_planet(&caps[1])?;
    let kind = match caps[2].to_lowercase().as_str() {
        "aspects" => AspectKind::Aspects,
        "conjunct" => AspectKind::Conjunct,
        "with" => AspectKind::With,
        _ => return None,
    };
    let second = lookup_planet(&caps[3])?;
    Some((
        PatternMatch {
            conditions: Conditions {
                planet: Some(first),
                aspect: Some(kind),
                ..Default::default()
            },
            category: Category::Aspect,
            extraction_method: "aspect",
        },
        vec![format!("with:{}", second.canonical_name())],
    ))
}

/// 4. House lordship: "(The )?lord of (the )?<House> in (the )?<House house|Sign>".
pub fn lordship(clause: &str) -> Option<PatternMatch> {
    let caps = lordship_re().captures(clause)?;
    let lord_of = lookup_house(&caps[1])?;
    let placement_text = &caps[2];

    let mut conditions = Conditions {
        lord_of: Some(lord_of),
        ..Default::default()
    };

    if let Some(house_caps) = Regex::new(&format!(r"(?i)({})\s+house", house_word_alt()))
        .unwrap()
        .captures(placement_text)
    {
        conditions.house = lookup_house(&house_caps[1]);
    } else {
        conditions.sign = lookup_sign(placement_text);
    }

    if conditions.house.is_none() && conditions.sign.is_none() {
        return None;
    }

    Some(PatternMatch {
        conditions,
        category: Category::HouseLordship,
        extraction_method: "lordship",
    })
}

/// 5. Nakshatra: "<Planet> in <Nakshatra> (nakshatra)?".
pub fn nakshatra(clause: &str) -> Option<PatternMatch> {
    let caps = nakshatra_re().captures(clause)?;
    let planet = lookup_planet(&caps[1])?;
    let nakshatra = lookup_nakshatra(caps[2].trim())?;
    Some(PatternMatch {
        conditions: Conditions {
            planet: Some(planet),
            nakshatra: Some(nakshatra),
            ..Default::default()
        },
        category: Category::Nakshatra,
        extraction_method: "nakshatra",
    })
}

/// 6. Yoga: a named yoga from the closed list, or the generic
/// "X yoga (is formed|occurs|gives)" phrase. Planet/house/sign are captured
/// opportunistically from the same clause when present; downstream storage
/// enforces the minimum-condition-key invariant.
pub fn yoga(clause: &str) -> Option<(PatternMatch, Vec<String>)> {
    let lower = clause.to_lowercase();
    let mut yoga_name = NAMED_YOGAS
        .iter()
        .find(|name| lower.contains(&name.to_lowercase()))
        .map(|name| name.to_string());

    if yoga_name.is_none() {
        if let Some(caps) = yoga_phrase_re().captures(clause) {
            yoga_name = Some(format!("{} Yoga", caps[1].trim()));
        }
    }

    let yoga_name = yoga_name?;

    let mut conditions = Conditions::default();
    if let Some(caps) = basic_placement_house_re().captures(clause) {
        conditions.planet = lookup_planet(&caps[1]);
        conditions.house = lookup_house(&caps[2]);
    } else if let Some(caps) = basic_placement_sign_re().captures(clause) {
        conditions.planet = lookup_planet(&caps[1]);
        conditions.sign = lookup_sign(&caps[2]);
    }

    Some((
        PatternMatch {
            conditions,
            category: Category::Yoga,
            extraction_method: "yoga",
        },
        vec![yoga_name],
    ))
}

fn house_only_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(&format!(r"(?i)\b({})\b\s+house", house_word_alt())).unwrap())
}

/// Find the first planet mention anywhere in `clause`, used by the fallback strategies.
pub fn find_planet(clause: &str) -> Option<Planet> {
    let re = Regex::new(&format!(r"(?i)\b({})\b", planet_alt())).ok()?;
    let caps = re.captures(clause)?;
    lookup_planet(&caps[1])
}

/// Find the first "<House> house" mention anywhere in `clause`.
pub fn find_house(clause: &str) -> Option<u8> {
    let caps = house_only_re().captures(clause)?;
    lookup_house(&caps[1])
}

/// Find the first zodiac sign mention anywhere in `clause`.
pub fn find_sign(clause: &str) -> Option<Sign> {
    let re = Regex::new(&format!(r"(?i)\b({})\b", sign_alt())).ok()?;
    let caps = re.captures(clause)?;
    lookup_sign(&caps[1])
}
