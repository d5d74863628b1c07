//! Closed vocabularies and entity types shared across the pipeline.
//!
//! `conditions` is deliberately a record of optional typed fields rather than
//! an untyped map: every key the extractor can populate has a dedicated slot,
//! so a malformed or unrecognized value is a compile-time or validation-time
//! error instead of a silently-ignored map entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Nine-member classical planet set (navagraha).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Planet {
    Sun,
    Moon,
    Mars,
    Mercury,
    Jupiter,
    Venus,
    Saturn,
    Rahu,
    Ketu,
}

impl Planet {
    pub fn canonical_name(&self) -> &'static str {
        match self {
            Planet::Sun => "Sun",
            Planet::Moon => "Moon",
            Planet::Mars => "Mars",
            Planet::Mercury => "Mercury",
            Planet::Jupiter => "Jupiter",
            Planet::Venus => "Venus",
            Planet::Saturn => "Saturn",
            Planet::Rahu => "Rahu",
            Planet::Ketu => "Ketu",
        }
    }

    /// Inverse of [`Planet::canonical_name`], used to round-trip storage columns.
    pub fn from_canonical_name(s: &str) -> Option<Self> {
        match s {
            "Sun" => Some(Planet::Sun),
            "Moon" => Some(Planet::Moon),
            "Mars" => Some(Planet::Mars),
            "Mercury" => Some(Planet::Mercury),
            "Jupiter" => Some(Planet::Jupiter),
            "Venus" => Some(Planet::Venus),
            "Saturn" => Some(Planet::Saturn),
            "Rahu" => Some(Planet::Rahu),
            "Ketu" => Some(Planet::Ketu),
            _ => None,
        }
    }
}

impl fmt::Display for Planet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_name())
    }
}

/// Twelve zodiac signs, Aries through Pisces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sign {
    Aries,
    Taurus,
    Gemini,
    Cancer,
    Leo,
    Virgo,
    Libra,
    Scorpio,
    Sagittarius,
    Capricorn,
    Aquarius,
    Pisces,
}

impl Sign {
    pub fn canonical_name(&self) -> &'static str {
        match self {
            Sign::Aries => "Aries",
            Sign::Taurus => "Taurus",
            Sign::Gemini => "Gemini",
            Sign::Cancer => "Cancer",
            Sign::Leo => "Leo",
            Sign::Virgo => "Virgo",
            Sign::Libra => "Libra",
            Sign::Scorpio => "Scorpio",
            Sign::Sagittarius => "Sagittarius",
            Sign::Capricorn => "Capricorn",
            Sign::Aquarius => "Aquarius",
            Sign::Pisces => "Pisces",
        }
    }

    pub fn from_canonical_name(s: &str) -> Option<Self> {
        match s {
            "Aries" => Some(Sign::Aries),
            "Taurus" => Some(Sign::Taurus),
            "Gemini" => Some(Sign::Gemini),
            "Cancer" => Some(Sign::Cancer),
            "Leo" => Some(Sign::Leo),
            "Virgo" => Some(Sign::Virgo),
            "Libra" => Some(Sign::Libra),
            "Scorpio" => Some(Sign::Scorpio),
            "Sagittarius" => Some(Sign::Sagittarius),
            "Capricorn" => Some(Sign::Capricorn),
            "Aquarius" => Some(Sign::Aquarius),
            "Pisces" => Some(Sign::Pisces),
            _ => None,
        }
    }
}

impl fmt::Display for Sign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_name())
    }
}

/// Twenty-seven lunar mansions (nakshatras), Ashwini through Revati.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Nakshatra {
    Ashwini,
    Bharani,
    Krittika,
    Rohini,
    Mrigashira,
    Ardra,
    Punarvasu,
    Pushya,
    Ashlesha,
    Magha,
    PurvaPhalguni,
    UttaraPhalguni,
    Hasta,
    Chitra,
    Swati,
    Vishakha,
    Anuradha,
    Jyeshtha,
    Mula,
    PurvaAshadha,
    UttaraAshadha,
    Shravana,
    Dhanishta,
    Shatabhisha,
    PurvaBhadrapada,
    UttaraBhadrapada,
    Revati,
}

impl Nakshatra {
    pub fn canonical_name(&self) -> &'static str {
        match self {
            Nakshatra::Ashwini => "Ashwini",
            Nakshatra::Bharani => "Bharani",
            Nakshatra::Krittika => "Krittika",
            Nakshatra::Rohini => "Rohini",
            Nakshatra::Mrigashira => "Mrigashira",
            Nakshatra::Ardra => "Ardra",
            Nakshatra::Punarvasu => "Punarvasu",
            Nakshatra::Pushya => "Pushya",
            Nakshatra::Ashlesha => "Ashlesha",
            Nakshatra::Magha => "Magha",
            Nakshatra::PurvaPhalguni => "Purva Phalguni",
            Nakshatra::UttaraPhalguni => "Uttara Phalguni",
            Nakshatra::Hasta => "Hasta",
            Nakshatra::Chitra => "Chitra",
            Nakshatra::Swati => "Swati",
            Nakshatra::Vishakha => "Vishakha",
            Nakshatra::Anuradha => "Anuradha",
            Nakshatra::Jyeshtha => "Jyeshtha",
            Nakshatra::Mula => "Mula",
            Nakshatra::PurvaAshadha => "Purva Ashadha",
            Nakshatra::UttaraAshadha => "Uttara Ashadha",
            Nakshatra::Shravana => "Shravana",
            Nakshatra::Dhanishta => "Dhanishta",
            Nakshatra::Shatabhisha => "Shatabhisha",
            Nakshatra::PurvaBhadrapada => "Purva Bhadrapada",
            Nakshatra::UttaraBhadrapada => "Uttara Bhadrapada",
            Nakshatra::Revati => "Revati",
        }
    }

    pub fn from_canonical_name(s: &str) -> Option<Self> {
        match s {
            "Ashwini" => Some(Nakshatra::Ashwini),
            "Bharani" => Some(Nakshatra::Bharani),
            "Krittika" => Some(Nakshatra::Krittika),
            "Rohini" => Some(Nakshatra::Rohini),
            "Mrigashira" => Some(Nakshatra::Mrigashira),
            "Ardra" => Some(Nakshatra::Ardra),
            "Punarvasu" => Some(Nakshatra::Punarvasu),
            "Pushya" => Some(Nakshatra::Pushya),
            "Ashlesha" => Some(Nakshatra::Ashlesha),
            "Magha" => Some(Nakshatra::Magha),
            "Purva Phalguni" => Some(Nakshatra::PurvaPhalguni),
            "Uttara Phalguni" => Some(Nakshatra::UttaraPhalguni),
            "Hasta" => Some(Nakshatra::Hasta),
            "Chitra" => Some(Nakshatra::Chitra),
            "Swati" => Some(Nakshatra::Swati),
            "Vishakha" => Some(Nakshatra::Vishakha),
            "Anuradha" => Some(Nakshatra::Anuradha),
            "Jyeshtha" => Some(Nakshatra::Jyeshtha),
            "Mula" => Some(Nakshatra::Mula),
            "Purva Ashadha" => Some(Nakshatra::PurvaAshadha),
            "Uttara Ashadha" => Some(Nakshatra::UttaraAshadha),
            "Shravana" => Some(Nakshatra::Shravana),
            "Dhanishta" => Some(Nakshatra::Dhanishta),
            "Shatabhisha" => Some(Nakshatra::Shatabhisha),
            "Purva Bhadrapada" => Some(Nakshatra::PurvaBhadrapada),
            "Uttara Bhadrapada" => Some(Nakshatra::UttaraBhadrapada),
            "Revati" => Some(Nakshatra::Revati),
            _ => None,
        }
    }
}

impl fmt::Display for Nakshatra {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_name())
    }
}

/// Relationship a planet can hold with another, as captured by pattern 3 (aspect/conjunction).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AspectKind {
    Aspects,
    Conjunct,
    With,
}

impl AspectKind {
    pub fn canonical_name(&self) -> &'static str {
        match self {
            AspectKind::Aspects => "aspects",
            AspectKind::Conjunct => "conjunct",
            AspectKind::With => "with",
        }
    }

    pub fn from_canonical_name(s: &str) -> Option<Self> {
        match s {
            "aspects" => Some(AspectKind::Aspects),
            "conjunct" => Some(AspectKind::Conjunct),
            "with" => Some(AspectKind::With),
            _ => None,
        }
    }
}

/// Dignity/strength state a planet can be described as holding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strength {
    Exalted,
    Debilitated,
    OwnSign,
    Moolatrikona,
    Friendly,
    Neutral,
    Enemy,
}

impl Strength {
    pub fn canonical_name(&self) -> &'static str {
        match self {
            Strength::Exalted => "exalted",
            Strength::Debilitated => "debilitated",
            Strength::OwnSign => "own_sign",
            Strength::Moolatrikona => "moolatrikona",
            Strength::Friendly => "friendly",
            Strength::Neutral => "neutral",
            Strength::Enemy => "enemy",
        }
    }

    pub fn from_canonical_name(s: &str) -> Option<Self> {
        match s {
            "exalted" => Some(Strength::Exalted),
            "debilitated" => Some(Strength::Debilitated),
            "own_sign" => Some(Strength::OwnSign),
            "moolatrikona" => Some(Strength::Moolatrikona),
            "friendly" => Some(Strength::Friendly),
            "neutral" => Some(Strength::Neutral),
            "enemy" => Some(Strength::Enemy),
            _ => None,
        }
    }
}

/// `conditions`: a record of optional typed fields. At least one of
/// {planet, house, sign} must be present for a rule to be storable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Conditions {
    pub planet: Option<Planet>,
    pub house: Option<u8>,
    pub sign: Option<Sign>,
    pub nakshatra: Option<Nakshatra>,
    pub aspect: Option<AspectKind>,
    pub strength: Option<Strength>,
    pub lord_of: Option<u8>,
    pub ascendant: Option<Sign>,
}

impl Conditions {
    /// At least one of {planet, house, sign} must be present, per §3.2.
    pub fn has_minimum_key(&self) -> bool {
        self.planet.is_some() || self.house.is_some() || self.sign.is_some()
    }

    /// Deterministic, order-independent string representation used for id derivation.
    pub fn canonical_string(&self) -> String {
        let mut parts = Vec::new();
        if let Some(p) = self.planet {
            parts.push(format!("planet={}", p.canonical_name()));
        }
        if let Some(h) = self.house {
            parts.push(format!("house={h}"));
        }
        if let Some(s) = self.sign {
            parts.push(format!("sign={}", s.canonical_name()));
        }
        if let Some(n) = self.nakshatra {
            parts.push(format!("nakshatra={}", n.canonical_name()));
        }
        if let Some(a) = self.aspect {
            parts.push(format!("aspect={}", a.canonical_name()));
        }
        if let Some(s) = self.strength {
            parts.push(format!("strength={s:?}"));
        }
        if let Some(l) = self.lord_of {
            parts.push(format!("lord_of={l}"));
        }
        if let Some(a) = self.ascendant {
            parts.push(format!("ascendant={}", a.canonical_name()));
        }
        parts.sort();
        parts.join("|")
    }
}

/// 1 = classical, 2 = traditional, 3 = modern. Immutable once assigned to a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AuthorityLevel {
    Classical = 1,
    Traditional = 2,
    Modern = 3,
}

impl AuthorityLevel {
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(AuthorityLevel::Classical),
            2 => Some(AuthorityLevel::Traditional),
            3 => Some(AuthorityLevel::Modern),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Polarity {
    Positive,
    Negative,
    Neutral,
    Mixed,
}

impl Polarity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Polarity::Positive => "positive",
            Polarity::Negative => "negative",
            Polarity::Neutral => "neutral",
            Polarity::Mixed => "mixed",
        }
    }

    pub fn from_str_exact(s: &str) -> Option<Self> {
        match s {
            "positive" => Some(Polarity::Positive),
            "negative" => Some(Polarity::Negative),
            "neutral" => Some(Polarity::Neutral),
            "mixed" => Some(Polarity::Mixed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    PlanetaryPlacement,
    HouseLordship,
    Aspect,
    Nakshatra,
    Yoga,
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::PlanetaryPlacement => "planetary_placement",
            Category::HouseLordship => "house_lordship",
            Category::Aspect => "aspect",
            Category::Nakshatra => "nakshatra",
            Category::Yoga => "yoga",
            Category::Other => "other",
        }
    }

    pub fn from_str_exact(s: &str) -> Option<Self> {
        match s {
            "planetary_placement" => Some(Category::PlanetaryPlacement),
            "house_lordship" => Some(Category::HouseLordship),
            "aspect" => Some(Category::Aspect),
            "nakshatra" => Some(Category::Nakshatra),
            "yoga" => Some(Category::Yoga),
            "other" => Some(Category::Other),
            _ => None,
        }
    }
}

/// Tags a correction is allowed to self-report, per the LLM prompt contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CorrectionTag {
    Spacing,
    Hyphenation,
    Punctuation,
    Spelling,
    SanskritPreservation,
    Grammar,
}

impl CorrectionTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            CorrectionTag::Spacing => "spacing",
            CorrectionTag::Hyphenation => "hyphenation",
            CorrectionTag::Punctuation => "punctuation",
            CorrectionTag::Spelling => "spelling",
            CorrectionTag::SanskritPreservation => "sanskrit_preservation",
            CorrectionTag::Grammar => "grammar",
        }
    }

    pub fn from_str_exact(s: &str) -> Option<Self> {
        match s {
            "spacing" => Some(CorrectionTag::Spacing),
            "hyphenation" => Some(CorrectionTag::Hyphenation),
            "punctuation" => Some(CorrectionTag::Punctuation),
            "spelling" => Some(CorrectionTag::Spelling),
            "sanskrit_preservation" => Some(CorrectionTag::SanskritPreservation),
            "grammar" => Some(CorrectionTag::Grammar),
            _ => None,
        }
    }
}

/// Audit record attached to a rule once the LLM corrector has run on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Correction {
    pub confidence: f64,
    pub fixes_applied: Vec<CorrectionTag>,
    pub model_id: String,
    pub timestamp: DateTime<Utc>,
}

/// A registered book or text acting as the provenance root for rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceBook {
    pub title: String,
    pub author: Option<String>,
    pub authority_level: AuthorityLevel,
    pub registered_at: DateTime<Utc>,
}

impl SourceBook {
    pub fn new(title: impl Into<String>, author: Option<String>, authority_level: AuthorityLevel) -> Self {
        Self {
            title: title.into(),
            author,
            authority_level,
            registered_at: Utc::now(),
        }
    }
}

/**
 * The central entity: a single structured astrological claim with full provenance.
 *
 * DESIGN DECISION: `original_text` and `corrected_text` are two separate
 * fields rather than one field mutated in place.
 * WHY: `id` is derived from `(source_title, original_text, conditions)` —
 * overwriting `original_text` on correction would change a rule's own
 * identity out from under its id, breaking idempotent re-ingest and
 * turning every correction into a silent duplicate-or-orphan. Keeping the
 * original verbatim also preserves what the source text actually said,
 * which `corrected_text` only ever repairs for readability.
 *
 * REASONING CHAIN:
 * 1. `conditions` carries the typed, closed-vocabulary fields the pattern
 *    battery or fallback strategies extracted — never free text.
 * 2. `confidence`/`extraction_method` record how the rule was produced, so
 *    a consumer can weight a `basic_placement` match above a
 *    `keyword_fallback` guess without re-deriving that from `category`.
 * 3. `correction`/`validated`/`last_corrected_digest` track the corrector's
 *    pass over this rule independently of the extraction metadata above —
 *    a rule can be re-corrected without touching how it was originally found.
 *
 * RELATED: `Conditions` (the typed fields), `store::KnowledgeStore::store_rule`
 * (the only writer, recomputes `id` unconditionally)
 */
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,
    pub original_text: String,
    pub corrected_text: Option<String>,
    pub conditions: Conditions,
    pub effects: Vec<String>,
    pub polarity: Polarity,
    pub tags: Vec<String>,
    pub category: Category,
    pub source_title: String,
    pub page: Option<u32>,
    pub chapter: Option<String>,
    pub verse: Option<String>,
    pub authority_level: AuthorityLevel,
    pub confidence: f64,
    pub extraction_method: String,
    pub correction: Option<Correction>,
    pub validated: bool,
    pub last_corrected_digest: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Append-only per-source audit record written after each ingest pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionStats {
    pub source_title: String,
    pub sentences_total: u64,
    pub sentences_astrological: u64,
    pub rules_extracted: u64,
    pub average_confidence: f64,
    pub method: String,
    pub recorded_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conditions_require_at_least_one_primary_key() {
        let empty = Conditions::default();
        assert!(!empty.has_minimum_key());

        let with_planet = Conditions {
            planet: Some(Planet::Mars),
            ..Default::default()
        };
        assert!(with_planet.has_minimum_key());
    }

    #[test]
    fn canonical_string_is_order_independent() {
        let a = Conditions {
            planet: Some(Planet::Mars),
            house: Some(7),
            ..Default::default()
        };
        let b = Conditions {
            house: Some(7),
            planet: Some(Planet::Mars),
            ..Default::default()
        };
        assert_eq!(a.canonical_string(), b.canonical_string());
    }

    #[test]
    fn authority_level_round_trips_through_u8() {
        for lvl in [AuthorityLevel::Classical, AuthorityLevel::Traditional, AuthorityLevel::Modern] {
            assert_eq!(AuthorityLevel::from_u8(lvl.as_u8()), Some(lvl));
        }
        assert_eq!(AuthorityLevel::from_u8(4), None);
    }
}
