//! Deterministic identifier derivation for stored rules.
//!
//! A rule's id is a pure function of `(source_title, normalized_text, canonical(conditions))`
//! so that re-ingesting the same sentence from the same source twice yields the same id.

use crate::model::Conditions;
use sha2::{Digest, Sha256};

/// SHA-256 of the UTF-8 bytes of `content`, as a lowercase hex string.
pub fn sha256_hex(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

/// The stable id for a rule derived from its source, normalized text, and conditions.
pub fn rule_id(source_title: &str, normalized_text: &str, conditions: &Conditions) -> String {
    let key = format!(
        "{source_title}\u{1}{normalized_text}\u{1}{}",
        conditions.canonical_string()
    );
    sha256_hex(&key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Planet;

    #[test]
    fn same_inputs_yield_same_id() {
        let c = Conditions {
            planet: Some(Planet::Mars),
            house: Some(7),
            ..Default::default()
        };
        let a = rule_id("Saravali", "mars in the 7th house causes discord", &c);
        let b = rule_id("Saravali", "mars in the 7th house causes discord", &c);
        assert_eq!(a, b);
    }

    #[test]
    fn different_text_yields_different_id() {
        let c = Conditions {
            planet: Some(Planet::Mars),
            house: Some(7),
            ..Default::default()
        };
        let a = rule_id("Saravali", "mars in the 7th house causes discord", &c);
        let b = rule_id("Saravali", "mars in the 7th house causes conflict", &c);
        assert_ne!(a, b);
    }

    #[test]
    fn id_is_a_64_char_hex_string() {
        let id = sha256_hex("hello");
        assert_eq!(id.len(), 64);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
