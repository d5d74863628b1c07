//! Deterministic, lexicon-driven text normalization (§4.1 Cleaning). No
//! statistical model is involved anywhere in this stage.

use crate::lexicon::{NAKSHATRA_VARIANTS, PLANET_VARIANTS, SIGN_VARIANTS};
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Counts of how many lines/tokens each cleaning step touched, surfaced in
/// the ingest report for operational visibility.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleaningStats {
    pub header_footer_lines_removed: usize,
    pub dehyphenations: usize,
    pub spacing_repairs: usize,
    pub canonicalizations: usize,
}

/// Left fragments that should NOT be rejoined across a hyphenated line break
/// because the hyphen is part of the word, not an artifact of justified text.
const HYPHENATION_PREFIX_EXCEPTIONS: &[&str] = &["self", "non", "pre", "co", "re", "ex", "semi"];

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[ \t]+").unwrap())
}

fn hyphen_break_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\w+)-\n(\w+)").unwrap())
}

/// Step 1: collapse whitespace runs, then strip lines that recur as the
/// first or last non-empty line on at least 60% of pages (headers/footers).
pub fn strip_headers_and_footers(pages: &[String]) -> (Vec<String>, usize) {
    if pages.is_empty() {
        return (Vec::new(), 0);
    }

    let collapsed: Vec<String> = pages
        .iter()
        .map(|p| whitespace_re().replace_all(p, " ").to_string())
        .collect();

    let mut edge_line_counts: HashMap<String, usize> = HashMap::new();
    for page in &collapsed {
        let lines: Vec<&str> = page.lines().map(|l| l.trim()).filter(|l| !l.is_empty()).collect();
        if let Some(first) = lines.first() {
            if first.len() <= 80 {
                *edge_line_counts.entry(first.to_string()).or_insert(0) += 1;
            }
        }
        if let Some(last) = lines.last() {
            if last.len() <= 80 {
                *edge_line_counts.entry(last.to_string()).or_insert(0) += 1;
            }
        }
    }

    let threshold = ((pages.len() as f64) * 0.6).ceil() as usize;
    let repeated: Vec<String> = edge_line_counts
        .into_iter()
        .filter(|(_, count)| *count >= threshold.max(2))
        .map(|(line, _)| line)
        .collect();

    let mut removed = 0usize;
    let cleaned = collapsed
        .into_iter()
        .map(|page| {
            page.lines()
                .filter(|line| {
                    let trimmed = line.trim();
                    if repeated.iter().any(|r| r == trimmed) {
                        removed += 1;
                        false
                    } else {
                        true
                    }
                })
                .collect::<Vec<_>>()
                .join("\n")
        })
        .collect();

    (cleaned, removed)
}

/// Step 2: undo hyphenation across a line break, unless the left fragment is
/// a known prefix (in which case the hyphen is meaningful).
pub fn undo_hyphenation(text: &str) -> (String, usize) {
    let mut count = 0;
    let result = hyphen_break_re()
        .replace_all(text, |caps: &regex::Captures| {
            let left = &caps[1];
            let right = &caps[2];
            if HYPHENATION_PREFIX_EXCEPTIONS
                .iter()
                .any(|p| p.eq_ignore_ascii_case(left))
            {
                format!("{left}-{right}")
            } else {
                count += 1;
                format!("{left}{right}")
            }
        })
        .to_string();
    (result, count)
}

/// Step 3: re-insert spaces at OCR-glued boundaries using the fixed
/// astrological lexicon plus ordinal words, lexicon-driven only.
pub fn repair_spacing(text: &str) -> (String, usize) {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"(?i)\b(\d{1,2})(st|nd|rd|th)([a-z])").unwrap());

    let mut count = 0;
    let text = re
        .replace_all(text, |caps: &regex::Captures| {
            count += 1;
            format!("{}{} {}", &caps[1], &caps[2], &caps[3])
        })
        .to_string();

    let mut terms: Vec<&str> = Vec::new();
    terms.extend(PLANET_VARIANTS.iter().map(|(v, _)| *v));
    terms.extend(SIGN_VARIANTS.iter().map(|(v, _)| *v));
    terms.extend(NAKSHATRA_VARIANTS.iter().map(|(v, _)| *v));
    terms.extend(["lagna", "dasha", "yoga", "bhava"]);
    // Longest-first so multi-word nakshatra names are matched before their substrings.
    terms.sort_by_key(|t| std::cmp::Reverse(t.len()));

    let mut result = text;
    for term in terms {
        let pattern = format!(r"(?i)([a-z])({})", regex::escape(term));
        if let Ok(re) = Regex::new(&pattern) {
            let replaced = re.replace_all(&result, |caps: &regex::Captures| {
                count += 1;
                format!("{} {}", &caps[1], &caps[2])
            });
            result = replaced.to_string();
        }
    }

    (result, count)
}

/// Step 4: normalize planet/sign variant spellings to their canonical form.
pub fn canonicalize_spellings(text: &str) -> (String, usize) {
    let mut count = 0;
    let mut result = text.to_string();

    for (variant, planet) in PLANET_VARIANTS {
        let pattern = format!(r"(?i)\b{}\b", regex::escape(variant));
        if let Ok(re) = Regex::new(&pattern) {
            if re.is_match(&result) {
                count += re.find_iter(&result).count();
                result = re.replace_all(&result, planet.canonical_name()).to_string();
            }
        }
    }
    for (variant, sign) in SIGN_VARIANTS {
        let pattern = format!(r"(?i)\b{}\b", regex::escape(variant));
        if let Ok(re) = Regex::new(&pattern) {
            if re.is_match(&result) {
                count += re.find_iter(&result).count();
                result = re.replace_all(&result, sign.canonical_name()).to_string();
            }
        }
    }

    (result, count)
}

/// Run all four cleaning steps over one page's raw text, in spec order.
pub fn clean_page(raw: &str, stats: &mut CleaningStats) -> String {
    let (after_hyphen, dehyph) = undo_hyphenation(raw);
    stats.dehyphenations += dehyph;

    let (after_spacing, spacing) = repair_spacing(&after_hyphen);
    stats.spacing_repairs += spacing;

    let (after_canon, canon) = canonicalize_spellings(&after_spacing);
    stats.canonicalizations += canon;

    after_canon
}
