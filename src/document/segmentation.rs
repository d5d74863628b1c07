//! Sentence segmentation with abbreviation exceptions.

/// Abbreviations whose trailing `.` must not be treated as a sentence end.
const ABBREVIATIONS: &[&str] = &["mr", "mrs", "dr", "st", "no", "vs", "etc", "ch", "v"];

/// Split `text` into sentences on `.`/`!`/`?`, without splitting after a
/// known abbreviation.
pub fn segment_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();

    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        current.push(c);
        if c == '.' || c == '!' || c == '?' {
            if c == '.' && ends_with_abbreviation(&current) {
                i += 1;
                continue;
            }
            let trimmed = current.trim().to_string();
            if !trimmed.is_empty() {
                sentences.push(trimmed);
            }
            current.clear();
        }
        i += 1;
    }
    let trailing = current.trim().to_string();
    if !trailing.is_empty() {
        sentences.push(trailing);
    }
    sentences
}

fn ends_with_abbreviation(buffer: &str) -> bool {
    let word: String = buffer
        .trim_end_matches('.')
        .chars()
        .rev()
        .take_while(|c| c.is_alphanumeric())
        .collect::<String>()
        .chars()
        .rev()
        .collect();
    ABBREVIATIONS.iter().any(|a| a.eq_ignore_ascii_case(&word))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_terminal_punctuation() {
        let sentences = segment_sentences("Mars in 7th house causes discord. Venus brings wealth!");
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[0], "Mars in 7th house causes discord.");
    }

    #[test]
    fn does_not_split_on_known_abbreviations() {
        let sentences = segment_sentences("St. Mary's text mentions Mars in the 7th house causes discord.");
        assert_eq!(sentences.len(), 1);
    }
}
