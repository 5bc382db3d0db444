//! Word-boundary and phrase post-filtering
//!
//! The native search primitive matches substrings, so "faith" also hits
//! "faithfulness". When the caller asks for word-boundary semantics, every
//! candidate verse is re-checked against punctuation-stripped word tokens;
//! phrase searches additionally require the words to appear contiguously
//! and in order.

/// Split text into word tokens, punctuation stripped; tokens are lowercased
/// unless the match is case sensitive.
///
/// Anything non-alphanumeric counts as punctuation, so curly quotes and
/// dashes in non-English modules do not stay glued to their words.
pub fn tokenize(text: &str, case_sensitive: bool) -> Vec<String> {
    text.split_whitespace()
        .map(|word| {
            let token: String = word.chars().filter(|c| c.is_alphanumeric()).collect();
            if case_sensitive {
                token
            } else {
                token.to_lowercase()
            }
        })
        .filter(|token| !token.is_empty())
        .collect()
}

/// Every word appears as a whole token
pub fn contains_all_words(tokens: &[String], words: &[String]) -> bool {
    words.iter().all(|word| tokens.contains(word))
}

/// The words appear contiguously and in order.
///
/// Sliding window: at each position where the first word matches, check the
/// remaining words at consecutive offsets; the first full match wins.
pub fn contains_phrase(tokens: &[String], words: &[String]) -> Option<usize> {
    if words.is_empty() || words.len() > tokens.len() {
        return None;
    }

    for start in 0..=(tokens.len() - words.len()) {
        if tokens[start] != words[0] {
            continue;
        }
        if words
            .iter()
            .enumerate()
            .all(|(offset, word)| tokens[start + offset] == *word)
        {
            return Some(start);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(text: &str) -> Vec<String> {
        tokenize(text, false)
    }

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_tokenize_strips_punctuation() {
        assert_eq!(
            tokens("In the beginning, God created;"),
            words(&["in", "the", "beginning", "god", "created"])
        );
    }

    #[test]
    fn test_tokenize_case_sensitive() {
        assert_eq!(tokenize("God", true), words(&["God"]));
    }

    #[test]
    fn test_tokenize_strips_unicode_punctuation() {
        assert_eq!(
            tokens("\u{201c}Dieu\u{201d} \u{2014} dit-il\u{2026}"),
            words(&["dieu", "ditil"])
        );
    }

    #[test]
    fn test_whole_word_matching() {
        let verse = tokens("great is thy faithfulness");
        assert!(!contains_all_words(&verse, &words(&["faith"])));
        assert!(contains_all_words(&verse, &words(&["faithfulness", "great"])));
    }

    #[test]
    fn test_phrase_match_offset() {
        let verse = tokens("In the beginning God created");
        assert_eq!(contains_phrase(&verse, &words(&["the", "beginning"])), Some(1));
    }

    #[test]
    fn test_phrase_is_order_sensitive() {
        let verse = tokens("In the beginning God created");
        assert_eq!(contains_phrase(&verse, &words(&["beginning", "the"])), None);
    }

    #[test]
    fn test_phrase_requires_contiguity() {
        let verse = tokens("the earth was without form");
        assert_eq!(contains_phrase(&verse, &words(&["the", "was"])), None);
    }

    #[test]
    fn test_phrase_first_match_wins() {
        let verse = tokens("and God said and God saw");
        assert_eq!(contains_phrase(&verse, &words(&["and", "god"])), Some(0));
    }

    #[test]
    fn test_phrase_longer_than_verse() {
        let verse = tokens("amen");
        assert_eq!(contains_phrase(&verse, &words(&["amen", "amen"])), None);
    }
}
