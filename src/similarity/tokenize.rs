// Tokenization and stop-word filtering for TF-IDF.
//
// A token is a maximal run of word characters (alphanumeric or underscore)
// at least two characters long, lowercased. Tokens on the stop-word list
// never enter the vocabulary.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use stop_words::{get, LANGUAGE};

static ENGLISH: OnceLock<HashSet<String>> = OnceLock::new();

/// Which stop-word list to apply while building the vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StopWordList {
    /// English list from the `stop-words` crate (default)
    #[default]
    English,
    /// Keep every token
    Disabled,
}

impl StopWordList {
    /// Stable name used in config values and the corpus fingerprint.
    pub fn label(&self) -> &'static str {
        match self {
            StopWordList::English => "english",
            StopWordList::Disabled => "none",
        }
    }

    /// Check whether a lowercased token is a stop word under this list.
    pub fn contains(&self, token: &str) -> bool {
        match self {
            StopWordList::English => english_stop_words().contains(token),
            StopWordList::Disabled => false,
        }
    }
}

impl fmt::Display for StopWordList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for StopWordList {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "english" | "en" => Ok(StopWordList::English),
            "none" | "off" => Ok(StopWordList::Disabled),
            other => Err(format!(
                "unknown stop-word list {other:?} (expected: english or none)"
            )),
        }
    }
}

fn english_stop_words() -> &'static HashSet<String> {
    ENGLISH.get_or_init(|| {
        get(LANGUAGE::English)
            .into_iter()
            .map(|w| w.to_lowercase())
            .collect()
    })
}

/// Split text into lowercase tokens of two or more word characters,
/// dropping stop words.
pub fn tokenize(text: &str, stop_words: StopWordList) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|s| s.chars().count() >= 2)
        .filter(|s| !stop_words.contains(s))
        .map(|s| s.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_drops_stop_words() {
        let tokens = tokenize("The cats are purring", StopWordList::English);
        assert_eq!(tokens, vec!["cats", "purring"]);
    }

    #[test]
    fn test_tokenize_drops_single_characters() {
        // "don't" splits into "don" and "t"; the lone "t" is too short
        let tokens = tokenize("x don't y", StopWordList::Disabled);
        assert_eq!(tokens, vec!["don"]);
    }

    #[test]
    fn test_tokenize_keeps_unicode_words() {
        let tokens = tokenize("Öneri sistemi çalışıyor", StopWordList::Disabled);
        assert_eq!(tokens, vec!["öneri", "sistemi", "çalışıyor"]);
    }

    #[test]
    fn test_tokenize_disabled_keeps_everything() {
        let tokens = tokenize("the stock market", StopWordList::Disabled);
        assert_eq!(tokens, vec!["the", "stock", "market"]);
    }

    #[test]
    fn test_tokenize_underscores_and_digits_are_word_chars() {
        let tokens = tokenize("snake_case 2024, v2", StopWordList::Disabled);
        assert_eq!(tokens, vec!["snake_case", "2024", "v2"]);
    }

    #[test]
    fn test_stop_word_list_parse() {
        assert_eq!("English".parse::<StopWordList>().unwrap(), StopWordList::English);
        assert_eq!(" none ".parse::<StopWordList>().unwrap(), StopWordList::Disabled);
        assert!("klingon".parse::<StopWordList>().is_err());
    }
}
