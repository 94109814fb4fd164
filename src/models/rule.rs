use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Legacy word:tags mapping, as parsed from the old separator-encoded
/// settings string. Keys are literal words, unique by exact string equality;
/// case folding happens at lookup time, not here.
pub type WordDictionary = BTreeMap<String, Vec<String>>;

/// A user-configured tagging rule: a word pattern, its case-sensitivity
/// flag and the tags to apply when the pattern matches a note body.
///
/// `word` is interpreted as a regular expression. Serialized field names
/// match the stored settings format of earlier plugin releases, so existing
/// rule lists keep working.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordRule {
    /// Regular-expression pattern to test against the note body.
    pub word: String,
    /// When false, the pattern matches case-insensitively.
    #[serde(rename = "caseSensitive", default)]
    pub case_sensitive: bool,
    /// Tags applied when the pattern matches. Never empty for a normalized
    /// rule.
    pub tags: Vec<String>,
}

impl WordRule {
    /// Creates a normalized rule.
    ///
    /// Tags are trimmed and blanks dropped. Returns `None` when the word is
    /// blank or no tag survives, since such a rule could never contribute
    /// anything.
    pub fn new(
        word: impl Into<String>,
        case_sensitive: bool,
        tags: impl IntoIterator<Item = impl Into<String>>,
    ) -> Option<Self> {
        Self {
            word: word.into(),
            case_sensitive,
            tags: tags.into_iter().map(Into::into).collect(),
        }
        .normalize()
    }

    /// Trims tags, drops blank ones and rejects degenerate rules.
    ///
    /// Deserialized rules come in unnormalized; settings collection runs
    /// every stored rule through this before use.
    pub fn normalize(mut self) -> Option<Self> {
        self.word = self.word.trim().to_string();
        self.tags = self
            .tags
            .into_iter()
            .map(|tag| tag.trim().to_string())
            .filter(|tag| !tag.is_empty())
            .collect();

        if self.word.is_empty() || self.tags.is_empty() {
            return None;
        }
        Some(self)
    }

    /// Migrates a legacy word dictionary into rules.
    ///
    /// Legacy words were matched as literal strings and always
    /// case-insensitively, so each word is regex-escaped and each rule
    /// created with `case_sensitive: false`. Entries with no usable tags
    /// are dropped.
    pub fn from_legacy(dictionary: &WordDictionary) -> Vec<Self> {
        dictionary
            .iter()
            .filter_map(|(word, tags)| {
                Self::new(regex::escape(word), false, tags.iter().cloned())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_trims_and_drops_blank_tags() {
        let rule = WordRule::new("invoice", false, [" finance ", "", "todo", "  "])
            .expect("rule should survive normalization");

        assert_eq!(rule.tags, vec!["finance", "todo"]);
    }

    #[test]
    fn rule_with_only_blank_tags_is_rejected() {
        assert_eq!(WordRule::new("invoice", false, ["", "  "]), None);
    }

    #[test]
    fn rule_with_blank_word_is_rejected() {
        assert_eq!(WordRule::new("   ", false, ["finance"]), None);
    }

    #[test]
    fn serde_uses_stored_field_names() {
        let rule = WordRule::new("Foo", true, ["bar"]).unwrap();
        let json = serde_json::to_string(&rule).unwrap();

        assert!(json.contains("\"caseSensitive\":true"));

        let deserialized: WordRule = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, rule);
    }

    #[test]
    fn case_sensitive_defaults_to_false_when_absent() {
        let rule: WordRule =
            serde_json::from_str(r#"{"word":"foo","tags":["bar"]}"#).unwrap();
        assert!(!rule.case_sensitive);
    }

    #[test]
    fn from_legacy_escapes_literal_words() {
        let mut dictionary = WordDictionary::new();
        dictionary.insert("c++".to_string(), vec!["lang".to_string()]);
        dictionary.insert("rust".to_string(), vec!["lang".to_string()]);

        let rules = WordRule::from_legacy(&dictionary);

        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].word, r"c\+\+");
        assert!(!rules[0].case_sensitive);
        assert_eq!(rules[1].word, "rust");
    }

    #[test]
    fn from_legacy_skips_entries_without_tags() {
        let mut dictionary = WordDictionary::new();
        dictionary.insert("orphan".to_string(), vec!["  ".to_string()]);

        assert!(WordRule::from_legacy(&dictionary).is_empty());
    }
}
