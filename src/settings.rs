//! Plugin settings, collected from and stored to the host's key-value
//! settings store.
//!
//! The stored rule list is persisted as a JSON string under the
//! `storedWords` key, in the same shape earlier releases used, so existing
//! workspaces keep their rules. Before that, the plugin persisted
//! rules as a separator-encoded `word:tag` string; [`parse_word_list`] still
//! reads that form so it can be migrated through
//! [`WordRule::from_legacy`](crate::models::WordRule::from_legacy).

use anyhow::{Context, Result};
use log::warn;

use crate::host::HostApi;
use crate::models::{WordDictionary, WordRule};

/// Settings-store keys. The names are load-bearing: existing workspaces
/// already hold values under them.
pub mod keys {
    pub const CREATE_MISSING_TAGS: &str = "createMissingTags";
    pub const TAG_PAIR_SEPARATOR: &str = "tagPairSeparator";
    pub const DEBUG_ENABLED: &str = "debugEnabled";
    pub const STORED_WORDS: &str = "storedWords";
}

/// The plugin's user-facing configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// When true, candidate tags missing from the registry are created
    /// during reconciliation; when false they are silently dropped.
    pub create_missing_tags: bool,
    /// Separator between a word and its tags in the settings dialog.
    pub tag_pair_separator: String,
    /// Gates verbose diagnostics.
    pub debug_enabled: bool,
    /// The normalized rule list.
    pub stored_words: Vec<WordRule>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            create_missing_tags: true,
            tag_pair_separator: ":".to_string(),
            debug_enabled: false,
            stored_words: Vec::new(),
        }
    }
}

impl Settings {
    /// Reads all settings from the host store, applying defaults for
    /// missing keys and normalizing the stored rules.
    ///
    /// Rules that do not survive normalization (blank word, no usable tags)
    /// are dropped with a warning rather than failing collection; a rule
    /// list that fails to parse as JSON is an error.
    pub fn collect(host: &dyn HostApi) -> Result<Self> {
        let defaults = Self::default();

        let create_missing_tags =
            read_bool(host, keys::CREATE_MISSING_TAGS)?.unwrap_or(defaults.create_missing_tags);
        let tag_pair_separator = host
            .setting(keys::TAG_PAIR_SEPARATOR)?
            .unwrap_or(defaults.tag_pair_separator);
        let debug_enabled =
            read_bool(host, keys::DEBUG_ENABLED)?.unwrap_or(defaults.debug_enabled);

        let stored_words = match host.setting(keys::STORED_WORDS)? {
            Some(raw) => parse_stored_words(&raw)?,
            None => Vec::new(),
        };

        Ok(Self {
            create_missing_tags,
            tag_pair_separator,
            debug_enabled,
            stored_words,
        })
    }

    /// Writes all settings back to the host store.
    pub fn store(&self, host: &dyn HostApi) -> Result<()> {
        host.set_setting(
            keys::CREATE_MISSING_TAGS,
            &self.create_missing_tags.to_string(),
        )?;
        host.set_setting(keys::TAG_PAIR_SEPARATOR, &self.tag_pair_separator)?;
        host.set_setting(keys::DEBUG_ENABLED, &self.debug_enabled.to_string())?;

        let rules =
            serde_json::to_string(&self.stored_words).context("serializing stored rules")?;
        host.set_setting(keys::STORED_WORDS, &rules)?;
        Ok(())
    }
}

fn read_bool(host: &dyn HostApi, key: &str) -> Result<Option<bool>> {
    match host.setting(key)? {
        Some(raw) => {
            let value = raw
                .parse::<bool>()
                .with_context(|| format!("setting `{key}` is not a boolean: `{raw}`"))?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

fn parse_stored_words(raw: &str) -> Result<Vec<WordRule>> {
    let rules: Vec<WordRule> =
        serde_json::from_str(raw).context("parsing stored rule list")?;

    let total = rules.len();
    let normalized: Vec<WordRule> = rules
        .into_iter()
        .filter_map(WordRule::normalize)
        .collect();

    if normalized.len() < total {
        warn!(
            "dropped {} stored rule(s) with no usable word or tags",
            total - normalized.len()
        );
    }
    Ok(normalized)
}

/// Parses the legacy separator-encoded `word:tag` settings string into a
/// dictionary.
///
/// Each list entry is split on `pair_separator`; the first piece is the
/// word, the rest its tags. Entries with a blank word or no tags at all are
/// skipped. Tags are trimmed but blank tag strings are kept here, as the
/// legacy format did; they are discarded at match time.
pub fn parse_word_list(raw: &str, list_separator: &str, pair_separator: &str) -> WordDictionary {
    let mut dictionary = WordDictionary::new();

    if list_separator.is_empty() || pair_separator.is_empty() {
        return dictionary;
    }

    for entry in raw.split(list_separator) {
        let mut pieces = entry.split(pair_separator).map(str::trim);
        let Some(word) = pieces.next() else {
            continue;
        };
        let tags: Vec<String> = pieces.map(str::to_string).collect();

        if word.is_empty() || tags.is_empty() {
            continue;
        }
        dictionary.insert(word.to_string(), tags);
    }

    dictionary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryHost;

    #[test]
    fn collect_applies_defaults_on_empty_store() {
        let host = MemoryHost::new();
        let settings = Settings::collect(&host).unwrap();

        assert_eq!(settings, Settings::default());
        assert!(settings.create_missing_tags);
        assert_eq!(settings.tag_pair_separator, ":");
        assert!(!settings.debug_enabled);
    }

    #[test]
    fn collect_reads_stored_rules() {
        let host = MemoryHost::new();
        host.set_setting(
            keys::STORED_WORDS,
            r#"[{"word":"invoice","caseSensitive":false,"tags":["finance","todo"]}]"#,
        )
        .unwrap();
        host.set_setting(keys::CREATE_MISSING_TAGS, "false").unwrap();

        let settings = Settings::collect(&host).unwrap();
        assert!(!settings.create_missing_tags);
        assert_eq!(settings.stored_words.len(), 1);
        assert_eq!(settings.stored_words[0].word, "invoice");
        assert_eq!(settings.stored_words[0].tags, vec!["finance", "todo"]);
    }

    #[test]
    fn collect_drops_degenerate_rules() {
        let host = MemoryHost::new();
        host.set_setting(
            keys::STORED_WORDS,
            r#"[{"word":"ok","tags":["a"]},{"word":"","tags":["b"]},{"word":"x","tags":["  "]}]"#,
        )
        .unwrap();

        let settings = Settings::collect(&host).unwrap();
        assert_eq!(settings.stored_words.len(), 1);
        assert_eq!(settings.stored_words[0].word, "ok");
    }

    #[test]
    fn collect_rejects_malformed_rule_json() {
        let host = MemoryHost::new();
        host.set_setting(keys::STORED_WORDS, "not json").unwrap();

        assert!(Settings::collect(&host).is_err());
    }

    #[test]
    fn settings_roundtrip_through_store() {
        let host = MemoryHost::new();
        let settings = Settings {
            create_missing_tags: false,
            tag_pair_separator: ";".to_string(),
            debug_enabled: true,
            stored_words: vec![WordRule::new("Foo", true, ["bar"]).unwrap()],
        };

        settings.store(&host).unwrap();
        let collected = Settings::collect(&host).unwrap();

        assert_eq!(collected, settings);
    }

    #[test]
    fn parse_word_list_splits_entries_and_pairs() {
        let dictionary = parse_word_list("cat:animal:pet\ndog:animal", "\n", ":");

        assert_eq!(
            dictionary.get("cat"),
            Some(&vec!["animal".to_string(), "pet".to_string()])
        );
        assert_eq!(dictionary.get("dog"), Some(&vec!["animal".to_string()]));
    }

    #[test]
    fn parse_word_list_skips_blank_words_and_tagless_entries() {
        let dictionary = parse_word_list("justaword\n:orphantag\nok:tag", "\n", ":");

        assert_eq!(dictionary.len(), 1);
        assert!(dictionary.contains_key("ok"));
    }

    #[test]
    fn parse_word_list_keeps_last_duplicate_key() {
        let dictionary = parse_word_list("cat:first\ncat:second", "\n", ":");

        assert_eq!(dictionary.get("cat"), Some(&vec!["second".to_string()]));
    }
}
