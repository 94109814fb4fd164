//! Rule matching over note bodies.
//!
//! Each stored rule is tested independently against the full note body: the
//! rule's pattern is compiled with its own case-sensitivity flag and checked
//! for a match anywhere in the body. A matching rule contributes its entire
//! tag list once, no matter how often the pattern occurs; the final result
//! is the deduplicated union across all rules.
//!
//! A legacy variant combined all words of one case-sensitivity class into a
//! single alternation regex and ran a global find-all over the body with an
//! iteration safety cap, then mapped matched words back to dictionary keys.
//! That approach is kept here only as history; the per-rule semantics above
//! replaced it and are what this module implements.

use std::collections::BTreeSet;

use regex::RegexBuilder;
use thiserror::Error;

use crate::models::WordRule;

/// A rule whose `word` is not a valid regular expression.
///
/// This fails the entire matching pass for the note; the user must fix the
/// offending rule.
#[derive(Debug, Error)]
#[error("invalid pattern in rule `{word}`: {source}")]
pub struct MatchError {
    /// The offending rule pattern.
    pub word: String,
    #[source]
    source: regex::Error,
}

/// Scans `body` against every rule and returns the union of tag titles
/// contributed by matching rules.
///
/// An empty rule list yields an empty set without error. Blank tag strings
/// are discarded; the returned set carries no duplicates by construction.
///
/// # Errors
///
/// Returns [`MatchError`] when any rule's pattern fails to compile, even if
/// other rules would have matched.
pub fn find_tags(body: &str, rules: &[WordRule]) -> Result<BTreeSet<String>, MatchError> {
    let mut tags = BTreeSet::new();

    for rule in rules {
        let pattern = RegexBuilder::new(&rule.word)
            .case_insensitive(!rule.case_sensitive)
            .multi_line(true)
            .build()
            .map_err(|source| MatchError {
                word: rule.word.clone(),
                source,
            })?;

        // A match anywhere is enough; one rule contributes at most once.
        if pattern.is_match(body) {
            tags.extend(
                rule.tags
                    .iter()
                    .filter(|tag| !tag.trim().is_empty())
                    .cloned(),
            );
        }
    }

    Ok(tags)
}
