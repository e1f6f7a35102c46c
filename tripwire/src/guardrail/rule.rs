//! Decision rules mapping classifier text to a pass/fail verdict.

use std::fmt;
use std::sync::Arc;

type RuleFn = dyn Fn(&str) -> bool + Send + Sync;

/// A function value deciding whether lower-cased classifier text passes.
///
/// Rules are pure: the same text always yields the same answer. Clones share
/// the same function.
#[derive(Clone)]
pub struct DecisionRule {
    label: String,
    rule: Arc<RuleFn>,
}

impl DecisionRule {
    /// Pass iff one of `keywords` appears in the text as a whole word.
    ///
    /// Words are maximal runs of alphanumeric characters, so "math" matches
    /// "yes, this is math." and "not math" but not "mathematics", and "safe"
    /// does not match "unsafe". Keywords should be given in lower case.
    #[must_use]
    pub fn keywords<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keywords: Vec<String> = keywords.into_iter().map(Into::into).collect();
        let label = format!("mentions any of {keywords:?}");
        Self {
            label,
            rule: Arc::new(move |text: &str| {
                text.split(|c: char| !c.is_alphanumeric())
                    .any(|word| keywords.iter().any(|k| k == word))
            }),
        }
    }

    /// Pass iff the text contains one of `needles` anywhere, including
    /// inside longer words.
    #[must_use]
    pub fn substrings<I, S>(needles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let needles: Vec<String> = needles.into_iter().map(Into::into).collect();
        let label = format!("contains any of {needles:?}");
        Self {
            label,
            rule: Arc::new(move |text: &str| needles.iter().any(|n| text.contains(n.as_str()))),
        }
    }

    /// Wrap an arbitrary predicate.
    #[must_use]
    pub fn custom<F>(label: impl Into<String>, rule: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            rule: Arc::new(rule),
        }
    }

    /// Apply the rule.
    #[must_use]
    pub fn passes(&self, text: &str) -> bool {
        (self.rule)(text)
    }

    /// Human-readable description of the rule.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl fmt::Debug for DecisionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DecisionRule").field(&self.label).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_match_whole_words() {
        let rule = DecisionRule::keywords(["yes", "math"]);
        assert!(rule.passes("yes, this is math."));
        assert!(rule.passes("math-related: yes"));
        assert!(!rule.passes("this is about mathematics"));
        assert!(!rule.passes("eyes"));
        assert!(!rule.passes("no, this is about cooking."));
        assert!(!rule.passes(""));
    }

    #[test]
    fn test_negated_answer_still_passes() {
        let rule = DecisionRule::keywords(["yes", "math"]);
        assert!(rule.passes("no, this is not math"));
    }

    #[test]
    fn test_unsafe_is_not_safe() {
        let rule = DecisionRule::keywords(["yes", "safe"]);
        assert!(!rule.passes("unsafe, this could enable harm"));
        assert!(rule.passes("this response is safe"));
    }

    #[test]
    fn test_substrings_match_inside_words() {
        let rule = DecisionRule::substrings(["yes", "safe"]);
        assert!(rule.passes("unsafe, this could enable harm"));
        assert!(rule.passes("eyes"));
        assert!(!rule.passes("harmful"));
    }

    #[test]
    fn test_custom_rule() {
        let rule = DecisionRule::custom("exact yes", |t| t.trim() == "yes");
        assert!(rule.passes(" yes "));
        assert!(!rule.passes("yes, but"));
        assert_eq!(rule.label(), "exact yes");
    }

    #[test]
    fn test_debug_shows_label() {
        let rule = DecisionRule::keywords(["safe"]);
        assert_eq!(format!("{rule:?}"), r#"DecisionRule("mentions any of [\"safe\"]")"#);
    }
}
