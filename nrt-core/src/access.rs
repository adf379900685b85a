//! Allow / deny rule sets
//!
//! Both lists follow the same merge rules:
//!
//! - a batch containing `all` collapses the list to exactly `{all}`
//! - once `{all}` is held it is sticky; later batches are ignored
//! - otherwise batches are unioned and de-duplicated
//!
//! A list that no directive ever set reports its policy default: `allow`
//! falls back to `{all}`, `deny` to `{}`. The fallback is not an explicit
//! `all`, so the first concrete batch replaces it.

use serde::{Serialize, Serializer};
use std::collections::BTreeSet;

/// The wildcard token
pub const ALL: &str = "all";

/// Resolved content of a rule list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleSet {
    /// Exactly `{all}`
    All,
    /// A concrete, de-duplicated set of tokens (possibly empty)
    Only(BTreeSet<String>),
}

impl RuleSet {
    pub fn none() -> Self {
        RuleSet::Only(BTreeSet::new())
    }

    pub fn is_all(&self) -> bool {
        matches!(self, RuleSet::All)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, RuleSet::Only(tokens) if tokens.is_empty())
    }

    /// Tokens in output order: `["all"]` or the sorted concrete tokens
    pub fn tokens(&self) -> Vec<String> {
        match self {
            RuleSet::All => vec![ALL.to_string()],
            RuleSet::Only(tokens) => tokens.iter().cloned().collect(),
        }
    }
}

/// Merge a batch of incoming tokens into an existing explicit rule set.
///
/// `existing` is `None` when nothing was ever set explicitly. An empty batch
/// against `None` stays `None`, which keeps the policy default in force.
pub fn merge(existing: Option<&RuleSet>, incoming: &[String]) -> Option<RuleSet> {
    if incoming.iter().any(|token| token == ALL) {
        return Some(RuleSet::All);
    }
    match existing {
        Some(RuleSet::All) => Some(RuleSet::All),
        Some(RuleSet::Only(held)) => {
            let mut tokens = held.clone();
            tokens.extend(incoming.iter().cloned());
            Some(RuleSet::Only(tokens))
        }
        None if incoming.is_empty() => None,
        None => Some(RuleSet::Only(incoming.iter().cloned().collect())),
    }
}

/// A rule list with its policy default
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessList {
    explicit: Option<RuleSet>,
    fallback: RuleSet,
}

impl AccessList {
    /// An `allow` list: defaults to `{all}`
    pub fn allow() -> Self {
        Self {
            explicit: None,
            fallback: RuleSet::All,
        }
    }

    /// A `deny` list: defaults to `{}`
    pub fn deny() -> Self {
        Self {
            explicit: None,
            fallback: RuleSet::none(),
        }
    }

    /// New list with `incoming` merged in; `self` is untouched
    pub fn merged(&self, incoming: &[String]) -> Self {
        Self {
            explicit: merge(self.explicit.as_ref(), incoming),
            fallback: self.fallback.clone(),
        }
    }

    /// The rules currently in force
    pub fn effective(&self) -> &RuleSet {
        self.explicit.as_ref().unwrap_or(&self.fallback)
    }

    /// Whether any directive set this list explicitly
    pub fn is_explicit(&self) -> bool {
        self.explicit.is_some()
    }

    pub fn is_all(&self) -> bool {
        self.effective().is_all()
    }

    pub fn is_empty(&self) -> bool {
        self.effective().is_empty()
    }

    pub fn tokens(&self) -> Vec<String> {
        self.effective().tokens()
    }
}

impl Serialize for AccessList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.tokens())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_defaults() {
        assert_eq!(AccessList::allow().tokens(), vec!["all"]);
        assert!(AccessList::deny().tokens().is_empty());
        assert!(!AccessList::allow().is_explicit());
    }

    #[test]
    fn test_concrete_batch_replaces_fallback() {
        let allow = AccessList::allow().merged(&batch(&["1.2.3.4"]));
        assert_eq!(allow.tokens(), vec!["1.2.3.4"]);
        assert!(allow.is_explicit());
    }

    #[test]
    fn test_all_absorbs_previous_tokens() {
        let allow = AccessList::allow()
            .merged(&batch(&["1.2.3.4"]))
            .merged(&batch(&["all"]));
        assert_eq!(allow.tokens(), vec!["all"]);
    }

    #[test]
    fn test_all_discards_rest_of_batch() {
        let deny = AccessList::deny().merged(&batch(&["10.0.0.0/8", "all", "1.1.1.1"]));
        assert_eq!(deny.tokens(), vec!["all"]);
    }

    #[test]
    fn test_all_is_sticky() {
        let allow = AccessList::allow()
            .merged(&batch(&["all"]))
            .merged(&batch(&["5.6.7.8"]));
        assert_eq!(allow.tokens(), vec!["all"]);
    }

    #[test]
    fn test_union_deduplicates() {
        let deny = AccessList::deny()
            .merged(&batch(&["1.1.1.1", "2.2.2.2"]))
            .merged(&batch(&["2.2.2.2", "3.3.3.3", "1.1.1.1"]));
        assert_eq!(deny.tokens(), vec!["1.1.1.1", "2.2.2.2", "3.3.3.3"]);
    }

    #[test]
    fn test_empty_batch_is_noop() {
        let deny = AccessList::deny().merged(&batch(&["1.1.1.1"]));
        assert_eq!(deny.merged(&[]), deny);
        assert_eq!(AccessList::allow().merged(&[]), AccessList::allow());
    }

    #[test]
    fn test_merge_is_pure() {
        let held = RuleSet::Only(["a".to_string()].into_iter().collect());
        let merged = merge(Some(&held), &batch(&["b"]));
        assert_eq!(held.tokens(), vec!["a"]);
        assert_eq!(merged.unwrap().tokens(), vec!["a", "b"]);
    }

    #[test]
    fn test_serialize_as_list() {
        let allow = AccessList::allow().merged(&batch(&["b", "a"]));
        assert_eq!(serde_json::to_string(&allow).unwrap(), r#"["a","b"]"#);
    }
}
