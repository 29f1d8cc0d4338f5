//! Alias rule and rule group types.

use serde::Deserialize;
use serde::Serialize;

use crate::constants::ORIGIN_GROUP;
use crate::constants::RHUI_GROUP;

/// A single prefix rewrite: paths under `src` are served as paths under `dest`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AliasRule {
    /// Source prefix matched against the request path.
    pub src: String,
    /// Replacement prefix.
    pub dest: String,
}

impl AliasRule {
    pub fn new(src: impl Into<String>, dest: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            dest: dest.into(),
        }
    }

    /// Whether the rule applies to `path`.
    ///
    /// Matches the source prefix only on a path-segment boundary: `/a` matches
    /// `/a` and `/a/b` but not `/ab`.
    pub fn matches(&self, path: &str) -> bool {
        path.strip_prefix(self.src.as_str())
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    }

    /// Replace the first occurrence of the source prefix with the destination.
    ///
    /// Only meaningful when [`AliasRule::matches`] holds, in which case the
    /// first occurrence is the leading one.
    pub fn apply(&self, path: &str) -> String {
        path.replacen(self.src.as_str(), &self.dest, 1)
    }
}

/// An ordered set of rules resolved together to a fixed point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasGroup {
    /// Name used in logs.
    pub name: String,
    /// Rules in input order. Order affects neither termination nor, for
    /// non-conflicting rules, the result.
    #[serde(default)]
    pub rules: Vec<AliasRule>,
    /// Skip this group for directory-listing paths.
    #[serde(default)]
    pub listing_exempt: bool,
}

impl AliasGroup {
    pub fn new(name: impl Into<String>, rules: Vec<AliasRule>) -> Self {
        Self {
            name: name.into(),
            rules,
            listing_exempt: false,
        }
    }

    /// Content-origin aliases, applied to every path.
    pub fn origin(rules: Vec<AliasRule>) -> Self {
        Self::new(ORIGIN_GROUP, rules)
    }

    /// Regional mirror aliases, which leave listing paths untouched.
    pub fn rhui(rules: Vec<AliasRule>) -> Self {
        Self::new(RHUI_GROUP, rules).listing_exempt()
    }

    /// Mark the group as skipped for listing paths.
    pub fn listing_exempt(mut self) -> Self {
        self.listing_exempt = true;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_exact_path() {
        let rule = AliasRule::new("/content/origin", "/origin");
        assert!(rule.matches("/content/origin"));
    }

    #[test]
    fn matches_on_segment_boundary_only() {
        let rule = AliasRule::new("/content/origin", "/origin");
        assert!(rule.matches("/content/origin/rpms"));
        assert!(!rule.matches("/content/originals"));
        assert!(!rule.matches("/other/content/origin"));
    }

    #[test]
    fn source_without_leading_slash_does_not_match_absolute_path() {
        let rule = AliasRule::new("content/origin", "origin");
        assert!(!rule.matches("/content/origin/foo/bar"));
    }

    #[test]
    fn apply_replaces_leading_prefix_once() {
        let rule = AliasRule::new("/a", "/b");
        assert_eq!(rule.apply("/a/x/a"), "/b/x/a");
    }

    #[test]
    fn rhui_group_is_listing_exempt() {
        assert!(AliasGroup::rhui(vec![]).listing_exempt);
        assert!(!AliasGroup::origin(vec![]).listing_exempt);
    }

    #[test]
    fn group_deserializes_with_defaults() {
        let group: AliasGroup = serde_json::from_str(r#"{"name":"custom"}"#).unwrap();
        assert!(group.is_empty());
        assert!(!group.listing_exempt);
    }
}
