//! Fixed-point alias resolution.

use tracing::debug;
use tracing::trace;

use crate::constants::LISTING_SUFFIX;
use crate::rule::AliasGroup;
use crate::rule::AliasRule;

/// Result of resolving one path against one rule group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedPoint {
    /// The resolved path.
    pub path: String,
    /// Number of passes over the remaining rules, including the final pass that
    /// fired nothing. Never exceeds `rules.len() + 1`.
    pub passes: usize,
    /// Indices of the rules that fired, in firing order.
    pub fired: Vec<usize>,
}

/// Resolve `uri` against `rules` until no remaining rule applies.
pub fn apply_fixed_point(uri: &str, rules: &[AliasRule]) -> String {
    apply_fixed_point_traced(uri, rules).path
}

/// Like [`apply_fixed_point`], also reporting passes and fired rules.
///
/// Every pass visits the remaining rules in input order and applies each one
/// that matches the path as rewritten so far. Rules that fired are then
/// removed, together with any rule equal to one that fired, and another pass
/// runs. A pass that fires nothing ends resolution, as does running out of
/// rules.
pub fn apply_fixed_point_traced(uri: &str, rules: &[AliasRule]) -> FixedPoint {
    let mut remaining: Vec<usize> = (0..rules.len()).collect();
    let mut current = uri.to_string();
    let mut fired = Vec::new();
    let mut passes = 0;

    while !remaining.is_empty() {
        passes += 1;
        let mut consumed = Vec::new();

        for &idx in &remaining {
            let rule = &rules[idx];
            if rule.matches(&current) {
                let next = rule.apply(&current);
                trace!(src = %rule.src, dest = %rule.dest, from = %current, to = %next, "alias fired");
                current = next;
                consumed.push(idx);
            }
        }

        if consumed.is_empty() {
            break;
        }

        remaining.retain(|&idx| !consumed.iter().any(|&c| rules[c] == rules[idx]));
        fired.extend(consumed);
    }

    FixedPoint {
        path: current,
        passes,
        fired,
    }
}

/// Whether `path` names a directory-listing resource.
pub fn is_listing(path: &str) -> bool {
    path.ends_with(LISTING_SUFFIX)
}

/// Resolve `uri` through each group in order.
///
/// A listing-exempt group is skipped when the path produced by the preceding
/// groups is a listing.
pub fn resolve(uri: &str, groups: &[AliasGroup]) -> String {
    let mut current = uri.to_string();

    for group in groups {
        if group.listing_exempt && is_listing(&current) {
            debug!(group = %group.name, path = %current, "listing path exempt from alias group");
            continue;
        }

        let outcome = apply_fixed_point_traced(&current, &group.rules);
        if outcome.path != current {
            debug!(
                group = %group.name,
                from = %current,
                to = %outcome.path,
                passes = outcome.passes,
                fired = outcome.fired.len(),
                "resolved aliases"
            );
        }
        current = outcome.path;
    }

    current
}

/// Ordered alias groups applied to every request path.
///
/// Immutable once built; share it across requests behind an `Arc`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasResolver {
    groups: Vec<AliasGroup>,
}

impl AliasResolver {
    pub fn new(groups: Vec<AliasGroup>) -> Self {
        Self { groups }
    }

    /// The standard edge layout: content-origin aliases, then regional mirror
    /// aliases with the listing exemption.
    pub fn origin_and_rhui(origin: Vec<AliasRule>, rhui: Vec<AliasRule>) -> Self {
        Self::new(vec![AliasGroup::origin(origin), AliasGroup::rhui(rhui)])
    }

    pub fn groups(&self) -> &[AliasGroup] {
        &self.groups
    }

    /// Canonical path for `uri`.
    pub fn resolve(&self, uri: &str) -> String {
        resolve(uri, &self.groups)
    }
}
