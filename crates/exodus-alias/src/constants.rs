//! Tiger Style constants for alias resolution.

/// Suffix marking a directory-listing resource.
///
/// Listings must stay distinct per alias group, so listing-exempt groups never
/// rewrite a path ending in this suffix.
pub const LISTING_SUFFIX: &str = "/listing";

/// Maximum number of rules accepted in a single alias group.
///
/// Resolution cost is quadratic in the rule count in the worst case (one pass
/// per fired rule, every pass scanning the remaining rules).
pub const MAX_RULES_PER_GROUP: usize = 1024;

/// Name of the group that maps content-origin paths onto their canonical form.
pub const ORIGIN_GROUP: &str = "origin";

/// Name of the group that maps regional mirror paths onto non-mirror paths.
pub const RHUI_GROUP: &str = "rhui";

// ============================================================================
// Compile-Time Constant Assertions
// ============================================================================

const _: () = assert!(MAX_RULES_PER_GROUP > 0);
const _: () = assert!(LISTING_SUFFIX.len() > 1);
