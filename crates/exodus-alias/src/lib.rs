//! Path alias resolution for the exodus CDN edge.
//!
//! Requests may arrive under several equivalent paths (for example a
//! `content/origin` prefix and its shorter `origin` form, or a regional mirror
//! prefix and the non-mirror one). This crate rewrites a requested path onto a
//! single canonical path before it is looked up in the versioned index.
//!
//! # Algorithm
//!
//! Rules are grouped ([`AliasGroup`]) and groups are applied in order. Within a
//! group, [`apply_fixed_point`] repeatedly scans the rules that have not fired
//! yet, applying each one whose source prefix matches the current path, until
//! a pass fires nothing. A rule fires at most once per resolution, so
//! resolution always terminates, even for cyclic rule sets, after at most
//! `rules.len() + 1` passes.
//!
//! # Usage
//!
//! ```
//! use exodus_alias::{AliasResolver, AliasRule};
//!
//! let resolver = AliasResolver::origin_and_rhui(
//!     vec![AliasRule::new("/content/origin", "/origin")],
//!     vec![AliasRule::new("/content/dist/rhui", "/content/dist")],
//! );
//!
//! assert_eq!(resolver.resolve("/content/origin/rpms/foo.rpm"), "/origin/rpms/foo.rpm");
//! assert_eq!(resolver.resolve("/content/dist/rhui/server/repodata"), "/content/dist/server/repodata");
//! // Listings keep their mirror-specific path.
//! assert_eq!(resolver.resolve("/content/dist/rhui/server/listing"), "/content/dist/rhui/server/listing");
//! ```

pub mod constants;
pub mod resolver;
pub mod rule;

pub use constants::LISTING_SUFFIX;
pub use constants::MAX_RULES_PER_GROUP;
pub use resolver::AliasResolver;
pub use resolver::FixedPoint;
pub use resolver::apply_fixed_point;
pub use resolver::apply_fixed_point_traced;
pub use resolver::is_listing;
pub use resolver::resolve;
pub use rule::AliasGroup;
pub use rule::AliasRule;
