//! Origin request rewriting for the exodus CDN edge.
//!
//! For each request reaching the origin-request hook:
//!
//! ```text
//! Start -> AliasesResolved -> LookedUp -> { Rewritten | Denied | Failed }
//! ```
//!
//! 1. The requested path is resolved to its canonical form ([`exodus_alias`]).
//! 2. The version of the canonical path current "now" is looked up ([`exodus_index`]).
//! 3. Found: a new request is built that targets `/<object_key>`, keeps the original path in the
//!    `exodus-original-uri` header and optionally overrides the served content type. Not found: a
//!    `404 Not Found` denial stops the edge from falling back to the object store with the
//!    unresolved path.
//!
//! Index outages and malformed records fail the request; they are never turned
//! into a denial.

pub mod constants;
pub mod error;
pub mod handler;
pub mod request;
pub mod rewrite;

pub use error::OriginRequestError;
pub use error::Result;
pub use handler::OriginRequestHandler;
pub use request::DenialResponse;
pub use request::HeaderEntry;
pub use request::Headers;
pub use request::OriginRequest;
pub use request::OriginRequestEvent;
pub use request::OriginResponse;
pub use rewrite::RewriteOutcome;
pub use rewrite::build_outgoing;
