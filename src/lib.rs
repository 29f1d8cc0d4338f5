//! exodus-edge: the origin request rewriter of the exodus CDN.
//!
//! Every request reaching the origin is rewritten onto the storage object that
//! is currently published for its path:
//!
//! - [`alias`] resolves the requested path to its canonical form,
//! - [`index`] finds the version of that path current at request time,
//! - [`origin`] builds the outgoing request, or a `404` denial.
//!
//! This package adds the process shell around those crates: layered
//! configuration ([`config`]) and a records-file loader for the in-memory
//! index ([`records`]) used by the `exodus-origin-request` binary.

pub mod config;
pub mod records;

use std::sync::Arc;

pub use exodus_alias as alias;
pub use exodus_index as index;
pub use exodus_origin as origin;
pub use exodus_time as time;

use crate::config::EdgeConfig;
use crate::index::ContentIndex;
use crate::index::VersionedLookup;
use crate::origin::OriginRequestHandler;
use crate::time::TimeProvider;

/// Build a handler from validated configuration and an index client.
pub fn build_handler<I: ContentIndex>(config: &EdgeConfig, index: Arc<I>) -> OriginRequestHandler<I> {
    OriginRequestHandler::new(config.resolver(), VersionedLookup::new(index, &config.table.name))
        .with_original_uri_header(&config.original_uri_header)
}

/// Like [`build_handler`] with an explicit time source.
pub fn build_handler_with_time<I: ContentIndex, T: TimeProvider>(
    config: &EdgeConfig,
    index: Arc<I>,
    time: T,
) -> OriginRequestHandler<I, T> {
    OriginRequestHandler::with_time(config.resolver(), VersionedLookup::new(index, &config.table.name), time)
        .with_original_uri_header(&config.original_uri_header)
}
