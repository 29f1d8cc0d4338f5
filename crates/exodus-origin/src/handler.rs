//! The origin request entry point.

use std::sync::Arc;

use exodus_alias::AliasResolver;
use exodus_index::ContentIndex;
use exodus_index::VersionedLookup;
use exodus_time::SystemTimeProvider;
use exodus_time::TimeProvider;
use snafu::OptionExt;
use snafu::ResultExt;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::instrument;

use crate::constants::ORIGINAL_URI_HEADER;
use crate::error::InvalidEventSnafu;
use crate::error::LookupSnafu;
use crate::error::MissingRequestSnafu;
use crate::error::Result;
use crate::request::OriginRequest;
use crate::request::OriginRequestEvent;
use crate::request::OriginResponse;
use crate::rewrite::RewriteOutcome;

/// Rewrites origin requests onto the object that is current for their path.
///
/// Per request: resolve aliases, look the canonical path up at "now", then
/// either forward a rewritten request or deny with `404`. Requests share
/// nothing mutable; one handler serves any number of concurrent requests.
pub struct OriginRequestHandler<I, T = SystemTimeProvider> {
    resolver: Arc<AliasResolver>,
    lookup: VersionedLookup<I>,
    time: T,
    original_uri_header: String,
}

impl<I, T> std::fmt::Debug for OriginRequestHandler<I, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OriginRequestHandler")
            .field("groups", &self.resolver.groups().len())
            .field("lookup", &self.lookup)
            .field("original_uri_header", &self.original_uri_header)
            .finish()
    }
}

impl<I: ContentIndex> OriginRequestHandler<I> {
    /// Handler using the system clock.
    pub fn new(resolver: impl Into<Arc<AliasResolver>>, lookup: VersionedLookup<I>) -> Self {
        Self::with_time(resolver, lookup, SystemTimeProvider)
    }
}

impl<I: ContentIndex, T: TimeProvider> OriginRequestHandler<I, T> {
    pub fn with_time(resolver: impl Into<Arc<AliasResolver>>, lookup: VersionedLookup<I>, time: T) -> Self {
        Self {
            resolver: resolver.into(),
            lookup,
            time,
            original_uri_header: ORIGINAL_URI_HEADER.to_string(),
        }
    }

    /// Use a different header name for the original path.
    pub fn with_original_uri_header(mut self, name: impl Into<String>) -> Self {
        self.original_uri_header = name.into();
        self
    }

    pub fn resolver(&self) -> &AliasResolver {
        &self.resolver
    }

    /// Resolve and look up `uri` without building a response.
    pub async fn outcome(&self, uri: &str) -> Result<RewriteOutcome> {
        let canonical = self.resolver.resolve(uri);
        let as_of = self.time.now_utc();
        debug!(%canonical, "resolved canonical path");

        let record = self.lookup.find(&canonical, as_of).await.context(LookupSnafu)?;
        Ok(RewriteOutcome::from_lookup(uri, record))
    }

    /// Handle one request.
    #[instrument(skip_all, fields(uri = %request.uri))]
    pub async fn handle(&self, request: OriginRequest) -> Result<OriginResponse> {
        if tracing::enabled!(tracing::Level::DEBUG) {
            debug!(request = %to_json(&request), "incoming origin request");
        }

        let outcome = self.outcome(&request.uri).await?;
        let response = outcome.respond(&request, &self.original_uri_header).inspect_err(|err| {
            error!(error = %err, outcome = ?outcome, "failed to rewrite origin request");
        })?;

        match &response {
            OriginResponse::Forward(outgoing) => {
                info!(target_uri = %outgoing.uri, querystring = %outgoing.querystring, "request rewritten");
                if tracing::enabled!(tracing::Level::DEBUG) {
                    debug!(request = %to_json(outgoing), "outgoing origin request");
                }
            }
            OriginResponse::Deny(denial) => {
                info!(status = %denial.status, "no current version, denying request");
            }
        }

        Ok(response)
    }

    /// Handle a CloudFront origin-request event.
    pub async fn handle_event(&self, event: serde_json::Value) -> Result<OriginResponse> {
        let event: OriginRequestEvent = serde_json::from_value(event).context(InvalidEventSnafu)?;
        let request = event.into_request().context(MissingRequestSnafu)?;
        self.handle(request).await
    }
}

fn to_json(request: &OriginRequest) -> String {
    serde_json::to_string_pretty(request).unwrap_or_else(|e| format!("<unencodable request: {e}>"))
}
