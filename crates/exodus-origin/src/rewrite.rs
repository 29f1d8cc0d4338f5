//! Pure construction of the outgoing request.

use exodus_index::ContentRecord;

use crate::constants::CONTENT_TYPE_QUERY_PARAM;
use crate::error::OriginRequestError;
use crate::error::Result;
use crate::request::DenialResponse;
use crate::request::OriginRequest;
use crate::request::OriginResponse;

/// Per-request result of alias resolution plus lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewriteOutcome {
    Rewritten {
        object_key: String,
        content_type: Option<String>,
        /// Path as requested, before aliasing.
        original_path: String,
    },
    NotFound,
}

impl RewriteOutcome {
    pub fn from_lookup(original_path: &str, record: Option<ContentRecord>) -> Self {
        match record {
            Some(record) => Self::Rewritten {
                content_type: record.content_type_override().map(str::to_string),
                object_key: record.object_key,
                original_path: original_path.to_string(),
            },
            None => Self::NotFound,
        }
    }

    /// Turn the outcome into the response for `incoming`.
    pub fn respond(&self, incoming: &OriginRequest, original_uri_header: &str) -> Result<OriginResponse> {
        match self {
            Self::NotFound => Ok(OriginResponse::Deny(DenialResponse::not_found())),
            Self::Rewritten {
                object_key,
                content_type,
                original_path,
            } => rewrite_request(incoming, original_path, object_key, content_type.as_deref(), original_uri_header)
                .map(OriginResponse::Forward),
        }
    }
}

/// Build the request that fetches `record`'s object in place of `incoming`.
///
/// The result is a new request: `incoming` is left untouched. It carries the
/// original path in `original_uri_header`, targets `/<object_key>` and, when
/// the record overrides the content type, sets the query string to
/// `response-content-type=<type>`. Every other field is copied.
pub fn build_outgoing(
    incoming: &OriginRequest,
    record: &ContentRecord,
    original_uri_header: &str,
) -> Result<OriginRequest> {
    rewrite_request(
        incoming,
        &incoming.uri,
        &record.object_key,
        record.content_type_override(),
        original_uri_header,
    )
}

fn rewrite_request(
    incoming: &OriginRequest,
    original_path: &str,
    object_key: &str,
    content_type: Option<&str>,
    original_uri_header: &str,
) -> Result<OriginRequest> {
    let malformed = |reason: &str| OriginRequestError::MalformedRecord {
        uri: incoming.uri.clone(),
        object_key: object_key.to_string(),
        reason: reason.to_string(),
    };

    if object_key.is_empty() {
        return Err(malformed("empty object key"));
    }
    if object_key.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(malformed("object key contains whitespace or control characters"));
    }
    if content_type.is_some_and(|ct| ct.chars().any(char::is_control)) {
        return Err(malformed("content type contains control characters"));
    }

    let mut outgoing = incoming.clone();
    outgoing.set_header(original_uri_header, original_path);
    outgoing.uri = format!("/{object_key}");
    if let Some(content_type) = content_type {
        outgoing.querystring = format!("{CONTENT_TYPE_QUERY_PARAM}={content_type}");
    }
    Ok(outgoing)
}
