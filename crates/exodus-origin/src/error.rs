//! Error types for origin request handling.

use exodus_index::LookupError;
use snafu::Snafu;

/// Fatal per-request failures.
///
/// "No version found" is not among them: it becomes a denial response.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum OriginRequestError {
    /// The event could not be decoded into an origin request.
    #[snafu(display("invalid origin request event: {source}"))]
    InvalidEvent { source: serde_json::Error },

    /// The event decoded but carried no request record.
    #[snafu(display("event contains no origin request"))]
    MissingRequest,

    /// The versioned lookup failed.
    #[snafu(display("{source}"))]
    Lookup { source: LookupError },

    /// The resolved record cannot be turned into an outgoing request.
    #[snafu(display("cannot rewrite '{uri}' to object '{object_key}': {reason}"))]
    MalformedRecord {
        uri: String,
        object_key: String,
        reason: String,
    },
}

pub type Result<T, E = OriginRequestError> = std::result::Result<T, E>;
