//! Error types for versioned content lookups.

use snafu::Snafu;

/// Failures reported by a [`ContentIndex`](crate::ContentIndex) backend.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub), module)]
pub enum IndexError {
    /// The backend could not be reached or failed the query.
    #[snafu(display("index unavailable: {reason}"))]
    Unavailable {
        /// Description of the transport or service failure.
        reason: String,
    },

    /// The queried table does not exist in this backend.
    #[snafu(display("index table not found: {table}"))]
    TableNotFound {
        /// The table name from the query.
        table: String,
    },

    /// Creating the backend client failed.
    #[snafu(display("failed to initialize index client: {reason}"))]
    ClientInit {
        /// Description of the initialization failure.
        reason: String,
    },
}

/// An index item that cannot be turned into a [`ContentRecord`](crate::ContentRecord).
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum RecordError {
    #[snafu(display("missing attribute '{name}'"))]
    MissingAttribute { name: &'static str },

    #[snafu(display("attribute '{name}' has invalid timestamp '{value}': {source}"))]
    InvalidTimestamp {
        name: &'static str,
        value: String,
        source: chrono::ParseError,
    },

    #[snafu(display("attribute '{name}' is invalid: {reason}"))]
    InvalidAttribute { name: &'static str, reason: String },
}

/// Errors surfaced by [`VersionedLookup::find`](crate::VersionedLookup::find).
///
/// A path with no qualifying version is not an error; it is `Ok(None)`.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum LookupError {
    /// The index failed; never reported as "not found".
    #[snafu(display("lookup of '{path}' in table '{table}' failed: {source}"))]
    Unavailable {
        table: String,
        path: String,
        source: IndexError,
    },

    /// The index returned an item missing or mangling required attributes.
    #[snafu(display("malformed record for '{path}': {source}"))]
    MalformedRecord { path: String, source: RecordError },
}

pub type Result<T, E = LookupError> = std::result::Result<T, E>;
