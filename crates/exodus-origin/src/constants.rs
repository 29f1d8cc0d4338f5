//! Wire constants of the origin request contract.

/// Header carrying the path as originally requested, before aliasing and
/// rewriting.
pub const ORIGINAL_URI_HEADER: &str = "exodus-original-uri";

/// Query parameter asking the object store to serve a specific media type.
pub const CONTENT_TYPE_QUERY_PARAM: &str = "response-content-type";

/// Status of the denial response.
pub const NOT_FOUND_STATUS: &str = "404";

/// Status description of the denial response.
pub const NOT_FOUND_DESCRIPTION: &str = "Not Found";
