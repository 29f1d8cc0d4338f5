//! Attribute names and bounds of the versioned content index.

/// Partition key: the canonical request path.
pub const ATTR_WEB_URI: &str = "web_uri";

/// Sort key: RFC 3339 instant (millisecond precision) the version became current.
pub const ATTR_FROM_DATE: &str = "from_date";

/// Key of the backing storage object.
pub const ATTR_OBJECT_KEY: &str = "object_key";

/// Optional media type override.
pub const ATTR_CONTENT_TYPE: &str = "content_type";

/// Items returned per query. A lookup only ever needs the newest qualifying
/// version.
pub const QUERY_LIMIT: u32 = 1;

/// Maximum object key length accepted from the index (S3 key limit).
pub const MAX_OBJECT_KEY_LENGTH: usize = 1024;

const _: () = assert!(QUERY_LIMIT == 1);
const _: () = assert!(MAX_OBJECT_KEY_LENGTH > 0);
