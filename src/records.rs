//! Seeding the in-memory index from a records file.
//!
//! The file is a JSON array of content records:
//!
//! ```json
//! [
//!   {"path": "/origin/rpms/foo.rpm", "valid_from": "2024-03-01T12:00:00.000+00:00", "object_key": "abc123"},
//!   {"web_uri": "/origin/repo/listing", "from_date": "2024-03-01T12:00:00Z", "object_key": "def456", "content_type": "text/plain"}
//! ]
//! ```

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use exodus_index::ContentRecord;
use exodus_index::InMemoryContentIndex;
use snafu::ResultExt;
use snafu::Snafu;
use tracing::info;

/// Read all records from `path`.
pub fn load_records(path: &Path) -> Result<Vec<ContentRecord>, RecordsFileError> {
    let content = std::fs::read_to_string(path).context(ReadSnafu { path })?;
    serde_json::from_str(&content).context(ParseSnafu { path })
}

/// Build an in-memory index for `table` holding every record in `path`.
pub async fn load_index(table: &str, path: &Path) -> Result<Arc<InMemoryContentIndex>, RecordsFileError> {
    let records = load_records(path)?;
    let count = records.len();
    let index = InMemoryContentIndex::with_records(table, records).await;
    info!(table, records = count, path = %path.display(), "loaded records file");
    Ok(index)
}

/// Records file errors.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum RecordsFileError {
    #[snafu(display("failed to read records file {}: {source}", path.display()))]
    Read { path: PathBuf, source: std::io::Error },

    #[snafu(display("failed to parse records file {}: {source}", path.display()))]
    Parse { path: PathBuf, source: serde_json::Error },
}
