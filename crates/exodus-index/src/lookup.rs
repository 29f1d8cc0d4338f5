//! Point-in-time lookup of the current content record for a path.

use std::sync::Arc;

use chrono::DateTime;
use chrono::Utc;
use snafu::ResultExt;
use tracing::error;
use tracing::info;
use tracing::instrument;

use crate::error::LookupError;
use crate::error::Result;
use crate::error::UnavailableSnafu;
use crate::index::ContentIndex;
use crate::index::IndexQuery;
use crate::record::ContentRecord;

/// Finds the version of a path that is current at a given instant.
///
/// Holds the index client by `Arc` so one client serves every request in the
/// process; the lookup itself keeps no per-request state.
pub struct VersionedLookup<I> {
    index: Arc<I>,
    table: String,
}

impl<I> Clone for VersionedLookup<I> {
    fn clone(&self) -> Self {
        Self {
            index: Arc::clone(&self.index),
            table: self.table.clone(),
        }
    }
}

impl<I> std::fmt::Debug for VersionedLookup<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VersionedLookup").field("table", &self.table).finish()
    }
}

impl<I: ContentIndex> VersionedLookup<I> {
    pub fn new(index: Arc<I>, table: impl Into<String>) -> Self {
        Self {
            index,
            table: table.into(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn index(&self) -> &Arc<I> {
        &self.index
    }

    /// The record for `path` with the greatest `valid_from <= as_of`.
    ///
    /// Issues exactly one index query. `Ok(None)` means no version qualifies;
    /// index failures are returned as [`LookupError::Unavailable`] and never
    /// folded into `None`.
    #[instrument(skip(self), fields(table = %self.table))]
    pub async fn find(&self, path: &str, as_of: DateTime<Utc>) -> Result<Option<ContentRecord>> {
        let query = IndexQuery::latest(&self.table, path, as_of);
        info!(as_of = %query.as_of_key(), "querying index");

        let item = self.index.query_latest(&query).await.context(UnavailableSnafu {
            table: &self.table,
            path,
        })?;

        let Some(item) = item else {
            info!("no item found");
            return Ok(None);
        };

        match ContentRecord::from_item(&item) {
            Ok(record) => {
                info!(object_key = %record.object_key, valid_from = %record.valid_from, "item found");
                Ok(Some(record))
            }
            Err(source) => {
                error!(item = ?item.attributes(), error = %source, "malformed index item");
                Err(LookupError::MalformedRecord {
                    path: path.to_string(),
                    source,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::TimeZone;

    use super::*;
    use crate::constants::ATTR_FROM_DATE;
    use crate::constants::ATTR_WEB_URI;
    use crate::error::IndexError;
    use crate::inmemory::InMemoryContentIndex;
    use crate::record::IndexItem;

    const TABLE: &str = "exodus-cdn";

    struct UnreachableIndex;

    #[async_trait]
    impl ContentIndex for UnreachableIndex {
        async fn query_latest(&self, _query: &IndexQuery) -> std::result::Result<Option<IndexItem>, IndexError> {
            Err(IndexError::Unavailable {
                reason: "connection refused".into(),
            })
        }
    }

    fn t(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap()
    }

    async fn lookup_with_history() -> VersionedLookup<InMemoryContentIndex> {
        let index = InMemoryContentIndex::with_records(TABLE, [
            ContentRecord::new("/p", t(1), "t1"),
            ContentRecord::new("/p", t(2), "t2"),
            ContentRecord::new("/p", t(3), "t3"),
        ])
        .await;
        VersionedLookup::new(index, TABLE)
    }

    #[tokio::test]
    async fn query_at_t2_returns_t2_record() {
        let lookup = lookup_with_history().await;
        let record = lookup.find("/p", t(2)).await.unwrap().unwrap();
        assert_eq!(record.object_key, "t2");
        assert_eq!(record.valid_from, t(2));
    }

    #[tokio::test]
    async fn query_before_first_version_is_none() {
        let lookup = lookup_with_history().await;
        assert!(lookup.find("/p", t(0)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn repeated_queries_are_deterministic() {
        let lookup = lookup_with_history().await;
        let first = lookup.find("/p", t(2)).await.unwrap();
        let second = lookup.find("/p", t(2)).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn unavailable_index_is_an_error_not_none() {
        let lookup = VersionedLookup::new(Arc::new(UnreachableIndex), TABLE);
        let err = lookup.find("/p", t(1)).await.unwrap_err();
        assert!(matches!(err, LookupError::Unavailable { .. }));
        assert!(err.to_string().contains("connection refused"));
    }

    #[tokio::test]
    async fn malformed_item_is_an_error() {
        let index = Arc::new(InMemoryContentIndex::new(TABLE));
        index
            .insert_item(IndexItem::new().with(ATTR_WEB_URI, "/p").with(ATTR_FROM_DATE, "2024-03-01T01:00:00.000+00:00"))
            .await
            .unwrap();
        let lookup = VersionedLookup::new(index, TABLE);

        let err = lookup.find("/p", t(2)).await.unwrap_err();
        assert!(matches!(err, LookupError::MalformedRecord { .. }));
    }
}
