//! Deterministic in-memory versioned index.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use exodus_time::parse_index_timestamp;
use tokio::sync::RwLock;

use crate::constants::ATTR_FROM_DATE;
use crate::constants::ATTR_WEB_URI;
use crate::error::IndexError;
use crate::error::RecordError;
use crate::index::ContentIndex;
use crate::index::IndexQuery;
use crate::record::ContentRecord;
use crate::record::IndexItem;

/// Versions of one path, ordered by start instant.
type VersionHistory = BTreeMap<DateTime<Utc>, IndexItem>;

/// In-process index holding one table.
///
/// Items are keyed like the real index: partition key `web_uri`, sort key
/// `from_date`. Publishing a second item with the same path and instant
/// replaces the first.
#[derive(Debug)]
pub struct InMemoryContentIndex {
    table: String,
    data: RwLock<BTreeMap<String, VersionHistory>>,
}

impl InMemoryContentIndex {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            data: RwLock::new(BTreeMap::new()),
        }
    }

    /// Create an index pre-populated with `records`, wrapped in `Arc`.
    pub async fn with_records(table: impl Into<String>, records: impl IntoIterator<Item = ContentRecord>) -> Arc<Self> {
        let index = Self::new(table);
        for record in records {
            index.publish(&record).await;
        }
        Arc::new(index)
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Store a new version of a path.
    pub async fn publish(&self, record: &ContentRecord) {
        let mut data = self.data.write().await;
        data.entry(record.path.clone()).or_default().insert(record.valid_from, record.to_item());
    }

    /// Store a raw item. Only the key attributes are validated, so items
    /// missing payload attributes can be stored as-is.
    pub async fn insert_item(&self, item: IndexItem) -> Result<(), RecordError> {
        let path = item
            .get(ATTR_WEB_URI)
            .ok_or(RecordError::MissingAttribute { name: ATTR_WEB_URI })?
            .to_string();
        let raw_from = item.get(ATTR_FROM_DATE).ok_or(RecordError::MissingAttribute { name: ATTR_FROM_DATE })?;
        let valid_from = parse_index_timestamp(raw_from).map_err(|source| RecordError::InvalidTimestamp {
            name: ATTR_FROM_DATE,
            value: raw_from.to_string(),
            source,
        })?;

        let mut data = self.data.write().await;
        data.entry(path).or_default().insert(valid_from, item);
        Ok(())
    }

    /// Number of stored versions across all paths.
    pub async fn len(&self) -> usize {
        self.data.read().await.values().map(BTreeMap::len).sum()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl ContentIndex for InMemoryContentIndex {
    async fn query_latest(&self, query: &IndexQuery) -> Result<Option<IndexItem>, IndexError> {
        if query.table != self.table {
            return Err(IndexError::TableNotFound {
                table: query.table.clone(),
            });
        }

        let data = self.data.read().await;
        let item = data
            .get(&query.path)
            .and_then(|versions| versions.range(..=query.as_of).next_back())
            .map(|(_, item)| item.clone());
        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use chrono::TimeZone;

    use super::*;

    const TABLE: &str = "exodus-cdn";

    fn t(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap()
    }

    async fn query(index: &InMemoryContentIndex, path: &str, as_of: DateTime<Utc>) -> Option<ContentRecord> {
        index
            .query_latest(&IndexQuery::latest(TABLE, path, as_of))
            .await
            .unwrap()
            .map(|item| ContentRecord::from_item(&item).unwrap())
    }

    #[tokio::test]
    async fn returns_newest_version_not_after_as_of() {
        let index = InMemoryContentIndex::with_records(TABLE, [
            ContentRecord::new("/p", t(1), "v1"),
            ContentRecord::new("/p", t(2), "v2"),
            ContentRecord::new("/p", t(3), "v3"),
        ])
        .await;

        assert_eq!(query(&index, "/p", t(2)).await.unwrap().object_key, "v2");
        assert_eq!(query(&index, "/p", t(2) + Duration::minutes(30)).await.unwrap().object_key, "v2");
        assert_eq!(query(&index, "/p", t(5)).await.unwrap().object_key, "v3");
        assert!(query(&index, "/p", t(0)).await.is_none());
    }

    #[tokio::test]
    async fn unknown_path_is_none() {
        let index = InMemoryContentIndex::with_records(TABLE, [ContentRecord::new("/p", t(1), "v1")]).await;
        assert!(query(&index, "/other", t(5)).await.is_none());
    }

    #[tokio::test]
    async fn same_instant_replaces_earlier_publish() {
        let index = InMemoryContentIndex::new(TABLE);
        index.publish(&ContentRecord::new("/p", t(1), "first")).await;
        index.publish(&ContentRecord::new("/p", t(1), "second")).await;
        assert_eq!(index.len().await, 1);
        assert_eq!(query(&index, "/p", t(1)).await.unwrap().object_key, "second");
    }

    #[tokio::test]
    async fn wrong_table_is_an_error() {
        let index = InMemoryContentIndex::new(TABLE);
        let result = index.query_latest(&IndexQuery::latest("other-table", "/p", t(1))).await;
        assert!(matches!(result, Err(IndexError::TableNotFound { .. })));
    }

    #[tokio::test]
    async fn insert_item_requires_key_attributes() {
        let index = InMemoryContentIndex::new(TABLE);
        let missing_date = IndexItem::new().with(ATTR_WEB_URI, "/p");
        assert!(index.insert_item(missing_date).await.is_err());
        assert!(index.is_empty().await);

        let keyed = IndexItem::new().with(ATTR_WEB_URI, "/p").with(ATTR_FROM_DATE, "2024-03-01T01:00:00.000+00:00");
        index.insert_item(keyed).await.unwrap();
        assert_eq!(index.len().await, 1);
    }
}
