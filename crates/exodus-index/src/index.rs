//! The versioned index seam and a lazily-initialized client wrapper.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use exodus_time::index_timestamp;
use tokio::sync::OnceCell;
use tracing::info;

use crate::constants::QUERY_LIMIT;
use crate::error::IndexError;
use crate::record::IndexItem;

/// A point-in-time query: the newest item for `path` whose `from_date` is not
/// after `as_of`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexQuery {
    /// Table (or namespace) holding the records.
    pub table: String,
    /// Partition key.
    pub path: String,
    /// Upper bound, inclusive, on the version start.
    pub as_of: DateTime<Utc>,
    /// Maximum items the backend should return, newest first.
    pub limit: u32,
}

impl IndexQuery {
    pub fn latest(table: impl Into<String>, path: impl Into<String>, as_of: DateTime<Utc>) -> Self {
        Self {
            table: table.into(),
            path: path.into(),
            as_of,
            limit: QUERY_LIMIT,
        }
    }

    /// The sort-key bound as stored in the index (`<=` comparison).
    pub fn as_of_key(&self) -> String {
        index_timestamp(&self.as_of)
    }
}

/// External point-in-time key-value index.
///
/// Implementations own their consistency, timeouts and retries; callers issue
/// exactly one query per request and do not retry.
#[async_trait]
pub trait ContentIndex: Send + Sync {
    /// Return the newest item matching `query`, or `None` if no version of the
    /// path started at or before `query.as_of`.
    async fn query_latest(&self, query: &IndexQuery) -> Result<Option<IndexItem>, IndexError>;
}

#[async_trait]
impl<T: ContentIndex + ?Sized> ContentIndex for Arc<T> {
    async fn query_latest(&self, query: &IndexQuery) -> Result<Option<IndexItem>, IndexError> {
        (**self).query_latest(query).await
    }
}

type ClientFuture<I> = Pin<Box<dyn Future<Output = Result<I, IndexError>> + Send>>;
type ClientFactory<I> = Box<dyn Fn() -> ClientFuture<I> + Send + Sync>;

/// Creates the real index client on first use and reuses it afterwards.
///
/// If creation fails the error is returned to that caller and the next query
/// tries again. The client must not carry request-specific state.
pub struct LazyContentIndex<I> {
    client: OnceCell<Arc<I>>,
    factory: ClientFactory<I>,
}

impl<I> fmt::Debug for LazyContentIndex<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyContentIndex").field("initialized", &self.client.initialized()).finish()
    }
}

impl<I: ContentIndex + 'static> LazyContentIndex<I> {
    pub fn new<F, Fut>(factory: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<I, IndexError>> + Send + 'static,
    {
        Self {
            client: OnceCell::new(),
            factory: Box::new(move || -> ClientFuture<I> { Box::pin(factory()) }),
        }
    }

    /// The shared client, creating it if needed.
    pub async fn client(&self) -> Result<&Arc<I>, IndexError> {
        self.client
            .get_or_try_init(|| async {
                let client = (self.factory)().await?;
                info!("index client initialized");
                Ok::<_, IndexError>(Arc::new(client))
            })
            .await
    }

    pub fn is_initialized(&self) -> bool {
        self.client.initialized()
    }
}

#[async_trait]
impl<I: ContentIndex + 'static> ContentIndex for LazyContentIndex<I> {
    async fn query_latest(&self, query: &IndexQuery) -> Result<Option<IndexItem>, IndexError> {
        self.client().await?.query_latest(query).await
    }
}
