//! Versioned content index for the exodus CDN edge.
//!
//! Published content is recorded as a history of versions per canonical path.
//! Each version ([`ContentRecord`]) names the storage object to serve and the
//! instant it became current. A request is served from the version that is
//! current at the instant the request is processed.
//!
//! # Architecture
//!
//! - [`ContentIndex`]: the seam to the external point-in-time key-value index. One query per
//!   request, newest-first, limit one.
//! - [`VersionedLookup`]: issues the query and validates the returned item.
//! - [`InMemoryContentIndex`]: deterministic in-process backend for tests and local runs.
//! - [`LazyContentIndex`]: builds the real client on first use and shares it.
//!
//! # Usage
//!
//! ```ignore
//! use exodus_index::{InMemoryContentIndex, VersionedLookup};
//!
//! let index = InMemoryContentIndex::with_records("exodus-cdn", records).await;
//! let lookup = VersionedLookup::new(index, "exodus-cdn");
//!
//! match lookup.find("/origin/rpms/foo.rpm", exodus_time::now_utc_ms()).await? {
//!     Some(record) => println!("serve {}", record.object_key),
//!     None => println!("not found"),
//! }
//! ```

pub mod constants;
pub mod error;
pub mod index;
pub mod inmemory;
pub mod lookup;
pub mod record;

pub use error::IndexError;
pub use error::LookupError;
pub use error::RecordError;
pub use error::Result;
pub use index::ContentIndex;
pub use index::IndexQuery;
pub use index::LazyContentIndex;
pub use inmemory::InMemoryContentIndex;
pub use lookup::VersionedLookup;
pub use record::ContentRecord;
pub use record::IndexItem;
