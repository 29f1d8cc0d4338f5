//! Content records and raw index items.

use std::collections::BTreeMap;

use chrono::DateTime;
use chrono::Utc;
use exodus_time::index_timestamp;
use exodus_time::parse_index_timestamp;
use serde::Deserialize;
use serde::Serialize;
use snafu::ResultExt;

use crate::constants::ATTR_CONTENT_TYPE;
use crate::constants::ATTR_FROM_DATE;
use crate::constants::ATTR_OBJECT_KEY;
use crate::constants::ATTR_WEB_URI;
use crate::constants::MAX_OBJECT_KEY_LENGTH;
use crate::error::InvalidAttributeSnafu;
use crate::error::InvalidTimestampSnafu;
use crate::error::RecordError;

/// A raw item as stored by the index: string attributes keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndexItem {
    attributes: BTreeMap<String, String>,
}

impl IndexItem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style attribute setter.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    fn require(&self, name: &'static str) -> Result<&str, RecordError> {
        self.get(name).ok_or(RecordError::MissingAttribute { name })
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }
}

/// One published version of the content served at `path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRecord {
    /// Canonical request path.
    #[serde(alias = "web_uri")]
    pub path: String,
    /// Instant this version became current.
    #[serde(alias = "from_date")]
    pub valid_from: DateTime<Utc>,
    /// Key of the backing storage object.
    pub object_key: String,
    /// Media type to serve instead of the stored object's own metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

impl ContentRecord {
    pub fn new(path: impl Into<String>, valid_from: DateTime<Utc>, object_key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            valid_from,
            object_key: object_key.into(),
            content_type: None,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// The content type override, if one is set and non-empty.
    pub fn content_type_override(&self) -> Option<&str> {
        self.content_type.as_deref().filter(|ct| !ct.is_empty())
    }

    /// Encode as an index item.
    pub fn to_item(&self) -> IndexItem {
        IndexItem::new()
            .with(ATTR_WEB_URI, &self.path)
            .with(ATTR_FROM_DATE, index_timestamp(&self.valid_from))
            .with(ATTR_OBJECT_KEY, &self.object_key)
            .with(ATTR_CONTENT_TYPE, self.content_type.clone().unwrap_or_default())
    }

    /// Decode an index item.
    ///
    /// `web_uri`, `from_date` and a non-empty `object_key` are required. A
    /// missing `content_type` reads as no override.
    pub fn from_item(item: &IndexItem) -> Result<Self, RecordError> {
        let path = item.require(ATTR_WEB_URI)?;
        let raw_from = item.require(ATTR_FROM_DATE)?;
        let valid_from = parse_index_timestamp(raw_from).context(InvalidTimestampSnafu {
            name: ATTR_FROM_DATE,
            value: raw_from,
        })?;
        let object_key = item.require(ATTR_OBJECT_KEY)?;
        validate_object_key(object_key)?;

        Ok(Self {
            path: path.to_string(),
            valid_from,
            object_key: object_key.to_string(),
            content_type: item.get(ATTR_CONTENT_TYPE).map(str::to_string),
        })
    }
}

fn validate_object_key(key: &str) -> Result<(), RecordError> {
    if key.is_empty() {
        return InvalidAttributeSnafu {
            name: ATTR_OBJECT_KEY,
            reason: "empty",
        }
        .fail();
    }
    if key.len() > MAX_OBJECT_KEY_LENGTH {
        return InvalidAttributeSnafu {
            name: ATTR_OBJECT_KEY,
            reason: format!("length {} exceeds {}", key.len(), MAX_OBJECT_KEY_LENGTH),
        }
        .fail();
    }
    Ok(())
}
