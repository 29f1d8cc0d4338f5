//! Origin request and response shapes.
//!
//! Field names follow the CloudFront origin-request event so events can be
//! decoded and responses encoded without translation.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::constants::NOT_FOUND_DESCRIPTION;
use crate::constants::NOT_FOUND_STATUS;

/// One value of a header, keeping the header's original spelling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderEntry {
    pub key: String,
    pub value: String,
}

/// Headers keyed by lowercase name.
pub type Headers = BTreeMap<String, Vec<HeaderEntry>>;

/// A request on its way to the origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OriginRequest {
    /// Requested path.
    pub uri: String,
    /// Raw query string, without the leading `?`.
    #[serde(default)]
    pub querystring: String,
    pub headers: Headers,
    /// Fields this core does not interpret (method, clientIp, origin, ...),
    /// passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl OriginRequest {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            querystring: String::new(),
            headers: Headers::new(),
            extra: Map::new(),
        }
    }

    /// First value of the header `name` (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .and_then(|entries| entries.first())
            .map(|entry| entry.value.as_str())
    }

    /// Set `name` to a single value, replacing any existing values.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.insert(name.to_ascii_lowercase(), vec![HeaderEntry {
            key: name.to_string(),
            value: value.into(),
        }]);
    }
}

/// Short-circuit response telling the edge not to fetch from the origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DenialResponse {
    pub status: String,
    pub status_description: String,
}

impl DenialResponse {
    /// The `404 Not Found` denial, returned with no body.
    pub fn not_found() -> Self {
        Self {
            status: NOT_FOUND_STATUS.to_string(),
            status_description: NOT_FOUND_DESCRIPTION.to_string(),
        }
    }
}

/// What the handler hands back to the edge.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OriginResponse {
    /// Forward this (rewritten) request to the origin.
    Forward(OriginRequest),
    /// Answer directly with this response.
    Deny(DenialResponse),
}

impl OriginResponse {
    pub fn as_request(&self) -> Option<&OriginRequest> {
        match self {
            Self::Forward(request) => Some(request),
            Self::Deny(_) => None,
        }
    }

    pub fn is_denied(&self) -> bool {
        matches!(self, Self::Deny(_))
    }
}

/// The CloudFront event envelope: `{"Records":[{"cf":{"request":{...}}}]}`.
#[derive(Debug, Clone, Deserialize)]
pub struct OriginRequestEvent {
    #[serde(rename = "Records", default)]
    pub records: Vec<EventRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventRecord {
    pub cf: CloudFrontPayload,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CloudFrontPayload {
    pub request: Option<OriginRequest>,
}

impl OriginRequestEvent {
    /// The request of the first record, if any.
    pub fn into_request(self) -> Option<OriginRequest> {
        self.records.into_iter().next().and_then(|record| record.cf.request)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn decodes_cloudfront_event() {
        let event = json!({
            "Records": [{
                "cf": {
                    "config": {"eventType": "origin-request"},
                    "request": {
                        "clientIp": "203.0.113.178",
                        "method": "GET",
                        "uri": "/content/origin/foo",
                        "querystring": "",
                        "headers": {
                            "host": [{"key": "Host", "value": "cdn.example.com"}]
                        }
                    }
                }
            }]
        });

        let event: OriginRequestEvent = serde_json::from_value(event).unwrap();
        let request = event.into_request().unwrap();
        assert_eq!(request.uri, "/content/origin/foo");
        assert_eq!(request.header("Host"), Some("cdn.example.com"));
        assert_eq!(request.extra.get("method"), Some(&json!("GET")));
    }

    #[test]
    fn unknown_fields_survive_reencoding() {
        let raw = json!({
            "uri": "/a",
            "querystring": "x=1",
            "headers": {},
            "method": "GET",
            "origin": {"s3": {"domainName": "bucket.s3.amazonaws.com"}}
        });
        let request: OriginRequest = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(serde_json::to_value(&request).unwrap(), raw);
    }

    #[test]
    fn request_without_headers_is_rejected() {
        let raw = json!({"uri": "/a"});
        assert!(serde_json::from_value::<OriginRequest>(raw).is_err());
    }

    #[test]
    fn empty_event_has_no_request() {
        let event: OriginRequestEvent = serde_json::from_value(json!({"Records": []})).unwrap();
        assert!(event.into_request().is_none());
    }

    #[test]
    fn denial_encodes_to_literal_shape() {
        let response = OriginResponse::Deny(DenialResponse::not_found());
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"status": "404", "statusDescription": "Not Found"})
        );
    }

    #[test]
    fn set_header_lowercases_map_key() {
        let mut request = OriginRequest::new("/a");
        request.set_header("Exodus-Original-Uri", "/a");
        assert_eq!(request.headers["exodus-original-uri"][0].key, "Exodus-Original-Uri");
        assert_eq!(request.header("exodus-original-uri"), Some("/a"));
    }
}
