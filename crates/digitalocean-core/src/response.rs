//! Per-call response metadata.
//!
//! Every API call hands back a [`Response`] next to its decoded payload. It
//! carries the transport-level facts about the call: the request line, the
//! HTTP status and headers, the rate-limit window and any pagination blocks
//! the body contained.

use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

/// Header carrying the request quota for the current window.
pub const HEADER_RATE_LIMIT: &str = "ratelimit-limit";

/// Header carrying the remaining requests in the current window.
pub const HEADER_RATE_REMAINING: &str = "ratelimit-remaining";

/// Header carrying the unix time at which the window resets.
pub const HEADER_RATE_RESET: &str = "ratelimit-reset";

/// Header the API echoes the request id in.
pub const HEADER_REQUEST_ID: &str = "x-request-id";

/// Transport metadata for a single API call.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// HTTP method of the request.
    pub method: Method,
    /// Fully resolved request URL.
    pub url: Url,
    /// HTTP status returned by the API.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Rate-limit window, when the API reported one.
    pub rate: Option<Rate>,
    /// Pagination links, when the body carried a `links` block.
    pub links: Option<Links>,
    /// Result metadata, when the body carried a `meta` block.
    pub meta: Option<Meta>,
}

impl Response {
    /// Build response metadata from the request line, status and headers.
    ///
    /// The rate-limit window is parsed from the headers immediately; links
    /// and meta are filled in once the body has been read.
    #[must_use]
    pub fn new(method: Method, url: Url, status: StatusCode, headers: HeaderMap) -> Self {
        let rate = Rate::from_headers(&headers);
        Self {
            method,
            url,
            status,
            headers,
            rate,
            links: None,
            meta: None,
        }
    }

    /// Copy the `links` and `meta` blocks out of a decoded body.
    ///
    /// Blocks that are missing or do not have the expected shape are left
    /// unset.
    #[must_use]
    pub fn with_body_metadata(mut self, body: &Value) -> Self {
        if let Some(object) = body.as_object() {
            self.links = object
                .get("links")
                .and_then(|links| Links::deserialize(links).ok());
            self.meta = object
                .get("meta")
                .and_then(|meta| Meta::deserialize(meta).ok());
        }
        self
    }

    /// Request id echoed by the API, if any.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        self.headers
            .get(HEADER_REQUEST_ID)
            .and_then(|value| value.to_str().ok())
    }
}

/// Rate-limit window reported by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rate {
    /// Requests allowed per window.
    pub limit: u64,
    /// Requests left in the current window.
    pub remaining: u64,
    /// When the current window resets.
    pub reset: DateTime<Utc>,
}

impl Rate {
    /// Parse the rate-limit headers.
    ///
    /// Returns `None` unless all three headers are present and well formed.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let limit = header_number(headers, HEADER_RATE_LIMIT)?;
        let remaining = header_number(headers, HEADER_RATE_REMAINING)?;
        let reset = header_number(headers, HEADER_RATE_RESET)?;
        let reset = DateTime::from_timestamp(i64::try_from(reset).ok()?, 0)?;

        Some(Self {
            limit,
            remaining,
            reset,
        })
    }
}

fn header_number(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers.get(name)?.to_str().ok()?.trim().parse().ok()
}

/// Pagination links of a list response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Links {
    /// Page navigation links.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages: Option<Pages>,
    /// Actions started by the call.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<LinkAction>,
}

impl Links {
    /// Page number the response belongs to, starting at 1.
    ///
    /// Derived from the `prev` link: the page after the previous one. A
    /// response without a `prev` link is the first page.
    #[must_use]
    pub fn current_page(&self) -> u64 {
        self.pages
            .as_ref()
            .and_then(|pages| pages.prev.as_deref())
            .and_then(page_for_url)
            .map_or(1, |prev| prev + 1)
    }

    /// Whether this is the last page of the listing.
    #[must_use]
    pub fn is_last_page(&self) -> bool {
        self.pages.as_ref().map_or(true, |pages| pages.last.is_none())
    }
}

fn page_for_url(link: &str) -> Option<u64> {
    let url = Url::parse(link).ok()?;
    let page = url
        .query_pairs()
        .find(|(key, _)| key == "page")
        .map(|(_, value)| value.into_owned())?;
    page.parse().ok()
}

/// Navigation links between pages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pages {
    /// First page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first: Option<String>,
    /// Previous page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
    /// Last page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last: Option<String>,
    /// Next page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

/// Reference to an action started as a side effect of a call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkAction {
    /// Action id.
    pub id: i64,
    /// Relation of the action to the resource.
    #[serde(default)]
    pub rel: String,
    /// URL of the action.
    #[serde(default)]
    pub href: String,
}

/// Result metadata of a list response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    /// Total number of items across all pages.
    #[serde(default)]
    pub total: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;
    use serde_json::json;

    fn sample_response(headers: HeaderMap) -> Response {
        Response::new(
            Method::GET,
            Url::parse("https://api.digitalocean.com/v2/images/1/actions/2").unwrap(),
            StatusCode::OK,
            headers,
        )
    }

    #[test]
    fn rate_parsed_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("ratelimit-limit", HeaderValue::from_static("5000"));
        headers.insert("ratelimit-remaining", HeaderValue::from_static("4816"));
        headers.insert("ratelimit-reset", HeaderValue::from_static("1444931833"));

        let rate = sample_response(headers).rate.unwrap();
        assert_eq!(rate.limit, 5000);
        assert_eq!(rate.remaining, 4816);
        assert_eq!(rate.reset.timestamp(), 1_444_931_833);
    }

    #[test]
    fn rate_missing_when_headers_incomplete() {
        let mut headers = HeaderMap::new();
        headers.insert("ratelimit-limit", HeaderValue::from_static("5000"));
        headers.insert("ratelimit-remaining", HeaderValue::from_static("not-a-number"));
        headers.insert("ratelimit-reset", HeaderValue::from_static("1444931833"));

        assert!(sample_response(headers).rate.is_none());
        assert!(sample_response(HeaderMap::new()).rate.is_none());
    }

    #[test]
    fn request_id_from_header() {
        let mut headers = HeaderMap::new();
        headers.insert("x-request-id", HeaderValue::from_static("abc-123"));
        assert_eq!(sample_response(headers).request_id(), Some("abc-123"));
    }

    #[test]
    fn body_metadata_copied() {
        let body = json!({
            "images": [],
            "links": {
                "pages": {
                    "prev": "https://api.digitalocean.com/v2/images?page=2&per_page=20",
                    "last": "https://api.digitalocean.com/v2/images?page=5&per_page=20"
                },
                "actions": [
                    {"id": 7, "rel": "transfer", "href": "https://api.digitalocean.com/v2/actions/7"}
                ]
            },
            "meta": {"total": 93}
        });

        let response = sample_response(HeaderMap::new()).with_body_metadata(&body);
        let links = response.links.unwrap();
        assert_eq!(links.current_page(), 3);
        assert!(!links.is_last_page());
        assert_eq!(links.actions[0].id, 7);
        assert_eq!(response.meta, Some(Meta { total: 93 }));
    }

    #[test]
    fn body_without_metadata_leaves_blocks_unset() {
        let body = json!({"action": {"id": 1}});
        let response = sample_response(HeaderMap::new()).with_body_metadata(&body);
        assert!(response.links.is_none());
        assert!(response.meta.is_none());
    }

    #[test]
    fn links_without_pages_is_first_and_last_page() {
        let links = Links::default();
        assert_eq!(links.current_page(), 1);
        assert!(links.is_last_page());
    }
}
