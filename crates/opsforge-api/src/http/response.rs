//! Response envelope shared by every endpoint.
//!
//! The wire shape is `{data, meta, errors, _links}`: `data` carries the
//! payload, `meta` the request id and timing, `errors` the failure list
//! (omitted when empty), and `_links` related resource hrefs. The error
//! half of the envelope is produced by `AppError`; handlers only ever
//! build the success half here.

use std::collections::BTreeMap;

use serde::Serialize;

/// Success envelope. `T` is the handler's payload type.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    pub meta: ApiMeta,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ApiErrorDetail>,

    /// Related resources, keyed by relation ("self", "approve").
    /// BTreeMap keeps link order stable in serialized output.
    #[serde(rename = "_links", skip_serializing_if = "BTreeMap::is_empty")]
    pub links: BTreeMap<String, String>,
}

/// Per-request metadata carried on every envelope.
#[derive(Debug, Serialize)]
pub struct ApiMeta {
    pub request_id: String,
    /// RFC 3339 response timestamp.
    pub timestamp: String,
    pub response_time_ms: u64,
}

/// One entry of the envelope's error list.
#[derive(Debug, Serialize)]
pub struct ApiErrorDetail {
    /// Machine-readable code, e.g. `SESSION_NOT_FOUND`.
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Build a success envelope around a payload.
    pub fn success(data: T, request_id: String, response_time_ms: u64) -> Self {
        Self {
            data: Some(data),
            meta: ApiMeta {
                request_id,
                timestamp: chrono::Utc::now().to_rfc3339(),
                response_time_ms,
            },
            errors: Vec::new(),
            links: BTreeMap::new(),
        }
    }

    /// Attach a related-resource link.
    pub fn with_link(mut self, rel: &str, href: &str) -> Self {
        self.links.insert(rel.to_string(), href.to_string());
        self
    }
}
