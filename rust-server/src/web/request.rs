//! Immutable view of an inbound HTTP request.

use std::collections::HashMap;

use axum::body::Bytes;
use axum::http::{HeaderMap, Method};

/// Method, path, lowercase headers and the raw body of one request.
///
/// The raw body is kept as received so the webhook signature can be checked
/// against the exact bytes the sender signed.
#[derive(Debug, Clone)]
pub struct IncomingRequest {
    method: Method,
    path: String,
    headers: HashMap<String, String>,
    body: Bytes,
}

impl IncomingRequest {
    /// Build a request view. Header values that are not visible ASCII are
    /// dropped; for repeated headers the first value wins.
    pub fn new(method: Method, path: impl Into<String>, headers: &HeaderMap, body: Bytes) -> Self {
        let mut map = HashMap::with_capacity(headers.len());
        for (name, value) in headers {
            if let Ok(value) = value.to_str() {
                map.entry(name.as_str().to_ascii_lowercase())
                    .or_insert_with(|| value.to_string());
            }
        }

        Self {
            method,
            path: path.into(),
            headers: map,
            body,
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Look up a header by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }
}
