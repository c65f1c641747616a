//! Response writing surface
//!
//! Handlers and middleware write a `RouteResponse` into the request
//! context; the transport turns it into bytes on the wire.

use axum::body::Bytes;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use serde::Serialize;

use crate::errors::{HttpError, HttpResult};

/// Status, headers and body produced for one request
#[derive(Debug, Clone)]
pub struct RouteResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl RouteResponse {
    /// Create an empty 200 response
    pub fn new() -> Self {
        Self::with_status(StatusCode::OK)
    }

    /// Create an empty response with the given status
    pub fn with_status(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    pub fn ok() -> Self {
        Self::with_status(StatusCode::OK)
    }

    pub fn created() -> Self {
        Self::with_status(StatusCode::CREATED)
    }

    pub fn no_content() -> Self {
        Self::with_status(StatusCode::NO_CONTENT)
    }

    pub fn not_found() -> Self {
        Self::with_status(StatusCode::NOT_FOUND)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Set a plain text body
    pub fn text<S: Into<String>>(mut self, text: S) -> Self {
        self.body = Bytes::from(text.into());
        self.headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        self
    }

    /// Set a JSON body from an already built value
    pub fn json_value(mut self, value: serde_json::Value) -> Self {
        self.body = Bytes::from(value.to_string());
        self.headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        self
    }

    /// Serialize `data` as the JSON body
    pub fn json<T: Serialize>(self, data: &T) -> HttpResult<Self> {
        let value = serde_json::to_value(data)?;
        Ok(self.json_value(value))
    }

    /// Set raw body bytes
    pub fn bytes(mut self, bytes: Bytes) -> Self {
        self.body = bytes;
        self
    }

    /// Add a header, failing on invalid names or values
    pub fn add_header(&mut self, name: &str, value: &str) -> HttpResult<()> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| HttpError::internal(format!("Invalid header name: {}", e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| HttpError::internal(format!("Invalid header value: {}", e)))?;
        self.headers.insert(name, value);
        Ok(())
    }

    /// Add a header, silently skipping invalid input
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let Err(e) = self.add_header(name, value) {
            tracing::warn!(target: "elif::router", "Dropping response header {}: {}", name, e);
        }
        self
    }

    /// Convert into the axum response type
    pub fn into_axum_response(self) -> axum::response::Response {
        let mut response = axum::response::Response::new(axum::body::Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

impl Default for RouteResponse {
    fn default() -> Self {
        Self::new()
    }
}
