//! Request-time failures
//!
//! `HttpError` is what a middleware or handler raises. It travels outward
//! through the pipeline until something recovers it or the dispatcher
//! reports it as a failed completion.

use crate::response::RouteResponse;
use axum::http::StatusCode;
use serde_json::json;
use thiserror::Error;

/// Result type for middleware and handlers
pub type HttpResult<T> = Result<T, HttpError>;

/// Failures raised while handling a request
#[derive(Error, Debug)]
pub enum HttpError {
    #[error("Invalid request: {message}")]
    BadRequest { message: String },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Method {method} not allowed (allowed: {allow})")]
    MethodNotAllowed { method: String, allow: String },

    #[error("Payload too large (limit: {limit} bytes)")]
    PayloadTooLarge { limit: usize },

    #[error("Method not implemented: {method}")]
    NotImplemented { method: String },

    #[error("Unauthorized access")]
    Unauthorized,

    #[error("Access forbidden: {message}")]
    Forbidden { message: String },

    #[error("Request timeout")]
    RequestTimeout,

    #[error("Request cancelled")]
    Cancelled,

    #[error("Internal server error: {message}")]
    InternalError { message: String },

    #[error("Handler failed: {0}")]
    Handler(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Pipeline misuse: {0}")]
    Misuse(#[from] MisuseError),
}

/// Programming errors in middleware or handlers, as opposed to bad input
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MisuseError {
    #[error("pipeline finished without writing a response")]
    NoResponse,

    #[error("middleware '{0}' returned success without a response and without calling next")]
    DroppedContinuation(&'static str),
}

impl HttpError {
    /// Create a bad request error
    pub fn bad_request<T: Into<String>>(message: T) -> Self {
        HttpError::BadRequest {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found<T: Into<String>>(resource: T) -> Self {
        HttpError::NotFound {
            resource: resource.into(),
        }
    }

    /// Create an unauthorized error
    pub fn unauthorized() -> Self {
        HttpError::Unauthorized
    }

    /// Create a forbidden error
    pub fn forbidden<T: Into<String>>(message: T) -> Self {
        HttpError::Forbidden {
            message: message.into(),
        }
    }

    /// Create a method not allowed error carrying the `Allow` header value
    pub fn method_not_allowed<M: Into<String>, A: Into<String>>(method: M, allow: A) -> Self {
        HttpError::MethodNotAllowed {
            method: method.into(),
            allow: allow.into(),
        }
    }

    /// Create an internal error
    pub fn internal<T: Into<String>>(message: T) -> Self {
        HttpError::InternalError {
            message: message.into(),
        }
    }

    /// Wrap an arbitrary error raised by application code
    pub fn handler<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        HttpError::Handler(Box::new(error))
    }

    /// True for application bugs rather than request-level failures
    pub fn is_misuse(&self) -> bool {
        matches!(self, HttpError::Misuse(_))
    }

    /// Get the appropriate HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            HttpError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            HttpError::NotFound { .. } => StatusCode::NOT_FOUND,
            HttpError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            HttpError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            HttpError::NotImplemented { .. } => StatusCode::NOT_IMPLEMENTED,
            HttpError::Unauthorized => StatusCode::UNAUTHORIZED,
            HttpError::Forbidden { .. } => StatusCode::FORBIDDEN,
            HttpError::RequestTimeout => StatusCode::REQUEST_TIMEOUT,
            HttpError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
            HttpError::InternalError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            HttpError::Handler(_) => StatusCode::INTERNAL_SERVER_ERROR,
            HttpError::Misuse(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error code for consistent API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            HttpError::BadRequest { .. } => "BAD_REQUEST",
            HttpError::NotFound { .. } => "RESOURCE_NOT_FOUND",
            HttpError::MethodNotAllowed { .. } => "METHOD_NOT_ALLOWED",
            HttpError::PayloadTooLarge { .. } => "PAYLOAD_TOO_LARGE",
            HttpError::NotImplemented { .. } => "NOT_IMPLEMENTED",
            HttpError::Unauthorized => "UNAUTHORIZED_ACCESS",
            HttpError::Forbidden { .. } => "ACCESS_FORBIDDEN",
            HttpError::RequestTimeout => "REQUEST_TIMEOUT",
            HttpError::Cancelled => "REQUEST_CANCELLED",
            HttpError::InternalError { .. } => "INTERNAL_ERROR",
            HttpError::Handler(_) => "HANDLER_FAILED",
            HttpError::Misuse(_) => "PIPELINE_MISUSE",
        }
    }

    /// Render this error as a JSON error response
    pub fn to_response(&self) -> RouteResponse {
        // Internal details stay in the logs
        let message = match self {
            HttpError::Handler(_) | HttpError::Misuse(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };

        let body = json!({
            "error": {
                "code": self.error_code(),
                "message": message,
                "hint": match self {
                    HttpError::RequestTimeout => Some("Retry the request"),
                    HttpError::BadRequest { .. } => Some("Check request format and parameters"),
                    HttpError::PayloadTooLarge { .. } => Some("Reduce the request body size"),
                    _ => None,
                }
            }
        });

        let response = RouteResponse::with_status(self.status_code()).json_value(body);
        match self {
            HttpError::MethodNotAllowed { allow, .. } => response.with_header("Allow", allow),
            _ => response,
        }
    }
}

impl From<std::io::Error> for HttpError {
    fn from(error: std::io::Error) -> Self {
        HttpError::handler(error)
    }
}

impl From<serde_json::Error> for HttpError {
    fn from(error: serde_json::Error) -> Self {
        HttpError::bad_request(format!("Invalid JSON: {}", error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(HttpError::bad_request("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(HttpError::unauthorized().status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(HttpError::RequestTimeout.status_code(), StatusCode::REQUEST_TIMEOUT);
        assert_eq!(
            HttpError::from(MisuseError::NoResponse).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_misuse_is_distinguishable() {
        assert!(HttpError::from(MisuseError::NoResponse).is_misuse());
        assert!(!HttpError::internal("boom").is_misuse());
    }

    #[test]
    fn test_error_response_body() {
        let response = HttpError::forbidden("admins only").to_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["error"]["code"], "ACCESS_FORBIDDEN");
        assert_eq!(body["error"]["message"], "Access forbidden: admins only");
    }

    #[test]
    fn test_method_not_allowed_sets_allow() {
        let response = HttpError::method_not_allowed("GET", "POST, PUT").to_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.header("allow"), Some("POST, PUT"));
    }

    #[test]
    fn test_handler_details_are_hidden() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let response = HttpError::from(io).to_response();

        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["error"]["code"], "HANDLER_FAILED");
        assert_eq!(body["error"]["message"], "Internal server error");
    }
}
