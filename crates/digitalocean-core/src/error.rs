//! Error types for DigitalOcean API operations.
//!
//! This module provides the error type shared by every service binding:
//! argument validation failures raised before any I/O, API error bodies
//! returned for non-2xx responses, and transport or decoding failures.

use crate::response::Response;
use reqwest::StatusCode;
use serde::Deserialize;
use std::fmt;
use thiserror::Error;

/// Main error type for DigitalOcean API operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A caller-supplied argument was rejected before any request was sent
    #[error("{arg} is invalid because {reason}")]
    InvalidArgument {
        /// Name of the offending argument
        arg: String,
        /// Why it was rejected
        reason: String,
    },

    /// The API answered with a non-2xx status
    #[error("{0}")]
    Api(Box<ErrorResponse>),

    /// The response body was not the expected JSON
    #[error("Failed to decode response from {} {}: {message}", .response.method, .response.url)]
    Decode {
        /// Decoder error message
        message: String,
        /// Metadata of the response that failed to decode
        response: Box<Response>,
    },

    /// A request body could not be serialized
    #[error("Failed to serialize request body: {0}")]
    Serialization(String),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Operation timed out
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// The API could not be reached
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Invalid endpoint or request path
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Specialized result type for DigitalOcean API operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Build an argument validation error.
    #[must_use]
    pub fn invalid_argument(arg: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            arg: arg.into(),
            reason: reason.into(),
        }
    }

    /// Returns the error code for this error type.
    ///
    /// API errors are classified by their HTTP status.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidArgument { .. } => "INVALID_ARGUMENT",
            Self::Api(err) => match err.response.status {
                StatusCode::NOT_FOUND => "NOT_FOUND",
                StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => "BAD_REQUEST",
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => "UNAUTHORIZED",
                StatusCode::CONFLICT => "CONFLICT",
                StatusCode::TOO_MANY_REQUESTS => "RATE_LIMITED",
                status if status.is_server_error() => "SERVICE_UNAVAILABLE",
                _ => "API_ERROR",
            },
            Self::Decode { .. } => "DECODE_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::HttpError(_) => "HTTP_ERROR",
            Self::Timeout(_) => "TIMEOUT",
            Self::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            Self::InvalidEndpoint(_) => "INVALID_ENDPOINT",
            Self::ConfigError(_) => "CONFIG_ERROR",
            Self::ValidationError(_) => "VALIDATION_ERROR",
        }
    }

    /// Response metadata the transport produced before failing, if any.
    #[must_use]
    pub fn response(&self) -> Option<&Response> {
        match self {
            Self::Api(err) => Some(&err.response),
            Self::Decode { response, .. } => Some(&**response),
            _ => None,
        }
    }

    /// HTTP status of the failed call, if a response was received.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        self.response().map(|response| response.status)
    }

    /// Returns true for a 404 from the API.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }

    /// Returns true if this error should be logged as a serious error.
    #[must_use]
    pub fn should_log(&self) -> bool {
        match self {
            Self::ConfigError(_) | Self::ServiceUnavailable(_) | Self::Decode { .. } => true,
            Self::Api(err) => err.response.status.is_server_error(),
            _ => false,
        }
    }
}

/// Error body returned by the API for a non-2xx response.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorResponse {
    /// Metadata of the failed response
    pub response: Response,
    /// Machine readable error id (e.g. `not_found`)
    pub id: String,
    /// Human readable error message
    pub message: String,
    /// Request id for support tickets
    pub request_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    id: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    request_id: Option<String>,
}

impl ErrorResponse {
    /// Build an error response from response metadata and the raw body.
    ///
    /// A body that is not a JSON error object is kept verbatim as the
    /// message. The request id falls back to the `x-request-id` header.
    #[must_use]
    pub fn from_body(response: Response, body: &[u8]) -> Self {
        let parsed = serde_json::from_slice::<ErrorBody>(body).unwrap_or_else(|_| ErrorBody {
            message: String::from_utf8_lossy(body).trim().to_string(),
            ..ErrorBody::default()
        });

        let request_id = parsed
            .request_id
            .filter(|id| !id.is_empty())
            .or_else(|| response.request_id().map(str::to_string));

        Self {
            response,
            id: parsed.id,
            message: parsed.message,
            request_id,
        }
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}: {}",
            self.response.method,
            self.response.url,
            self.response.status.as_u16()
        )?;
        if let Some(request_id) = &self.request_id {
            write!(f, " (request \"{request_id}\")")?;
        }
        write!(f, " {}", self.message)
    }
}

// Conversions from external error types
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_connect() {
            Self::ServiceUnavailable(err.to_string())
        } else {
            Self::HttpError(err.to_string())
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidEndpoint(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::ValidationError(err.to_string())
    }
}
