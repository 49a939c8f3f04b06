//! API error types with HTTP status code mapping

use serde::Serialize;

/// Message returned for every internal failure; details stay in the log
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Error codes that map to HTTP status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Invalid request (400)
    BadRequest,
    /// Resource not found (404)
    NotFound,
    /// Wrong method for an existing route (405)
    MethodNotAllowed,
    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn status_code(self) -> u16 {
        match self {
            Self::BadRequest => 400,
            Self::NotFound => 404,
            Self::MethodNotAllowed => 405,
            Self::Internal => 500,
        }
    }

    /// Get the error code string
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BadRequest => "BAD_REQUEST",
            Self::NotFound => "NOT_FOUND",
            Self::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            Self::Internal => "INTERNAL_ERROR",
        }
    }
}

/// API error with code and message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// Error code (determines HTTP status)
    pub code: ErrorCode,
    /// Message sent to the client
    pub message: String,
}

impl ApiError {
    /// Create a bad request error
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::BadRequest,
            message: message.into(),
        }
    }

    /// Create a not found error
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::NotFound,
            message: message.into(),
        }
    }

    /// Create a method not allowed error
    #[must_use]
    pub fn method_not_allowed(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::MethodNotAllowed,
            message: message.into(),
        }
    }

    /// Create the generic internal error
    ///
    /// The client never sees the cause; log it before calling this.
    #[must_use]
    pub fn internal() -> Self {
        Self {
            code: ErrorCode::Internal,
            message: INTERNAL_ERROR_MESSAGE.to_string(),
        }
    }

    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        self.code.status_code()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for ApiError {}

/// Serializable error body: `{"error": "..."}`
#[derive(Debug, Serialize)]
pub struct ApiErrorData {
    /// Human-readable message
    pub error: String,
}

impl From<&ApiError> for ApiErrorData {
    fn from(err: &ApiError) -> Self {
        Self {
            error: err.message.clone(),
        }
    }
}
