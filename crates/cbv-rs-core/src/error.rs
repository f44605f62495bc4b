//! Core error types for cbv-rs.
//!
//! [`CbvError`] covers every way a view can fail: client input errors
//! (unparseable page numbers), resource absence (redirects with no target),
//! configuration mistakes, template failures and storage failures. Each
//! variant maps to the HTTP status the host should answer with.

use thiserror::Error;

/// The primary error type for cbv-rs.
///
/// Each variant maps to an HTTP status code via [`CbvError::status_code`].
/// Configuration errors are raised at request time and surface as 500s.
#[derive(Error, Debug)]
pub enum CbvError {
    // ── HTTP errors ──────────────────────────────────────────────────

    /// HTTP 400 Bad Request.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// HTTP 404 Not Found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// HTTP 405 Method Not Allowed.
    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    /// HTTP 410 Gone.
    #[error("Gone")]
    Gone,

    /// HTTP 500 Internal Server Error.
    #[error("Internal server error: {0}")]
    InternalServerError(String),

    // ── Configuration ────────────────────────────────────────────────

    /// A settings value is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// A view is missing a required attribute (template name, model, ...).
    #[error("Improperly configured: {0}")]
    ImproperlyConfigured(String),

    // ── Templates ────────────────────────────────────────────────────

    /// A template failed to parse or render.
    #[error("Template syntax error: {0}")]
    TemplateSyntaxError(String),

    /// The requested template was not found.
    #[error("Template does not exist: {0}")]
    TemplateDoesNotExist(String),

    // ── Storage ──────────────────────────────────────────────────────

    /// A storage backend failed to execute a query.
    #[error("Database error: {0}")]
    DatabaseError(String),

    // ── Serialization ────────────────────────────────────────────────

    /// An error occurred during serialization or deserialization.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // ── IO ───────────────────────────────────────────────────────────

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl CbvError {
    /// Returns the HTTP status code associated with this error.
    ///
    /// - `BadRequest` -> 400
    /// - `NotFound` -> 404
    /// - `MethodNotAllowed` -> 405
    /// - `Gone` -> 410
    /// - Everything else -> 500
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest(_) => 400,
            Self::NotFound(_) => 404,
            Self::MethodNotAllowed(_) => 405,
            Self::Gone => 410,
            Self::InternalServerError(_)
            | Self::ConfigurationError(_)
            | Self::ImproperlyConfigured(_)
            | Self::TemplateSyntaxError(_)
            | Self::TemplateDoesNotExist(_)
            | Self::DatabaseError(_)
            | Self::SerializationError(_)
            | Self::IoError(_) => 500,
        }
    }

    /// Returns `true` if this error is the caller's fault (4xx).
    pub const fn is_client_error(&self) -> bool {
        let status = self.status_code();
        status >= 400 && status < 500
    }
}

impl From<serde_json::Error> for CbvError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

/// A convenience type alias for `Result<T, CbvError>`.
pub type CbvResult<T> = Result<T, CbvError>;
