//! Error taxonomy shared by the aggregation engine and the HTTP layer.
//!
//! Route handlers derive the response status via [`Error::http_status`] and
//! a stable machine-readable code via [`Error::code`].

/// Common error type for tidepool.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Listing the object-storage catalog failed or timed out.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// The stock-media provider could not deliver a requested fallback.
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// A request parameter could not be interpreted.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// A single-item lookup found nothing in either source.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The configuration is unusable.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An internal error occurred.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new StorageUnavailable error.
    pub fn storage_unavailable<S: Into<String>>(msg: S) -> Self {
        Self::StorageUnavailable(msg.into())
    }

    /// Create a new ProviderUnavailable error.
    pub fn provider_unavailable<S: Into<String>>(msg: S) -> Self {
        Self::ProviderUnavailable(msg.into())
    }

    /// Create a new InvalidQuery error.
    pub fn invalid_query<S: Into<String>>(msg: S) -> Self {
        Self::InvalidQuery(msg.into())
    }

    /// Create a new NotFound error.
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a new Config error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new Internal error.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }

    /// Map this error to an appropriate HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::StorageUnavailable(_) => 503,
            Error::ProviderUnavailable(_) => 502,
            Error::InvalidQuery(_) => 400,
            Error::NotFound(_) => 404,
            Error::Config(_) => 500,
            Error::Internal(_) => 500,
        }
    }

    /// Short snake_case identifier for API error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Error::StorageUnavailable(_) => "storage_unavailable",
            Error::ProviderUnavailable(_) => "provider_unavailable",
            Error::InvalidQuery(_) => "invalid_query",
            Error::NotFound(_) => "not_found",
            Error::Config(_) => "config_error",
            Error::Internal(_) => "internal_error",
        }
    }

    /// Caller-facing message that leaks no upstream detail.
    pub fn public_message(&self) -> &'static str {
        match self {
            Error::StorageUnavailable(_) => "Media catalog is temporarily unavailable",
            Error::ProviderUnavailable(_) => "Media provider is temporarily unavailable",
            Error::InvalidQuery(_) => "Invalid query parameters",
            Error::NotFound(_) => "Media not found",
            Error::Config(_) | Error::Internal(_) => "Internal server error",
        }
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
