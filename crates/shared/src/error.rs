//! Error types for sitegate

use thiserror::Error;

/// Errors produced by site resolution and the site store.
#[derive(Debug, Error)]
pub enum SiteError {
    /// The default site id is not configured. Fatal to the caller; never
    /// retried.
    #[error("Default site is not configured: {0}")]
    Configuration(&'static str),

    /// A site lookup by id or domain found nothing.
    #[error("Site not found: {0}")]
    NotFound(String),

    /// The operation is not supported for this object. Raised when a
    /// [`RequestSite`](crate::types::RequestSite) is asked to persist or
    /// delete itself.
    #[error("Unsupported operation: {0}")]
    Unsupported(&'static str),

    /// Opaque failure from the backing store, propagated unchanged.
    #[error("Store error: {0}")]
    Store(String),
}

impl From<sqlx::Error> for SiteError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => SiteError::NotFound("no matching row".to_string()),
            _ => SiteError::Store(err.to_string()),
        }
    }
}

/// Result type alias for site operations
pub type SiteResult<T> = Result<T, SiteError>;
