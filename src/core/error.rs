//! Error types for dashboard data access.
//!
//! Every failure that can reach a view is a [`DashboardError`]. Views never
//! retry; they turn the error into a notification.

use thiserror::Error;

/// Result type alias for dashboard operations.
pub type Result<T> = std::result::Result<T, DashboardError>;

#[derive(Error, Debug)]
pub enum DashboardError {
    // =========================================================================
    // Transport
    // =========================================================================

    /// Connection, TLS or timeout failure before a response arrived.
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("{url} returned HTTP {status}")]
    Status {
        status: u16,
        url: String,
    },

    /// The body could not be decoded into the expected shape.
    #[error("Unexpected response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    // =========================================================================
    // Input
    // =========================================================================

    /// Start date falls after the end date, or a date failed to parse.
    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),

    /// A configured base URL could not be parsed or joined.
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl {
        url: String,
        reason: String,
    },

    // =========================================================================
    // Configuration
    // =========================================================================

    #[error("Configuration error: {0}")]
    Config(#[from] figment::Error),
}

impl DashboardError {
    /// Short text suitable for a one-line notification.
    pub fn user_message(&self) -> String {
        match self {
            DashboardError::Http(e) if e.is_timeout() => "request timed out".to_string(),
            DashboardError::Http(e) if e.is_connect() => "backend unreachable".to_string(),
            DashboardError::Status { status, .. } => format!("server returned HTTP {status}"),
            DashboardError::Decode { .. } => "malformed response".to_string(),
            other => other.to_string(),
        }
    }
}
