//! Error types for subscription ingestion and engine configuration
//!
//! Aggregation itself never fails; only decoding a document and validating
//! settings can.

use thiserror::Error;

/// Result alias for fallible operations in this crate
pub type Result<T> = std::result::Result<T, RevenueError>;

#[derive(Debug, Error)]
pub enum RevenueError {
    /// The subscriptions document was not valid JSON or a record was malformed
    #[error("failed to decode subscriptions document: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid calendar date: {0:?}")]
    InvalidDate(String),

    #[error("invalid month label: {0:?} (expected e.g. \"Jan 2025\")")]
    InvalidMonthLabel(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
