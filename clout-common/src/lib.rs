//! Common types and utilities shared across Clout crates.
//!
//! This crate defines the shared error type and observability helpers used
//! throughout the Clout workspace. It stays dependency‑light so that every
//! crate can depend on it without pulling in the HTTP or LLM stacks.
//!
//! # Overview
//!
//! - [`observability`]: Centralised tracing/logging initialisation
//! - [`CloutError`] and [`Result`]: Shared error handling
//!
//! # Examples
//!
//! ```rust
//! use clout_common::{CloutError, Result};
//!
//! fn needs_key(key: Option<&str>) -> Result<&str> {
//!     key.ok_or_else(|| CloutError::Config("missing api key".to_string()))
//! }
//!
//! assert!(needs_key(None).is_err());
//! assert_eq!(needs_key(Some("k")).unwrap(), "k");
//! ```

pub mod observability;

/// Error types used across the Clout system.
#[derive(thiserror::Error, Debug)]
pub enum CloutError {
    /// Configuration was incomplete or invalid (e.g. no credential).
    #[error("Configuration error: {0}")]
    Config(String),

    /// The remote service could not be reached or answered with a failure.
    #[error("Remote error: {0}")]
    Remote(String),

    /// The remote service answered, but not with something we can use.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// A value could not be encoded to or decoded from JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Catch-all for lower level failures.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenient alias for results that use [`CloutError`].
pub type Result<T> = std::result::Result<T, CloutError>;
