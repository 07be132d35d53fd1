//! Common types and utilities shared across Portal crates.
//!
//! This crate holds the logging initialiser and the umbrella error type used
//! by the binary when wiring the library crates together. It is intentionally
//! dependency-minimal so every crate can depend on it.
//!
//! # Overview
//!
//! - [`observability`]: Centralised tracing/logging initialisation
//! - [`PortalError`] and [`Result`]: Shared error handling
//!
//! # Examples
//!
//! ```rust
//! use portal_common::PortalError;
//!
//! let err = PortalError::Config("storage path is empty".into());
//! assert_eq!(err.to_string(), "Configuration error: storage path is empty");
//! ```
pub mod observability;

/// Error types surfaced while assembling and running the portal.
#[derive(thiserror::Error, Debug)]
pub enum PortalError {
    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The local key-value state could not be read or written.
    #[error("Storage error: {0}")]
    Storage(String),

    /// An HTTP client could not be constructed.
    #[error("HTTP setup error: {0}")]
    Http(String),

    /// Anything else bubbling up from a lower layer.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenient alias for results that use [`PortalError`].
pub type Result<T> = std::result::Result<T, PortalError>;
