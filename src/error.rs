//! Error handling module for netrig
//!
//! Provides centralized error handling with proper error types using thiserror.
//! All errors in the engine should use these types for consistency.

use thiserror::Error;

/// Main error type for netrig
#[derive(Error, Debug)]
pub enum NetrigError {
    /// IO errors (file operations, spawning external tools)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The host could not be classified into a supported distro family
    #[error("Unsupported host: {0}")]
    UnsupportedHost(String),

    /// An assertion could not be resolved for the probed family
    #[error("Plan build error: {0}")]
    Build(String),

    /// A required step failed and the remaining plan was abandoned
    #[error("Provisioning aborted: {completed} step(s) completed, {not_attempted} not attempted")]
    Aborted {
        /// Steps that produced a result before the fatal failure (inclusive)
        completed: usize,
        /// Trailing steps that never ran
        not_attempted: usize,
    },

    /// Validation errors (bad catalog data, bad CLI input)
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for netrig operations
pub type Result<T> = std::result::Result<T, NetrigError>;

// Convenient error constructors
impl NetrigError {
    /// Create an unsupported-host error
    pub fn unsupported_host(msg: impl Into<String>) -> Self {
        Self::UnsupportedHost(msg.into())
    }

    /// Create a plan build error
    pub fn build(msg: impl Into<String>) -> Self {
        Self::Build(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
