//! Error types for the DynDNS system
//!
//! Classification rejections are not errors; they are reported as verdicts.
//! Everything here is either a backend/system fault or a startup failure.

use crate::traits::RecordType;
use thiserror::Error;

/// Result type alias for DynDNS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Self-test step that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelfTestStep {
    /// Reading the zone metadata
    Read,
    /// Creating the sentinel record
    Write,
    /// Deleting the sentinel record
    Cleanup,
}

impl SelfTestStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelfTestStep::Read => "read",
            SelfTestStep::Write => "write",
            SelfTestStep::Cleanup => "cleanup",
        }
    }
}

impl std::fmt::Display for SelfTestStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Core error type for the DynDNS system
#[derive(Error, Debug)]
pub enum Error {
    /// Zone backend errors (API failures, transport errors)
    #[error("Zone backend error: {0}")]
    Backend(String),

    /// Record or zone not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Record already exists
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Backend acknowledged a value different from the submitted one
    #[error(
        "verification mismatch: backend acknowledged {acknowledged:?} for {record_type} record, expected {expected:?}"
    )]
    Verification {
        /// Record type being published
        record_type: RecordType,
        /// The submitted value
        expected: String,
        /// The value the backend acknowledged
        acknowledged: String,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Startup credential self-test failed
    #[error("Self-test failed at {step} step: {message}")]
    SelfTest {
        /// Step that failed
        step: SelfTestStep,
        /// Underlying failure
        message: String,
    },

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(String),

    /// Authentication errors
    #[error("Authentication failed: {0}")]
    Authentication(String),

}

impl Error {
    /// Create a zone backend error
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a conflict error
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// Create a verification mismatch error
    pub fn verification(
        record_type: RecordType,
        expected: impl Into<String>,
        acknowledged: impl Into<String>,
    ) -> Self {
        Self::Verification {
            record_type,
            expected: expected.into(),
            acknowledged: acknowledged.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a self-test error for the given step
    pub fn self_test(step: SelfTestStep, message: impl Into<String>) -> Self {
        Self::SelfTest {
            step,
            message: message.into(),
        }
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Whether this error is a verification mismatch
    pub fn is_verification(&self) -> bool {
        matches!(self, Self::Verification { .. })
    }
}
