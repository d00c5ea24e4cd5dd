//! Error types for IP set mutation

use thiserror::Error;

use crate::domain::ConfigError;

/// Errors that can occur while mutating an IP set
///
/// `Read` and `Write` keep the store error as their source so the retry
/// controller can tell a version conflict apart from every other failure.
#[derive(Debug, Error)]
pub enum IpSetError {
    #[error("ipset: get ip set: {0}")]
    Read(#[source] StoreError),

    #[error("ipset: update ip set: {0}")]
    Write(#[source] StoreError),

    #[error("ipset: retries exhausted after {attempts} attempts: {source}")]
    RetryExhausted {
        attempts: u32,
        #[source]
        source: StoreError,
    },

    #[error("ipset: operation cancelled")]
    Cancelled,

    #[error("ipset: invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

impl IpSetError {
    /// True when the conditional write was rejected because of a stale lock token
    pub fn is_version_conflict(&self) -> bool {
        matches!(self, IpSetError::Write(StoreError::VersionConflict { .. }))
    }

    /// The store error underneath this failure, if there is one
    pub fn store_error(&self) -> Option<&StoreError> {
        match self {
            IpSetError::Read(e) | IpSetError::Write(e) => Some(e),
            IpSetError::RetryExhausted { source, .. } => Some(source),
            IpSetError::Cancelled | IpSetError::Config(_) => None,
        }
    }
}

/// Errors from the remote IP set store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The supplied lock token no longer matches the stored one
    #[error("optimistic lock rejected for ip set {id}")]
    VersionConflict { id: String },

    #[error("ip set not found: {id}")]
    NotFound { id: String },

    #[error("access denied: {0}")]
    AccessDenied(String),

    #[error("request throttled")]
    Throttled,

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("transport error: {0}")]
    Transport(String),
}
