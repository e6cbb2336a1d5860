use thiserror::Error;

/// Unified error type for zone management operations
#[derive(Debug, Error)]
pub enum ZoneError {
    /// Name fails DNS label grammar
    #[error("invalid DNS name: {0}")]
    InvalidName(String),

    /// Name exceeds the 255 byte limit
    #[error("DNS name too long: {0} bytes")]
    NameTooLong(usize),

    /// Request rejected before any write
    #[error("{0}")]
    InvalidInput(String),

    /// Namespace claim does not cover the target domain
    #[error("{0}")]
    Forbidden(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0} already exists")]
    Conflict(String),

    /// Disallowed or locked record type
    #[error("{0}")]
    PolicyViolation(String),

    /// Missing, malformed, or unverifiable token
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Stored data violates a zone invariant; fatal, never retried
    #[error("corrupt zone state: {0}")]
    CorruptState(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, ZoneError>;
