//! Error types for client operations
//!
//! Non-2xx responses are not errors here: the final response is returned to
//! the caller verbatim so business code can inspect the original payload.
//! Only failures that produce no response at all, or break the client's own
//! machinery, surface as `Error`.

use thiserror::Error;

/// Errors from dispatching requests and managing the session.
#[derive(Debug, Error)]
pub enum Error {
    /// Network-level failure: no response was received (offline, DNS,
    /// connection refused, timeout). Never triggers a renewal attempt.
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("credential store error: {0}")]
    Credential(#[from] steritrack_auth::Error),
}

/// Result alias using client Error.
pub type Result<T> = std::result::Result<T, Error>;
