//! Opaque credential token
//!
//! Tokens are opaque string data to this layer: no validation, no decoding.
//! The wrapper exists so tokens never leak through `Debug`/`Display` or
//! linger in freed memory. Serialization is transparent (a bare JSON string)
//! so the vault file stays a plain key/value document.

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

/// An access or renewal credential. Redacted in Debug/Display/logs,
/// zeroized on drop.
#[derive(Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
    /// Wrap a raw credential string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Expose the raw credential (use sparingly: header construction,
    /// renewal request bodies).
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl From<String> for Token {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Token {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl Drop for Token {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}
