//! Credential primitives for the SteriTrack backend client
//!
//! Provides the redacted token type, durable credential storage, and the
//! session-renewal call. This crate is a standalone library with no
//! dependency on the client — it can be tested and used independently.
//!
//! Credential flow:
//! 1. The application completes login elsewhere and calls
//!    `CredentialVault::install()` with the issued pair
//! 2. The client reads `CredentialVault::access()` to authorize requests
//! 3. On expiry, the refresh coordinator calls `renew_session()` with the
//!    stored renewal credential
//! 4. Renewed credentials are saved via `CredentialVault::rotate()`
//! 5. Renewal failure or sign-out ends the session via
//!    `CredentialVault::clear()`

pub mod credentials;
pub mod error;
pub mod renew;
pub mod token;

pub use credentials::{CredentialPair, CredentialVault};
pub use error::{Error, Result};
pub use renew::{RenewalResponse, RenewedCredentials, renew_session};
pub use token::Token;
