//! Authenticated HTTP client for the SteriTrack backend
//!
//! Keeps one session credential valid across arbitrarily many concurrent
//! requests: attaches it to outgoing traffic, detects expiry, renews it
//! exactly once per expiry wave, replays the requests that were caught in
//! the wave, and broadcasts session loss to the rest of the application.
//!
//! Request lifecycle:
//! 1. `ApiClient::send()` bumps the in-flight tracker and dispatches with
//!    the stored access credential
//! 2. A 401 on a protected path enlists in the `RefreshCoordinator`; the
//!    first such failure runs the renewal call, later ones ride its outcome
//! 3. On renewal success the request is replayed once with the new
//!    credential; on failure the session ends and the original 401 is
//!    surfaced
//! 4. `SessionEvents` tells the embedding application to drop its
//!    authenticated UI state; `ActivityTracker` drives its busy indicator
//!
//! The CRUD surface of the application (screens, exports, the business
//! endpoints themselves) lives elsewhere; this crate only needs the backend
//! to return JSON and the occasional 401.

pub mod activity;
pub mod client;
pub mod config;
pub mod error;
pub mod refresh;
pub mod request;
pub mod session;

pub use activity::{ActivityGuard, ActivityTracker};
pub use client::ApiClient;
pub use config::{ApiConfig, ClientConfig, CredentialConfig};
pub use error::{Error, Result};
pub use refresh::RefreshCoordinator;
pub use request::{ApiRequest, CREDENTIAL_PATH_PREFIX, RENEWAL_PATH};
pub use session::{SessionEnded, SessionEndedListener, SessionEvents};
