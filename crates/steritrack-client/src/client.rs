//! Authenticated API client
//!
//! Dispatches requests against the backend, attaches the stored access
//! credential, classifies failures, and recovers from credential expiry
//! through the refresh coordinator. Two HTTP clients back one `ApiClient`:
//! the authenticated one for protected traffic, and a separate one (owned by
//! the coordinator) for credential-issuing traffic, so renewal calls never
//! re-enter the renewal flow.
//!
//! Classification of a settled request:
//! 1. Transport failure (no response at all) — surfaced unchanged, never
//!    renewal-eligible
//! 2. Any status other than 401 — returned to the caller verbatim
//! 3. 401 on a credential-issuing path, or on an already-replayed request —
//!    returned verbatim (loop breakers)
//! 4. 401 on a protected, non-replayed request — renewed and replayed once;
//!    if no renewal credential exists or renewal fails, the session ends and
//!    the original 401 is returned

use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use steritrack_auth::{CredentialVault, Token};
use tracing::{debug, instrument, warn};

use crate::activity::ActivityTracker;
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::refresh::RefreshCoordinator;
use crate::request::{ApiRequest, Attempt, RENEWAL_PATH};
use crate::session::SessionEvents;

/// Authenticated client for the backend API.
///
/// Cheap to clone; clones share the vault, coordinator, activity tracker,
/// and session events.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
    vault: Arc<CredentialVault>,
    refresher: Arc<RefreshCoordinator>,
    activity: ActivityTracker,
    events: SessionEvents,
}

impl ApiClient {
    pub fn new(config: &ClientConfig, vault: Arc<CredentialVault>) -> Self {
        let base_url = config.api.base_url.trim_end_matches('/').to_owned();
        let events = SessionEvents::new();
        let activity = ActivityTracker::new();
        let refresher = Arc::new(RefreshCoordinator::new(
            reqwest::Client::new(),
            format!("{base_url}{RENEWAL_PATH}"),
            vault.clone(),
            events.clone(),
            activity.clone(),
        ));
        Self {
            http: reqwest::Client::new(),
            base_url,
            timeout: config.timeout(),
            vault,
            refresher,
            activity,
            events,
        }
    }

    /// Dispatch a request, transparently renewing the session and replaying
    /// once if the access credential has expired.
    ///
    /// The final response is returned verbatim whatever its status; only
    /// network-level failures surface as `Err`.
    pub async fn send(&self, request: ApiRequest) -> Result<reqwest::Response> {
        let request_id = format!("req_{}", uuid::Uuid::new_v4().as_simple());
        self.drive(Attempt::first(request), request_id).await
    }

    /// Clear stored credentials and broadcast session-ended (explicit
    /// sign-out).
    pub async fn sign_out(&self) -> Result<()> {
        self.vault.clear().await?;
        self.events.announce_session_ended();
        Ok(())
    }

    /// Session-ended announcements, for the embedding application's UI.
    pub fn session_events(&self) -> &SessionEvents {
        &self.events
    }

    /// In-flight request tracking, for the global busy indicator.
    pub fn activity(&self) -> &ActivityTracker {
        &self.activity
    }

    /// The shared credential vault.
    pub fn vault(&self) -> &Arc<CredentialVault> {
        &self.vault
    }

    #[instrument(skip_all, fields(request_id = %request_id, method = %attempt.request.method(), path = %attempt.request.path()))]
    async fn drive(&self, mut attempt: Attempt, request_id: String) -> Result<reqwest::Response> {
        // Replay credential: set after a successful renewal so the reissued
        // request carries the episode's token even if the vault has moved on
        let mut renewed: Option<Token> = None;

        loop {
            let response = self.dispatch(&attempt, renewed.as_ref()).await?;

            if response.status() != StatusCode::UNAUTHORIZED
                || attempt.request.is_credential_path()
                || attempt.retried
            {
                return Ok(response);
            }

            // Expired credential on a protected, non-replayed request
            attempt.retried = true;

            if !self.vault.has_renewal().await {
                debug!("expired credential with no renewal credential stored, ending session");
                if let Err(e) = self.vault.clear().await {
                    warn!(error = %e, "failed to clear credential vault");
                }
                self.events.announce_session_ended();
                return Ok(response);
            }

            match self.refresher.request_refresh().await {
                Some(access) => {
                    debug!("credential renewed, replaying request");
                    renewed = Some(access);
                }
                // Renewal failed: surface the original 401, not a
                // synthesized error
                None => return Ok(response),
            }
        }
    }

    /// One physical attempt: bump the activity tracker, attach the bearer
    /// credential, send on the authenticated client.
    async fn dispatch(
        &self,
        attempt: &Attempt,
        bearer: Option<&Token>,
    ) -> Result<reqwest::Response> {
        let _activity = self.activity.begin();

        let url = format!("{}{}", self.base_url, attempt.request.path());
        let mut builder = self
            .http
            .request(attempt.request.method().clone(), &url)
            .timeout(self.timeout);

        if !attempt.request.is_credential_path() {
            let token = match bearer {
                Some(token) => Some(token.clone()),
                None => self.vault.access().await,
            };
            if let Some(token) = token {
                builder = builder.bearer_auth(token.expose());
            }
        }

        if !attempt.request.query_pairs().is_empty() {
            builder = builder.query(attempt.request.query_pairs());
        }
        if let Some(body) = attempt.request.body() {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            Error::Transport(format!(
                "{} {} failed: {e}",
                attempt.request.method(),
                attempt.request.path()
            ))
        })?;

        metrics::counter!(
            "client_requests_total",
            "status" => response.status().as_u16().to_string()
        )
        .increment(1);

        Ok(response)
    }
}
