//! Single-flight session renewal
//!
//! The coordinator guarantees that no matter how many requests observe an
//! expired credential concurrently, exactly one call to the renewal endpoint
//! is made per episode, and every participant sees the same settled outcome:
//! the new access credential, or `None` when the episode failed and the
//! session was terminated.
//!
//! Episode lifecycle:
//! 1. First caller finds no episode in progress, sets the flag, and runs the
//!    renewal call; later callers enqueue a waiter and ride the outcome
//! 2. Success writes the renewed credentials to the vault
//! 3. Failure of any kind clears the vault and announces session-ended
//! 4. The flag is cleared and the waiter queue drained under one lock
//!    acquisition, then the outcome is delivered — a failure arriving during
//!    delivery starts a fresh episode instead of corrupting this one
//!
//! A failed episode is terminal for that episode only: the next expired
//! credential starts a new one, since the renewal credential may still be
//! valid even if one attempt failed transiently.

use std::sync::Arc;

use steritrack_auth::{CredentialVault, Token, renew_session};
use tokio::sync::{Mutex, oneshot};
use tracing::{debug, info, warn};

use crate::activity::ActivityTracker;
use crate::session::SessionEvents;

/// Shared renewal state: the in-progress flag plus the waiter queue.
#[derive(Default)]
struct EpisodeState {
    in_progress: bool,
    waiters: Vec<oneshot::Sender<Option<Token>>>,
}

/// The single-flight renewal primitive.
///
/// Uses the credential-issuing HTTP client, never the authenticated one, so
/// a renewal call cannot recurse into the renewal flow.
pub struct RefreshCoordinator {
    http: reqwest::Client,
    renew_url: String,
    vault: Arc<CredentialVault>,
    events: SessionEvents,
    activity: ActivityTracker,
    episode: Mutex<EpisodeState>,
}

impl RefreshCoordinator {
    pub fn new(
        http: reqwest::Client,
        renew_url: String,
        vault: Arc<CredentialVault>,
        events: SessionEvents,
        activity: ActivityTracker,
    ) -> Self {
        Self {
            http,
            renew_url,
            vault,
            events,
            activity,
            episode: Mutex::new(EpisodeState::default()),
        }
    }

    /// Obtain a fresh access credential, or `None` if renewal failed and the
    /// session was terminated. Callable concurrently from arbitrarily many
    /// failed requests; all callers of one episode observe the same value.
    pub async fn request_refresh(&self) -> Option<Token> {
        let waiter = {
            let mut episode = self.episode.lock().await;
            if episode.in_progress {
                let (tx, rx) = oneshot::channel();
                episode.waiters.push(tx);
                Some(rx)
            } else {
                episode.in_progress = true;
                None
            }
        };

        if let Some(rx) = waiter {
            debug!("renewal already in progress, waiting for its outcome");
            // The initiator drains the queue before clearing the flag, so a
            // dropped sender only happens if the initiator was cancelled;
            // treat that as a failed episode.
            return rx.await.unwrap_or(None);
        }

        let outcome = self.run_episode().await;

        let waiters = {
            let mut episode = self.episode.lock().await;
            episode.in_progress = false;
            std::mem::take(&mut episode.waiters)
        };
        for tx in waiters {
            let _ = tx.send(outcome.clone());
        }

        outcome
    }

    /// Run one renewal episode: at most one network call, settled outcome
    /// for every participant.
    async fn run_episode(&self) -> Option<Token> {
        let Some(renewal) = self.vault.renewal().await else {
            warn!("credential expired with no renewal credential stored, ending session");
            self.terminate_session().await;
            return None;
        };

        // Renewal traffic drives the busy indicator like any other request
        let _activity = self.activity.begin();

        match renew_session(&self.http, &self.renew_url, &renewal).await {
            Ok(renewed) => {
                if let Err(e) = self
                    .vault
                    .rotate(renewed.access.clone(), renewed.renewal)
                    .await
                {
                    warn!(error = %e, "failed to persist renewed credentials");
                }
                metrics::counter!("session_renewals_total", "outcome" => "success").increment(1);
                info!("session renewal succeeded");
                Some(renewed.access)
            }
            Err(e) => {
                warn!(error = %e, "session renewal failed, ending session");
                metrics::counter!("session_renewals_total", "outcome" => "failure").increment(1);
                self.terminate_session().await;
                None
            }
        }
    }

    /// Clear stored credentials and broadcast session-ended.
    async fn terminate_session(&self) {
        if let Err(e) = self.vault.clear().await {
            warn!(error = %e, "failed to clear credential vault");
        }
        self.events.announce_session_ended();
    }
}
