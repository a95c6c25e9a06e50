//! Session-ended broadcasting
//!
//! A process-wide notification that the session has ended (credentials
//! cleared), consumed by whatever part of the embedding application owns
//! sign-out UI state. No payload beyond the fact itself. Announcing with
//! zero listeners is a no-op, and dropping a listener unsubscribes it.
//!
//! Consecutive failed renewal episodes each announce separately, so
//! listeners must be idempotent.

use tokio::sync::broadcast;

/// The session has ended: credentials were cleared.
#[derive(Debug, Clone, Copy)]
pub struct SessionEnded;

/// Handle for announcing and subscribing to session termination.
///
/// Clones share the same channel; the client holds one and hands clones to
/// the refresh coordinator.
#[derive(Debug, Clone)]
pub struct SessionEvents {
    tx: broadcast::Sender<SessionEnded>,
}

impl SessionEvents {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(8);
        Self { tx }
    }

    /// Register a listener. Dropping the returned listener unsubscribes it.
    pub fn subscribe(&self) -> SessionEndedListener {
        SessionEndedListener {
            rx: self.tx.subscribe(),
        }
    }

    /// Fire-and-forget announcement. Safe with zero listeners.
    pub fn announce_session_ended(&self) {
        let _ = self.tx.send(SessionEnded);
    }

    /// Number of live listeners.
    pub fn listener_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for SessionEvents {
    fn default() -> Self {
        Self::new()
    }
}

/// A registered session-ended listener.
#[derive(Debug)]
pub struct SessionEndedListener {
    rx: broadcast::Receiver<SessionEnded>,
}

impl SessionEndedListener {
    /// Wait for the next session-ended announcement. Returns `false` once
    /// every `SessionEvents` handle has been dropped. A listener that
    /// lagged behind still learns that the session ended.
    pub async fn ended(&mut self) -> bool {
        match self.rx.recv().await {
            Ok(SessionEnded) => true,
            Err(broadcast::error::RecvError::Lagged(_)) => true,
            Err(broadcast::error::RecvError::Closed) => false,
        }
    }

    /// Non-blocking check for a pending announcement.
    pub fn try_ended(&mut self) -> bool {
        match self.rx.try_recv() {
            Ok(SessionEnded) => true,
            Err(broadcast::error::TryRecvError::Lagged(_)) => true,
            Err(_) => false,
        }
    }
}
