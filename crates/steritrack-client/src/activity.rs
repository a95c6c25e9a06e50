//! In-flight request tracking
//!
//! A reference count of requests currently in flight, driving one global
//! busy indicator even when requests overlap. `begin()` returns an RAII
//! guard so every dispatch decrements exactly once, including on error
//! paths. The count clamps at zero: an `end()` without a matching `begin()`
//! must not underflow, because request lifecycles are hard to track
//! exhaustively across error paths.
//!
//! The busy flag flips only on the 0→1 and 1→0 transitions and is exposed
//! as a watch channel for the embedding UI.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::watch;

/// Shared in-flight counter with a watch-channel busy flag.
#[derive(Debug, Clone)]
pub struct ActivityTracker {
    inner: Arc<ActivityInner>,
}

#[derive(Debug)]
struct ActivityInner {
    in_flight: AtomicUsize,
    busy_tx: watch::Sender<bool>,
}

impl ActivityTracker {
    pub fn new() -> Self {
        let (busy_tx, _) = watch::channel(false);
        Self {
            inner: Arc::new(ActivityInner {
                in_flight: AtomicUsize::new(0),
                busy_tx,
            }),
        }
    }

    /// Mark one request as in flight. The returned guard ends the request
    /// when dropped.
    pub fn begin(&self) -> ActivityGuard {
        let previous = self.inner.in_flight.fetch_add(1, Ordering::SeqCst);
        if previous == 0 {
            self.inner.busy_tx.send_replace(true);
        }
        metrics::gauge!("client_requests_in_flight").increment(1.0);
        ActivityGuard {
            tracker: self.clone(),
        }
    }

    /// Mark one request as settled. Clamped at zero: calling without a
    /// matching `begin()` is tolerated and changes nothing.
    pub fn end(&self) {
        let previous =
            self.inner
                .in_flight
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        match previous {
            Ok(1) => {
                self.inner.busy_tx.send_replace(false);
                metrics::gauge!("client_requests_in_flight").decrement(1.0);
            }
            Ok(_) => {
                metrics::gauge!("client_requests_in_flight").decrement(1.0);
            }
            Err(_) => {
                // end() without begin(): already at zero
            }
        }
    }

    /// Current number of in-flight requests.
    pub fn in_flight(&self) -> usize {
        self.inner.in_flight.load(Ordering::SeqCst)
    }

    /// Whether any request is in flight.
    pub fn is_busy(&self) -> bool {
        self.in_flight() > 0
    }

    /// Watch receiver for the busy flag. The current value is readable
    /// immediately via `borrow()`.
    pub fn busy_watch(&self) -> watch::Receiver<bool> {
        self.inner.busy_tx.subscribe()
    }
}

impl Default for ActivityTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII handle for one in-flight request.
#[derive(Debug)]
pub struct ActivityGuard {
    tracker: ActivityTracker,
}

impl Drop for ActivityGuard {
    fn drop(&mut self) {
        self.tracker.end();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_and_drop_balance_the_count() {
        let tracker = ActivityTracker::new();
        assert_eq!(tracker.in_flight(), 0);

        let guard = tracker.begin();
        assert_eq!(tracker.in_flight(), 1);
        assert!(tracker.is_busy());

        drop(guard);
        assert_eq!(tracker.in_flight(), 0);
        assert!(!tracker.is_busy());
    }

    #[test]
    fn overlapping_guards_keep_busy_until_last_ends() {
        let tracker = ActivityTracker::new();
        let busy = tracker.busy_watch();

        let a = tracker.begin();
        let b = tracker.begin();
        assert_eq!(tracker.in_flight(), 2);
        assert!(*busy.borrow());

        drop(a);
        assert!(*busy.borrow(), "busy must hold while one request remains");

        drop(b);
        assert!(!*busy.borrow());
    }

    #[test]
    fn end_without_begin_clamps_at_zero() {
        let tracker = ActivityTracker::new();
        tracker.end();
        tracker.end();
        assert_eq!(tracker.in_flight(), 0);
        assert!(!tracker.is_busy());

        // A later begin/end cycle still transitions correctly
        let guard = tracker.begin();
        assert!(tracker.is_busy());
        drop(guard);
        assert!(!tracker.is_busy());
    }

    #[test]
    fn busy_flag_transitions_only_on_edges() {
        let tracker = ActivityTracker::new();
        let busy = tracker.busy_watch();
        assert!(!*busy.borrow());

        let a = tracker.begin();
        assert!(*busy.borrow());

        // A second begin is not a transition; the flag just stays set
        let b = tracker.begin();
        assert!(*busy.borrow());

        drop(b);
        drop(a);
        assert!(!*busy.borrow());
    }

    #[tokio::test]
    async fn watch_subscriber_sees_the_hide_transition() {
        let tracker = ActivityTracker::new();
        let mut busy = tracker.busy_watch();

        let guard = tracker.begin();
        busy.changed().await.unwrap();
        assert!(*busy.borrow_and_update());

        drop(guard);
        busy.changed().await.unwrap();
        assert!(!*busy.borrow_and_update());
    }

    #[test]
    fn clones_share_the_counter() {
        let tracker = ActivityTracker::new();
        let clone = tracker.clone();

        let _guard = tracker.begin();
        assert_eq!(clone.in_flight(), 1);
        clone.end();
        assert_eq!(tracker.in_flight(), 0);
    }
}
