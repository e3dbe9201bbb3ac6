//! # Foreground/background gate.
//!
//! [`VisibilitySignal`] is the host-side handle: the embedding application
//! flips it when its surface (window, tab, app) moves between foreground and
//! background. Each polling session holds a [`VisibilityGate`] on it.
//!
//! ## Gate contract
//! ```text
//! session start ──► current()            (one event, current state)
//! set_visible(v) ──► changed() yields v   (one event per transition)
//! signal dropped ──► changed() pends forever (state frozen)
//! ```
//!
//! - `set_visible` with the current value is not a transition and wakes nobody.
//! - Transitions faster than the session can observe them coalesce; the gate
//!   always reports the latest state.
//!
//! # Example
//! ```rust
//! use pollvisor::VisibilitySignal;
//!
//! let signal = VisibilitySignal::new(true);
//! assert!(signal.set_visible(false));
//! assert!(!signal.set_visible(false));
//! assert!(!signal.is_visible());
//! ```

use std::sync::Arc;

use futures::future;
use tokio::sync::watch;

/// Host-controlled visibility state shared with polling sessions.
///
/// Cheap to clone; all clones drive the same state.
#[derive(Clone, Debug)]
pub struct VisibilitySignal {
    tx: Arc<watch::Sender<bool>>,
}

impl VisibilitySignal {
    /// Creates a signal with the given initial visibility.
    pub fn new(visible: bool) -> Self {
        let (tx, _rx) = watch::channel(visible);
        Self { tx: Arc::new(tx) }
    }

    /// A signal that starts visible.
    ///
    /// Used by sessions spawned without a host signal.
    pub fn always_visible() -> Self {
        Self::new(true)
    }

    /// Records the host visibility.
    ///
    /// Returns `true` if this was a transition (sessions get notified).
    pub fn set_visible(&self, visible: bool) -> bool {
        self.tx.send_if_modified(|current| {
            if *current == visible {
                false
            } else {
                *current = visible;
                true
            }
        })
    }

    /// Current host visibility.
    pub fn is_visible(&self) -> bool {
        *self.tx.borrow()
    }

    /// Number of gates currently observing this signal.
    pub fn observer_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub(crate) fn gate(&self) -> VisibilityGate {
        VisibilityGate {
            rx: self.tx.subscribe(),
            closed: false,
        }
    }
}

/// Per-session view of a [`VisibilitySignal`].
#[derive(Debug)]
pub(crate) struct VisibilityGate {
    rx: watch::Receiver<bool>,
    closed: bool,
}

impl VisibilityGate {
    /// State at subscription time (and marks it as seen).
    pub(crate) fn current(&mut self) -> bool {
        *self.rx.borrow_and_update()
    }

    /// Waits for the next transition and returns the new state.
    ///
    /// Cancel-safe. Never completes once the host dropped every signal handle.
    pub(crate) async fn changed(&mut self) -> bool {
        if !self.closed {
            if self.rx.changed().await.is_ok() {
                return *self.rx.borrow_and_update();
            }
            self.closed = true;
        }
        future::pending().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_gate_reports_current_then_transitions() {
        let signal = VisibilitySignal::new(false);
        let mut gate = signal.gate();
        assert!(!gate.current());

        assert!(signal.set_visible(true));
        assert!(gate.changed().await);

        assert!(signal.set_visible(false));
        assert!(!gate.changed().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_value_is_not_a_transition() {
        let signal = VisibilitySignal::new(true);
        let mut gate = signal.gate();
        assert!(gate.current());

        assert!(!signal.set_visible(true));
        let res = tokio::time::timeout(Duration::from_secs(1), gate.changed()).await;
        assert!(res.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_signal_freezes_gate() {
        let signal = VisibilitySignal::new(true);
        let mut gate = signal.gate();
        assert_eq!(signal.observer_count(), 1);
        drop(signal);

        assert!(gate.current());
        let res = tokio::time::timeout(Duration::from_secs(60), gate.changed()).await;
        assert!(res.is_err());
    }

    #[tokio::test]
    async fn test_rapid_transitions_coalesce_to_latest() {
        let signal = VisibilitySignal::new(true);
        let mut gate = signal.gate();
        gate.current();

        signal.set_visible(false);
        signal.set_visible(true);
        signal.set_visible(false);
        assert!(!gate.changed().await);
    }
}
