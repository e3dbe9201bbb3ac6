//! # Event delivery to session observers.
//!
//! [`SubscriberSet`] owns one queue and one worker task per observer. The
//! subscriber listener hands it every bus event through [`SubscriberSet::emit`],
//! which never waits: the poll loop keeps its cadence whatever the observers do.
//!
//! ```text
//! bus ─► listener ─► emit(event) ─┬─► queue ─► worker ─► Recorder::on_event
//!                                 └─► queue ─► worker ─► LogWriter::on_event
//! ```
//!
//! Each observer sees events in bus order; observers are not synchronized
//! with each other. A skipped event is reported as `SubscriberOverflow`
//! (reason "full", or "closed" once the worker is gone). A panicking
//! `on_event` is reported as `SubscriberPanicked` and the worker moves on to
//! the next event, so state behind a lock the observer held may be left
//! half-updated.

use std::{panic::AssertUnwindSafe, sync::Arc};

use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::error::panic_reason;
use crate::events::{Bus, Event, EventKind};
use crate::subscribers::Subscribe;

/// Sending half of one observer's queue.
struct SubscriberChannel {
    name: &'static str,
    sender: mpsc::Sender<Arc<Event>>,
}

/// Observers of one session, each behind its own queue.
pub struct SubscriberSet {
    channels: Vec<SubscriberChannel>,
    workers: Vec<JoinHandle<()>>,
    bus: Bus,
}

impl SubscriberSet {
    /// Spawns a worker per observer; worker panics are reported on `bus`.
    ///
    /// Needs a tokio runtime. Queue capacities below 1 are raised to 1.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>, bus: Bus) -> Self {
        let (channels, workers) = subs
            .into_iter()
            .map(|sub| {
                let (sender, queue) = mpsc::channel(sub.queue_capacity().max(1));
                let channel = SubscriberChannel {
                    name: sub.name(),
                    sender,
                };
                (channel, tokio::spawn(observe(sub, queue, bus.clone())))
            })
            .unzip();
        Self {
            channels,
            workers,
            bus,
        }
    }

    /// Queues `event` for every observer without waiting.
    ///
    /// An observer that cannot take it is reported with `SubscriberOverflow`,
    /// except when the skipped event is itself an overflow report.
    pub fn emit(&self, event: Event) {
        let reports_overflow = event.kind == EventKind::SubscriberOverflow;
        let event = Arc::new(event);

        for channel in &self.channels {
            let reason = match channel.sender.try_send(Arc::clone(&event)) {
                Ok(()) => continue,
                Err(mpsc::error::TrySendError::Full(_)) => "full",
                Err(mpsc::error::TrySendError::Closed(_)) => "closed",
            };
            if !reports_overflow {
                self.bus.publish(Event::subscriber_overflow(channel.name, reason));
            }
        }
    }

    /// Closes the queues and waits until every worker has handled what was
    /// already queued.
    pub async fn shutdown(self) {
        drop(self.channels);

        for worker in self.workers {
            let _ = worker.await;
        }
    }

    /// True when the session has no observers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Number of observers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.channels.len()
    }
}

/// Worker loop of one observer; ends when the queue is closed and drained.
async fn observe(sub: Arc<dyn Subscribe>, mut queue: mpsc::Receiver<Arc<Event>>, bus: Bus) {
    while let Some(event) = queue.recv().await {
        let handled = AssertUnwindSafe(sub.on_event(&event)).catch_unwind().await;
        if let Err(payload) = handled {
            bus.publish(Event::subscriber_panicked(sub.name(), panic_reason(&*payload)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Collect {
        seen: Mutex<Vec<EventKind>>,
    }

    #[async_trait]
    impl Subscribe for Collect {
        async fn on_event(&self, event: &Event) {
            self.seen.lock().unwrap().push(event.kind);
        }

        fn name(&self) -> &'static str {
            "collect"
        }
    }

    struct Panicky;

    #[async_trait]
    impl Subscribe for Panicky {
        async fn on_event(&self, event: &Event) {
            if event.kind == EventKind::PollFailed {
                panic!("boom");
            }
        }

        fn name(&self) -> &'static str {
            "panicky"
        }
    }

    #[tokio::test]
    async fn test_fan_out_preserves_order_per_subscriber() {
        let bus = Bus::new(16);
        let a = Arc::new(Collect::default());
        let b = Arc::new(Collect::default());
        let subs: Vec<Arc<dyn Subscribe>> = vec![a.clone(), b.clone()];
        let set = SubscriberSet::new(subs, bus);
        assert_eq!(set.len(), 2);

        set.emit(Event::new(EventKind::PollStarting));
        set.emit(Event::new(EventKind::PollSucceeded));
        set.shutdown().await;

        let expected = vec![EventKind::PollStarting, EventKind::PollSucceeded];
        assert_eq!(*a.seen.lock().unwrap(), expected);
        assert_eq!(*b.seen.lock().unwrap(), expected);
    }

    #[tokio::test]
    async fn test_panic_is_reported_and_worker_survives() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(Panicky)];
        let set = SubscriberSet::new(subs, bus);

        set.emit(Event::new(EventKind::PollFailed));
        set.emit(Event::new(EventKind::PollSucceeded));
        set.shutdown().await;

        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::SubscriberPanicked);
        assert_eq!(ev.source.as_deref(), Some("panicky"));
        assert_eq!(ev.reason.as_deref(), Some("boom"));
    }

    #[tokio::test]
    async fn test_empty_set() {
        let set = SubscriberSet::new(Vec::new(), Bus::new(4));
        assert!(set.is_empty());
        set.emit(Event::new(EventKind::SessionStarted));
        set.shutdown().await;
    }
}
