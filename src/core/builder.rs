//! # Session builder.
//!
//! [`Poller`] collects a source, its [`PollConfig`] and optional collaborators
//! (scheduler, visibility signal, subscribers), then spawns the session.
//!
//! ## Wiring
//! ```text
//! Poller::spawn()
//!   ├─► PollConfig::validate()            (reject before anything runs)
//!   ├─► Bus::new(capacity)                 (per-session sequence numbers)
//!   ├─► subscriber_listener(): Bus.subscribe() ─► SubscriberSet::emit(Event)
//!   ├─► PollDriver::run()                  (tokio task)
//!   └─► PollSession { rx, token, handles }
//! ```
//!
//! Sessions share nothing: each one owns its bus, counters, tick grid and
//! cancellation token.

use std::sync::Arc;

use tokio::{
    select,
    sync::{
        broadcast::{
            self,
            error::{RecvError, TryRecvError},
        },
        mpsc,
    },
};
use tokio_util::sync::CancellationToken;

use crate::{
    config::PollConfig,
    core::{
        driver::{DriverParams, PollDriver},
        recovery::Recovery,
        scheduler::{Scheduler, TokioScheduler},
        session::PollSession,
        visibility::VisibilitySignal,
    },
    error::ConfigError,
    events::{Bus, Event},
    policies::BackoffPolicy,
    sources::Source,
    subscribers::{Subscribe, SubscriberSet},
};

/// Default capacity of a session's event bus.
pub const DEFAULT_BUS_CAPACITY: usize = 1024;

/// Builder for a polling session.
///
/// # Example
/// ```rust
/// use std::time::Duration;
/// use tokio_util::sync::CancellationToken;
/// use pollvisor::{PollConfig, Poller, SourceFn, VisibilitySignal};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let visibility = VisibilitySignal::new(true);
///     let source = SourceFn::new("ping", |_ctx: CancellationToken| async {
///         Ok::<_, std::io::Error>("pong")
///     });
///
///     let mut session = Poller::new(source, PollConfig::new(Duration::from_millis(50)))
///         .with_visibility(&visibility)
///         .spawn()
///         .expect("valid config");
///
///     assert_eq!(session.recv().await.unwrap().unwrap(), "pong");
///     session.cancel();
///     assert!(session.recv().await.is_none());
/// }
/// ```
pub struct Poller<S: Source> {
    source: Arc<S>,
    config: PollConfig,
    scheduler: Arc<dyn Scheduler>,
    visibility: Option<VisibilitySignal>,
    subscribers: Vec<Arc<dyn Subscribe>>,
    bus_capacity: usize,
}

impl<S: Source> Poller<S> {
    /// Creates a builder with the default scheduler, always visible, no subscribers.
    pub fn new(source: S, config: PollConfig) -> Self {
        Self::from_arc(Arc::new(source), config)
    }

    /// Same as [`Poller::new`] for a source shared with other sessions.
    pub fn from_arc(source: Arc<S>, config: PollConfig) -> Self {
        Self {
            source,
            config,
            scheduler: Arc::new(TokioScheduler),
            visibility: None,
            subscribers: Vec::new(),
            bus_capacity: DEFAULT_BUS_CAPACITY,
        }
    }

    /// Replaces the clock used for ticks and backoff waits.
    pub fn with_scheduler(mut self, scheduler: impl Scheduler) -> Self {
        self.scheduler = Arc::new(scheduler);
        self
    }

    /// Gates the session on a host visibility signal.
    ///
    /// Without one, the session behaves as if the host were always visible.
    pub fn with_visibility(mut self, signal: &VisibilitySignal) -> Self {
        self.visibility = Some(signal.clone());
        self
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive session events through dedicated workers with
    /// bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Sets the event bus capacity (min 1).
    pub fn with_bus_capacity(mut self, capacity: usize) -> Self {
        self.bus_capacity = capacity;
        self
    }

    /// Validates the configuration and starts the session.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(self) -> Result<PollSession<S::Output, S::Error>, ConfigError> {
        self.config.validate()?;

        let bus = Bus::new(self.bus_capacity);
        let token = CancellationToken::new();
        let finished = CancellationToken::new();

        let listener = if self.subscribers.is_empty() {
            None
        } else {
            let set = SubscriberSet::new(self.subscribers, bus.clone());
            let rx = bus.subscribe();
            Some(tokio::spawn(subscriber_listener(rx, set, finished.clone())))
        };

        let gate = match &self.visibility {
            Some(signal) => signal.gate(),
            None => VisibilitySignal::always_visible().gate(),
        };

        let (tx, rx) = mpsc::unbounded_channel();
        let params = DriverParams {
            source: self.source,
            scheduler: self.scheduler,
            interval: self.config.interval,
            recovery: Recovery::new(
                BackoffPolicy::from_config(&self.config),
                self.config.attempts,
            ),
            bus,
            tx,
        };
        let driver = PollDriver::new(params, gate, token.clone(), finished);
        let handle = tokio::spawn(driver.run());

        Ok(PollSession::new(rx, token, handle, listener))
    }
}

/// Starts polling `source` with `config`, always visible, default scheduler.
///
/// Shorthand for `Poller::new(source, config).spawn()`.
pub fn poll<S: Source>(
    source: S,
    config: PollConfig,
) -> Result<PollSession<S::Output, S::Error>, ConfigError> {
    Poller::new(source, config).spawn()
}

/// Forwards bus events to the subscriber set until the driver finished,
/// then drains what is left and shuts the workers down.
async fn subscriber_listener(
    mut rx: broadcast::Receiver<Event>,
    set: SubscriberSet,
    finished: CancellationToken,
) {
    loop {
        select! {
            biased;
            msg = rx.recv() => match msg {
                Ok(ev) => set.emit(ev),
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            },
            _ = finished.cancelled() => {
                loop {
                    match rx.try_recv() {
                        Ok(ev) => set.emit(ev),
                        Err(TryRecvError::Lagged(_)) => continue,
                        Err(_) => break,
                    }
                }
                break;
            }
        }
    }
    set.shutdown().await;
}
