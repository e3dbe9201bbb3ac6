//! # PollDriver: the per-session loop.
//!
//! Drives one [`Source`] for the lifetime of a [`PollSession`](crate::PollSession):
//! - gates polling on host visibility,
//! - ticks on a fixed interval grid with switch-to-latest invocations,
//! - backs off per [`BackoffPolicy`](crate::BackoffPolicy) after failures,
//! - stops on exhaustion, cancellation, or when the consumer goes away.
//!
//! ## Architecture
//! ```text
//! Poller::spawn() ──► PollDriver::run()
//!
//! loop {
//!   select! (biased) {
//!     token.cancelled()  → publish SessionCancelled, stop
//!     gate.changed()     → publish VisibilityChanged, drop activation, restart
//!     activate(visible)  → hidden: pend forever
//!                          visible:
//!                            begin_activation (consecutive := 0)
//!                            loop {                                ◄──────────┐
//!                              ticker (immediate first tick)                 │
//!                              run_once per tick (superseded by next tick)   │
//!                              Ok  → on_success, deliver value               │
//!                              Err → on_failure:                             │
//!                                    Retry     → BackoffScheduled, sleep ────┘
//!                                    Exhausted → deliver PollError, stop
//!                            }
//!   }
//! }
//! ```
//!
//! ## Rules
//! - Invocations of one session never overlap
//! - The attempt counter **increments on each invocation** and never resets
//! - Dropping the activation future drops (and cancels) any in-flight invocation
//!   and any pending backoff wait
//! - A panic from the scheduler or the source ends the session with
//!   `SessionAborted` and a delivered [`PollError::Aborted`]

use std::{panic::AssertUnwindSafe, sync::Arc, time::Duration};

use futures::{FutureExt, future};
use tokio::{select, sync::mpsc};
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::{
    core::{
        recovery::{Recovery, RecoveryStep},
        runner::{Outcome, run_once},
        scheduler::Scheduler,
        ticker::Ticker,
        visibility::VisibilityGate,
    },
    error::{PollError, panic_reason},
    events::{Bus, Event, EventKind},
    sources::Source,
};

/// Item delivered to the consumer of a session.
pub(crate) type Delivery<S> = Result<<S as Source>::Output, PollError<<S as Source>::Error>>;

/// Everything the driver needs, extracted from a [`Poller`](crate::Poller) at spawn time.
pub(crate) struct DriverParams<S: Source> {
    pub source: Arc<S>,
    pub scheduler: Arc<dyn Scheduler>,
    pub interval: Duration,
    pub recovery: Recovery,
    pub bus: Bus,
    pub tx: mpsc::UnboundedSender<Delivery<S>>,
}

/// Why an activation ended on its own.
enum Finished {
    /// Retry budget spent; the error was delivered.
    Exhausted,
    /// The consumer dropped its receiver.
    Abandoned,
}

/// Supervises polling of a single source for one session.
pub(crate) struct PollDriver<S: Source> {
    gate: VisibilityGate,
    token: CancellationToken,
    core: PollCore<S>,
    /// Cancelled when the driver stops, however it stops.
    finished: CancellationToken,
}

/// Poll state that survives visibility transitions.
struct PollCore<S: Source> {
    source: Arc<S>,
    name: Arc<str>,
    scheduler: Arc<dyn Scheduler>,
    interval: Duration,
    recovery: Recovery,
    bus: Bus,
    tx: mpsc::UnboundedSender<Delivery<S>>,
    token: CancellationToken,
    attempt: u64,
}

impl<S: Source> PollDriver<S> {
    pub(crate) fn new(
        params: DriverParams<S>,
        gate: VisibilityGate,
        token: CancellationToken,
        finished: CancellationToken,
    ) -> Self {
        let name: Arc<str> = Arc::from(params.source.name());
        Self {
            gate,
            token: token.clone(),
            core: PollCore {
                source: params.source,
                name,
                scheduler: params.scheduler,
                interval: params.interval,
                recovery: params.recovery,
                bus: params.bus,
                tx: params.tx,
                token,
                attempt: 0,
            },
            finished,
        }
    }

    /// Runs the session until exhaustion, cancellation, consumer drop or a panic.
    ///
    /// `finished` fires only after the abort report is on the bus, so the
    /// subscriber listener still drains it.
    pub(crate) async fn run(self) {
        let _finished = self.finished.clone().drop_guard();
        let tx = self.core.tx.clone();
        let bus = self.core.bus.clone();
        let name = Arc::clone(&self.core.name);
        let token = self.token.clone();

        if let Err(payload) = AssertUnwindSafe(self.drive()).catch_unwind().await {
            let reason = panic_reason(&*payload);
            bus.publish(
                Event::new(EventKind::SessionAborted)
                    .with_source(name)
                    .with_reason(reason.as_str()),
            );
            if !token.is_cancelled() {
                let _ = tx.send(Err(PollError::Aborted { reason }));
            }
        }
    }

    async fn drive(mut self) {
        let mut visible = self.gate.current();
        self.core.publish(Event::new(EventKind::SessionStarted).with_visible(visible));

        loop {
            select! {
                biased;
                _ = self.token.cancelled() => {
                    self.core.publish(Event::new(EventKind::SessionCancelled));
                    break;
                }
                v = self.gate.changed() => {
                    visible = v;
                    self.core.publish(Event::new(EventKind::VisibilityChanged).with_visible(v));
                }
                finished = self.core.activate(visible) => {
                    if matches!(finished, Finished::Abandoned) {
                        self.token.cancel();
                    }
                    break;
                }
            }
        }
    }
}

impl<S: Source> PollCore<S> {
    fn publish(&self, ev: Event) {
        self.bus.publish(ev.with_source(Arc::clone(&self.name)));
    }

    /// One visible period. Never completes while hidden.
    async fn activate(&mut self, visible: bool) -> Finished {
        if !visible {
            return future::pending().await;
        }
        self.recovery.begin_activation();

        loop {
            let error = match self.poll_until_failure().await {
                Ok(error) => error,
                Err(finished) => return finished,
            };

            match self.recovery.on_failure() {
                RecoveryStep::Retry { delay, failures } => {
                    let reason = error.to_string();
                    self.publish(
                        Event::new(EventKind::PollFailed)
                            .with_attempt(self.attempt)
                            .with_failures(failures)
                            .with_reason(reason.as_str()),
                    );
                    if let Some(strategy) = self.recovery.unrecognized_strategy() {
                        warn!(
                            source = %self.name,
                            strategy,
                            "unknown backoff strategy, using constant delay"
                        );
                        self.publish(Event::new(EventKind::StrategyFallback).with_reason(strategy));
                    }
                    self.publish(
                        Event::new(EventKind::BackoffScheduled)
                            .with_failures(failures)
                            .with_delay(delay)
                            .with_reason(reason),
                    );
                    self.scheduler.sleep(delay).await;
                }
                RecoveryStep::Exhausted { failures } => {
                    let reason = error.to_string();
                    self.publish(
                        Event::new(EventKind::PollFailed)
                            .with_attempt(self.attempt)
                            .with_failures(failures)
                            .with_reason(reason.as_str()),
                    );
                    self.publish(
                        Event::new(EventKind::RetriesExhausted)
                            .with_failures(failures)
                            .with_reason(reason),
                    );
                    let _ = self.tx.send(Err(PollError::Exhausted { failures, error }));
                    return Finished::Exhausted;
                }
            }
        }
    }

    /// Polls on a fresh tick grid until an invocation fails.
    ///
    /// Returns `Ok(error)` on the first failure, `Err(Finished)` if the
    /// consumer went away.
    async fn poll_until_failure(&mut self) -> Result<S::Error, Finished> {
        let mut ticker = Ticker::start(Arc::clone(&self.scheduler), self.interval);
        ticker.tick().await;

        loop {
            self.attempt += 1;
            let outcome = run_once(
                self.source.as_ref(),
                &self.token,
                self.attempt,
                ticker.due(),
                &self.bus,
            )
            .await;

            match outcome {
                Outcome::Superseded => ticker.advance(),
                Outcome::Settled(Ok(value)) => {
                    self.recovery.on_success();
                    self.publish(Event::new(EventKind::PollSucceeded).with_attempt(self.attempt));
                    if self.tx.send(Ok(value)).is_err() {
                        return Err(Finished::Abandoned);
                    }
                    ticker.tick().await;
                }
                Outcome::Settled(Err(error)) => return Ok(error),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    use tokio::time::Instant;

    use crate::{
        core::{scheduler::TokioScheduler, visibility::VisibilitySignal},
        policies::{BackoffPolicy, BackoffStrategy},
        sources::SourceFn,
    };

    fn recovery(attempts: u32) -> Recovery {
        let policy = BackoffPolicy {
            strategy: BackoffStrategy::Exponential,
            exponential_unit: Duration::from_millis(10),
            random_range: Duration::from_millis(1000)..Duration::from_millis(10_000),
            constant: Duration::from_millis(60),
        };
        Recovery::new(policy, attempts)
    }

    fn spawn<S: Source>(
        source: S,
        interval_ms: u64,
        attempts: u32,
        signal: &VisibilitySignal,
    ) -> (
        mpsc::UnboundedReceiver<Delivery<S>>,
        CancellationToken,
        CancellationToken,
        tokio::task::JoinHandle<()>,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        let token = CancellationToken::new();
        let finished = CancellationToken::new();
        let driver = PollDriver::new(
            DriverParams {
                source: Arc::new(source),
                scheduler: Arc::new(TokioScheduler),
                interval: Duration::from_millis(interval_ms),
                recovery: recovery(attempts),
                bus: Bus::new(256),
                tx,
            },
            signal.gate(),
            token.clone(),
            finished.clone(),
        );
        (rx, token, finished, tokio::spawn(driver.run()))
    }

    #[tokio::test(start_paused = true)]
    async fn test_delivers_on_interval_grid() {
        let start = Instant::now();
        let signal = VisibilitySignal::new(true);
        let src = SourceFn::new("t", |_ctx: CancellationToken| async {
            Ok::<_, String>(Instant::now())
        });
        let (mut rx, token, _finished, handle) = spawn(src, 20, 9, &signal);

        let mut at = Vec::new();
        for _ in 0..3 {
            let v = rx.recv().await.unwrap().unwrap();
            at.push((v - start).as_millis());
        }
        assert_eq!(at, vec![0, 20, 40]);

        token.cancel();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_ends_session() {
        let signal = VisibilitySignal::new(true);
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let src = SourceFn::new("fail", move |_ctx: CancellationToken| {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>("down".to_string()) }
        });
        let (mut rx, token, finished, handle) = spawn(src, 60, 2, &signal);

        match rx.recv().await {
            Some(Err(PollError::Exhausted { failures, error })) => {
                assert_eq!(failures, 3);
                assert_eq!(error, "down");
            }
            other => panic!("unexpected delivery: {other:?}"),
        }
        handle.await.unwrap();
        assert!(rx.recv().await.is_none());
        assert!(finished.is_cancelled());
        assert!(!token.is_cancelled());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hidden_session_does_not_poll() {
        let signal = VisibilitySignal::new(false);
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let src = SourceFn::new("hidden", move |_ctx: CancellationToken| {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, String>(()) }
        });
        let (mut rx, token, _finished, handle) = spawn(src, 10, 9, &signal);

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        signal.set_visible(true);
        rx.recv().await.unwrap().unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        token.cancel();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_source_panic_aborts_session() {
        let signal = VisibilitySignal::new(true);
        let bus = Bus::new(16);
        let mut events = bus.subscribe();
        let src = SourceFn::new("bad", |_ctx: CancellationToken| -> futures::future::Ready<Result<u8, String>> {
            panic!("source exploded")
        });
        let (tx, mut rx) = mpsc::unbounded_channel();
        let token = CancellationToken::new();
        let finished = CancellationToken::new();
        let driver = PollDriver::new(
            DriverParams {
                source: Arc::new(src),
                scheduler: Arc::new(TokioScheduler),
                interval: Duration::from_millis(10),
                recovery: recovery(9),
                bus,
                tx,
            },
            signal.gate(),
            token.clone(),
            finished.clone(),
        );
        let handle = tokio::spawn(driver.run());

        match rx.recv().await {
            Some(Err(PollError::Aborted { reason })) => assert_eq!(reason, "source exploded"),
            other => panic!("unexpected delivery: {other:?}"),
        }
        assert!(rx.recv().await.is_none());
        handle.await.unwrap();
        assert!(finished.is_cancelled());
        assert!(!token.is_cancelled());

        let mut kinds = Vec::new();
        while let Ok(ev) = events.try_recv() {
            kinds.push(ev.kind);
        }
        assert_eq!(kinds.last(), Some(&EventKind::SessionAborted));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_receiver_stops_driver() {
        let signal = VisibilitySignal::new(true);
        let src = SourceFn::new("gone", |_ctx: CancellationToken| async { Ok::<_, String>(1) });
        let (rx, token, finished, handle) = spawn(src, 10, 9, &signal);
        drop(rx);

        handle.await.unwrap();
        assert!(token.is_cancelled());
        assert!(finished.is_cancelled());
    }
}
