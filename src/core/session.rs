//! # Consumer side of a polling session.
//!
//! [`PollSession`] is returned by [`Poller::spawn`](crate::Poller::spawn) and
//! [`poll`](crate::poll). It yields every successful value in order and, at
//! most once, a terminal [`PollError`] after which the session is over.
//!
//! ```text
//! recv() ──► Some(Ok(v)) ... Some(Ok(v)) ──► Some(Err(Exhausted | Aborted)) ──► None
//!                                         └─► None   (cancelled)
//! ```
//!
//! ## Cancellation
//! - [`PollSession::cancel`] (or any [`CancelHandle`]) stops the session: the
//!   in-flight invocation is cancelled, pending backoff waits are dropped, and
//!   nothing is delivered afterwards, not even items already queued.
//! - Cancelling twice is a no-op.
//! - Dropping the session cancels it.

use std::{
    pin::Pin,
    task::{Context, Poll},
};

use futures::Stream;
use tokio::{select, sync::mpsc, task::JoinHandle};
use tokio_util::sync::CancellationToken;

use crate::error::PollError;

/// Handle to a running polling session.
///
/// Also implements [`Stream`], with the same items as [`PollSession::recv`].
pub struct PollSession<T, E> {
    rx: mpsc::UnboundedReceiver<Result<T, PollError<E>>>,
    token: CancellationToken,
    driver: Option<JoinHandle<()>>,
    listener: Option<JoinHandle<()>>,
}

impl<T, E> PollSession<T, E> {
    pub(crate) fn new(
        rx: mpsc::UnboundedReceiver<Result<T, PollError<E>>>,
        token: CancellationToken,
        driver: JoinHandle<()>,
        listener: Option<JoinHandle<()>>,
    ) -> Self {
        Self {
            rx,
            token,
            driver: Some(driver),
            listener,
        }
    }

    /// Receives the next item.
    ///
    /// Returns `None` once the session is cancelled or has ended (after
    /// delivering its terminal error).
    pub async fn recv(&mut self) -> Option<Result<T, PollError<E>>> {
        if self.token.is_cancelled() {
            return None;
        }
        select! {
            biased;
            _ = self.token.cancelled() => None,
            item = self.rx.recv() => item,
        }
    }

    /// Stops the session. Idempotent.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Returns a cloneable handle that can cancel this session from elsewhere.
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            token: self.token.clone(),
        }
    }

    /// True once the session was cancelled (explicitly or by its consumer going away).
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Waits until the session stopped and all subscribers processed its events.
    ///
    /// Does not cancel: call [`cancel`](Self::cancel) first to stop a live
    /// session. Items still queued are discarded.
    pub async fn join(mut self) {
        if let Some(driver) = self.driver.take() {
            let _ = driver.await;
        }
        if let Some(listener) = self.listener.take() {
            let _ = listener.await;
        }
    }
}

impl<T, E> Stream for PollSession<T, E> {
    type Item = Result<T, PollError<E>>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.token.is_cancelled() {
            return Poll::Ready(None);
        }
        self.rx.poll_recv(cx)
    }
}

impl<T, E> Unpin for PollSession<T, E> {}

impl<T, E> Drop for PollSession<T, E> {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

impl<T, E> std::fmt::Debug for PollSession<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollSession")
            .field("cancelled", &self.token.is_cancelled())
            .finish_non_exhaustive()
    }
}

/// Cancels a [`PollSession`] without owning it.
#[derive(Clone, Debug)]
pub struct CancelHandle {
    token: CancellationToken,
}

impl CancelHandle {
    /// Stops the session. Idempotent.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// True once the session was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    fn session() -> (
        mpsc::UnboundedSender<Result<u32, PollError<String>>>,
        PollSession<u32, String>,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        let driver = tokio::spawn(async {});
        (tx, PollSession::new(rx, CancellationToken::new(), driver, None))
    }

    #[tokio::test]
    async fn test_cancel_suppresses_queued_items() {
        let (tx, mut s) = session();
        tx.send(Ok(1)).unwrap();
        tx.send(Ok(2)).unwrap();
        assert_eq!(s.recv().await.unwrap().unwrap(), 1);

        s.cancel();
        s.cancel();
        assert!(s.recv().await.is_none());
        assert!(s.is_cancelled());
    }

    #[tokio::test]
    async fn test_handle_cancels_pending_recv() {
        let (_tx, mut s) = session();
        let handle = s.cancel_handle();
        let waiter = tokio::spawn(async move { s.recv().await.is_none() });

        tokio::task::yield_now().await;
        handle.cancel();
        assert!(waiter.await.unwrap());
        assert!(handle.is_cancelled());
    }

    #[tokio::test]
    async fn test_stream_ends_with_channel() {
        let (tx, s) = session();
        tx.send(Ok(5)).unwrap();
        drop(tx);
        let items: Vec<_> = s.map(|r| r.unwrap()).collect().await;
        assert_eq!(items, vec![5]);
    }

    #[tokio::test]
    async fn test_drop_cancels() {
        let (_tx, s) = session();
        let handle = s.cancel_handle();
        drop(s);
        assert!(handle.is_cancelled());
    }
}
