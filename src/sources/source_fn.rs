//! # Closure-backed source (`SourceFn`)
//!
//! [`SourceFn`] wraps a closure `F: Fn(CancellationToken) -> Fut`, producing a
//! fresh future per tick. Nothing is shared between invocations unless the
//! closure captures it explicitly (e.g. an `Arc<Client>`).
//!
//! ## Example
//! ```rust
//! use tokio_util::sync::CancellationToken;
//! use pollvisor::{Source, SourceFn};
//!
//! let s = SourceFn::new("answer", |_ctx: CancellationToken| async move {
//!     Ok::<_, std::io::Error>(42)
//! });
//!
//! assert_eq!(s.name(), "answer");
//! ```

use std::borrow::Cow;
use std::fmt;
use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::sources::source::{BoxSourceFuture, Source};

/// Function-backed source implementation.
pub struct SourceFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> SourceFn<F> {
    /// Creates a new function-backed source.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> fmt::Debug for SourceFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceFn").field("name", &self.name).finish()
    }
}

impl<F, Fut, T, E> Source for SourceFn<F>
where
    F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: fmt::Display + Send + 'static,
{
    type Output = T;
    type Error = E;

    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self, ctx: CancellationToken) -> BoxSourceFuture<T, E> {
        Box::pin((self.f)(ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    };

    #[tokio::test]
    async fn test_each_fetch_is_a_fresh_invocation() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let src = SourceFn::new("counter", move |_ctx: CancellationToken| {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            async move { Ok::<_, String>(n) }
        });

        assert_eq!(src.fetch(CancellationToken::new()).await, Ok(1));
        assert_eq!(src.fetch(CancellationToken::new()).await, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_fetch_sees_its_token() {
        let src = SourceFn::new("token", |ctx: CancellationToken| async move {
            if ctx.is_cancelled() {
                Err("cancelled".to_string())
            } else {
                Ok(())
            }
        });

        let token = CancellationToken::new();
        token.cancel();
        assert_eq!(src.fetch(token).await, Err("cancelled".to_string()));
    }
}
