//! # Example: Visibility-gated polling with backoff
//!
//! Polls a flaky source every 300ms, hides the "window" for a while, then
//! shows it again. Run with:
//!
//! ```text
//! RUST_LOG=debug cargo run --example visibility_demo --features logging
//! ```

use std::{
    sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    },
    time::Duration,
};

use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use pollvisor::{BackoffStrategy, LogWriter, PollConfig, Poller, SourceFn, Subscribe, VisibilitySignal};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env_lossy();
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Every fourth and fifth call fails.
    let calls = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&calls);
    let source = SourceFn::new("comments", move |ctx: CancellationToken| {
        let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
        async move {
            tokio::select! {
                _ = ctx.cancelled() => return Err("cancelled".to_string()),
                _ = tokio::time::sleep(Duration::from_millis(50)) => {}
            }
            if matches!(n % 5, 4 | 0) {
                Err(format!("503 on call {n}"))
            } else {
                Ok(n)
            }
        }
    });

    let cfg = PollConfig::new(Duration::from_millis(300))
        .with_attempts(3)
        .with_strategy(BackoffStrategy::Exponential)
        .with_exponential_unit(Duration::from_millis(200));

    let visibility = VisibilitySignal::new(true);
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let mut session = Poller::new(source, cfg)
        .with_visibility(&visibility)
        .with_subscribers(subs)
        .spawn()?;

    let toggler = {
        let visibility = visibility.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(2)).await;
            println!("-- window hidden");
            visibility.set_visible(false);
            tokio::time::sleep(Duration::from_secs(2)).await;
            println!("-- window visible");
            visibility.set_visible(true);
        })
    };

    let deadline = tokio::time::sleep(Duration::from_secs(6));
    tokio::pin!(deadline);
    loop {
        tokio::select! {
            _ = &mut deadline => break,
            item = session.recv() => match item {
                Some(Ok(n)) => println!("value: {n}"),
                Some(Err(e)) => {
                    println!("session failed: {e}");
                    break;
                }
                None => break,
            },
        }
    }

    session.cancel();
    session.join().await;
    toggler.await?;
    println!("total calls: {}", calls.load(Ordering::SeqCst));
    Ok(())
}
