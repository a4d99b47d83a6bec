//! Explicit retry schedule used by the classifier.

use std::future::Future;
use std::time::Duration;

/// Sleep each delay in turn, evaluating `probe` after each sleep; return the
/// first `Some`, or `None` once the schedule is exhausted.
///
/// Built on tokio time so callers can exercise it against a paused clock.
pub async fn poll_until<T, F, Fut>(delays: &[Duration], mut probe: F) -> Option<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<T>>,
{
    for delay in delays {
        tokio::time::sleep(*delay).await;
        if let Some(value) = probe().await {
            return Some(value);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const DELAYS: [Duration; 3] = [
        Duration::from_millis(60),
        Duration::from_millis(120),
        Duration::from_millis(180),
    ];

    #[tokio::test(start_paused = true)]
    async fn returns_first_some() {
        let calls = AtomicUsize::new(0);
        let result = poll_until(&DELAYS, || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move { (n == 2).then_some("hit") }
        })
        .await;
        assert_eq!(result, Some("hit"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausts_schedule_to_none() {
        let start = tokio::time::Instant::now();
        let result: Option<()> = poll_until(&DELAYS, || async { None }).await;
        assert_eq!(result, None);
        // The full schedule is the sum of all delays, no more.
        assert_eq!(start.elapsed(), Duration::from_millis(360));
    }

    #[tokio::test(start_paused = true)]
    async fn empty_schedule_never_probes() {
        let calls = AtomicUsize::new(0);
        let result: Option<()> = poll_until(&[], || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Some(()) }
        })
        .await;
        assert_eq!(result, None);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
