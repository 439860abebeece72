//! Condition waits for asynchronously rendered content.

use std::future::Future;
use std::time::Duration;

/// Poll `check` every `interval` until it yields a value or `timeout` elapses.
///
/// The timeout bounds the whole wait, including a check that never resolves.
pub async fn poll_until<F, Fut, T>(timeout: Duration, interval: Duration, mut check: F) -> Option<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<T>>,
{
    tokio::time::timeout(timeout, async {
        loop {
            if let Some(value) = check().await {
                return value;
            }
            tokio::time::sleep(interval).await;
        }
    })
    .await
    .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_poll_until_succeeds_after_retries() {
        let counter = AtomicUsize::new(0);
        let calls = &counter;
        let result = poll_until(Duration::from_secs(2), Duration::from_millis(5), move || async move {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            (n >= 3).then_some(n)
        })
        .await;
        assert_eq!(result, Some(3));
        assert_eq!(counter.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_poll_until_times_out() {
        let result: Option<()> =
            poll_until(Duration::from_millis(50), Duration::from_millis(5), || async { None }).await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_poll_until_bounds_hanging_check() {
        let result: Option<()> = poll_until(Duration::from_millis(50), Duration::from_millis(5), || {
            std::future::pending::<Option<()>>()
        })
        .await;
        assert!(result.is_none());
    }
}
