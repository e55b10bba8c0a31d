use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;

use crate::services::pipeline::{QueryError, StatusSnapshot};

/// Default polling interval for report status.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Client-side poll-until-terminal primitive.
///
/// Evaluates a status query on a fixed interval until a terminal state
/// (`completed` or `failed`) is observed. A query failure ends polling and
/// is surfaced to the caller rather than being retried silently. What the
/// caller does with the terminal snapshot (reload, render, ...) is its own
/// concern.
pub struct StatusPoller {
    interval: Duration,
}

impl Default for StatusPoller {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}

impl StatusPoller {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// Poll `query` until it reports a terminal status.
    ///
    /// Queries once immediately, then on the fixed interval.
    pub async fn wait_for_terminal<F, Fut>(&self, mut query: F) -> Result<StatusSnapshot, QueryError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<StatusSnapshot, QueryError>>,
    {
        loop {
            let snapshot = query().await?;

            if snapshot.status.is_terminal() {
                return Ok(snapshot);
            }

            tracing::debug!(status = %snapshot.status, "Report not ready, polling again");
            sleep(self.interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::job::JobStatus;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn snapshot(status: JobStatus) -> StatusSnapshot {
        StatusSnapshot {
            status,
            error: None,
            job: None,
        }
    }

    #[tokio::test]
    async fn test_polls_until_terminal() {
        let calls = Arc::new(AtomicUsize::new(0));
        let poller = StatusPoller::new(Duration::from_millis(1));

        let query_calls = calls.clone();
        let outcome = poller
            .wait_for_terminal(move || {
                let calls = query_calls.clone();
                async move {
                    let status = match calls.fetch_add(1, Ordering::SeqCst) {
                        0 => JobStatus::Processing,
                        1 => JobStatus::FetchingEnrichment,
                        _ => JobStatus::Completed,
                    };
                    Ok(snapshot(status))
                }
            })
            .await
            .unwrap();

        assert_eq!(outcome.status, JobStatus::Completed);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_stops_immediately_on_terminal_failure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let poller = StatusPoller::new(Duration::from_millis(1));

        let query_calls = calls.clone();
        let outcome = poller
            .wait_for_terminal(move || {
                let calls = query_calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(snapshot(JobStatus::Failed))
                }
            })
            .await
            .unwrap();

        assert_eq!(outcome.status, JobStatus::Failed);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_query_error_ends_polling() {
        let poller = StatusPoller::new(Duration::from_millis(1));

        let result = poller
            .wait_for_terminal(|| async { Err(QueryError::NotFound) })
            .await;

        assert!(matches!(result, Err(QueryError::NotFound)));
    }
}
