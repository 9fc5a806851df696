use crate::client::{ConnectorEvent, Generation};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::sleep;

/// Exponential reconnect backoff: the Nth retry waits
/// `min(initial * 2^(N-1), max)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    initial_ms: u64,
    max_ms: u64,
}

impl Backoff {
    pub fn new(initial_ms: u64, max_ms: u64) -> Self {
        Self { initial_ms, max_ms }
    }

    /// Delay before retry number `attempt` (1-based; 0 is treated as 1)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.max(1) - 1;
        let factor = 1u64.checked_shl(exponent).unwrap_or(u64::MAX);
        let delay = self.initial_ms.saturating_mul(factor).min(self.max_ms);
        Duration::from_millis(delay)
    }
}

/// Schedules the retry timer of a connector.
///
/// When a timer fires the implementation must hand the generation it was
/// scheduled with back to the connector.
pub trait Scheduler {
    type Handle;

    fn schedule(&mut self, delay: Duration, generation: Generation) -> Self::Handle;

    fn cancel(&mut self, handle: Self::Handle);
}

/// Retry timers backed by `tokio::time::sleep` tasks
pub struct TokioScheduler {
    events: mpsc::UnboundedSender<ConnectorEvent>,
}

impl TokioScheduler {
    pub fn new(events: mpsc::UnboundedSender<ConnectorEvent>) -> Self {
        Self { events }
    }
}

impl Scheduler for TokioScheduler {
    type Handle = JoinHandle<()>;

    fn schedule(&mut self, delay: Duration, generation: Generation) -> Self::Handle {
        let events = self.events.clone();
        tokio::spawn(async move {
            sleep(delay).await;
            if events
                .send(ConnectorEvent::RetryElapsed { generation })
                .is_err()
            {
                tracing::debug!("Connector gone before retry timer fired");
            }
        })
    }

    fn cancel(&mut self, handle: Self::Handle) {
        handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_up_to_max() {
        let backoff = Backoff::new(1000, 30_000);
        let delays: Vec<u64> = (1..=7)
            .map(|n| backoff.delay_for(n).as_millis() as u64)
            .collect();
        assert_eq!(delays, vec![1000, 2000, 4000, 8000, 16_000, 30_000, 30_000]);
    }

    #[test]
    fn test_backoff_first_attempt_is_initial() {
        let backoff = Backoff::new(250, 1000);
        assert_eq!(backoff.delay_for(0), Duration::from_millis(250));
        assert_eq!(backoff.delay_for(1), Duration::from_millis(250));
    }

    #[test]
    fn test_backoff_saturates_on_large_attempts() {
        let backoff = Backoff::new(1000, 8000);
        assert_eq!(backoff.delay_for(64), Duration::from_millis(8000));
        assert_eq!(backoff.delay_for(u32::MAX), Duration::from_millis(8000));

        let unbounded = Backoff::new(u64::MAX / 2, u64::MAX);
        assert_eq!(unbounded.delay_for(3), Duration::from_millis(u64::MAX));
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_scheduler_fires_with_generation() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut scheduler = TokioScheduler::new(tx);

        scheduler.schedule(Duration::from_millis(500), 7);

        match rx.recv().await {
            Some(ConnectorEvent::RetryElapsed { generation }) => assert_eq!(generation, 7),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_scheduler_cancel() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut scheduler = TokioScheduler::new(tx);

        let handle = scheduler.schedule(Duration::from_millis(500), 1);
        scheduler.cancel(handle);
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert!(rx.try_recv().is_err());
    }
}
