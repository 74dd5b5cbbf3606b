//! Periodic unread-count refresh.
//!
//! Each tick spawns its own request, so a slow response may still be in
//! flight when the next tick fires. Counts are published on a watch channel.

use super::messages::MessageService;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub struct UnreadPoller {
    messages: MessageService,
    period: Duration,
    count: Arc<watch::Sender<u64>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl UnreadPoller {
    #[must_use]
    pub fn new(messages: MessageService, period: Duration) -> Self {
        let (count, _) = watch::channel(0);
        Self {
            messages,
            period,
            count: Arc::new(count),
            task: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.count.subscribe()
    }

    /// Last published count.
    #[must_use]
    pub fn count(&self) -> u64 {
        *self.count.borrow()
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task().as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Starts polling; the first request goes out immediately. No-op while
    /// running or when the interval is zero.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self) {
        let mut task = self.task();
        if task.as_ref().is_some_and(|t| !t.is_finished()) {
            return;
        }

        let period = self.period;
        if period.is_zero() {
            tracing::warn!("unread polling not started: zero interval");
            return;
        }

        let messages = self.messages.clone();
        let count = self.count.clone();

        *task = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                let messages = messages.clone();
                let count = count.clone();
                tokio::spawn(async move {
                    match messages.unread_count().await {
                        Ok(unread) => {
                            count.send_replace(unread);
                        }
                        Err(e) => tracing::warn!(error = %e, "unread count refresh failed"),
                    }
                });
            }
        }));
        tracing::debug!(period_secs = period.as_secs(), "unread polling started");
    }

    /// Stops polling and resets the published count to zero.
    pub fn stop(&self) {
        if let Some(task) = self.task().take() {
            task.abort();
            tracing::debug!("unread polling stopped");
        }
        self.count.send_replace(0);
    }

    fn task(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.task.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for UnreadPoller {
    fn drop(&mut self) {
        if let Some(task) = self.task().take() {
            task.abort();
        }
    }
}

impl std::fmt::Debug for UnreadPoller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnreadPoller")
            .field("period", &self.period)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}
