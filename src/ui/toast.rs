//! Transient user-facing notifications.

use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Maximum number of toasts kept; the oldest is dropped first.
const MAX_TOASTS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Shared queue of toasts waiting to be shown.
#[derive(Debug, Clone, Default)]
pub struct Toasts {
    queue: Arc<Mutex<VecDeque<Toast>>>,
}

impl Toasts {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&self, level: ToastLevel, message: impl Into<String>) {
        let toast = Toast {
            level,
            message: message.into(),
            created_at: Utc::now(),
        };
        tracing::debug!(?level, message = %toast.message, "toast");

        let mut queue = self.lock();
        if queue.len() == MAX_TOASTS {
            queue.pop_front();
        }
        queue.push_back(toast);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.show(ToastLevel::Info, message);
    }

    pub fn success(&self, message: impl Into<String>) {
        self.show(ToastLevel::Success, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.show(ToastLevel::Error, message);
    }

    /// Removes and returns every queued toast, oldest first.
    #[must_use]
    pub fn drain(&self) -> Vec<Toast> {
        self.lock().drain(..).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Toast>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oldest_toast_is_dropped_when_full() {
        let toasts = Toasts::new();
        for i in 0..7 {
            toasts.info(format!("toast {i}"));
        }

        let shown = toasts.drain();
        assert_eq!(shown.len(), MAX_TOASTS);
        assert_eq!(shown[0].message, "toast 2");
        assert!(toasts.is_empty());
    }
}
