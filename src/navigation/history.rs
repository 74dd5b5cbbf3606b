//! Session history abstraction.
//!
//! The router and the modal coordinator only need a handful of history
//! operations. [`History`] captures them so a browser adapter, the headless
//! shell, and tests can all drive the same navigation core.
//!
//! Back/forward traversal is asynchronous on the web platform: `history.back()`
//! returns immediately and a `popstate` event arrives later. [`History`] models
//! that by queueing [`PopStateEvent`]s that the host drains with
//! [`History::next_pop_event`].

use std::collections::VecDeque;
use std::sync::Mutex;

/// Marker stored with every history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryState {
    /// A regular page entry.
    #[default]
    Page,
    /// A synthetic entry pushed while an overlay is open.
    Modal,
}

/// Emitted when the current entry changes through back/forward traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopStateEvent {
    /// Location (path plus optional `?query`) now current.
    pub location: String,
    /// State marker of the entry now current.
    pub state: HistoryState,
}

/// Operations the navigation core needs from the platform history.
pub trait History: Send + Sync {
    /// Current location as `path[?query]`.
    fn location(&self) -> String;

    /// State marker of the current entry.
    fn state(&self) -> HistoryState;

    /// Pushes a new entry, discarding any forward entries.
    fn push_state(&self, location: &str, state: HistoryState);

    /// Rewrites the current entry without adding one.
    fn replace_state(&self, location: &str, state: HistoryState);

    /// Moves one entry back. The matching [`PopStateEvent`] is delivered later.
    fn back(&self);

    /// Moves one entry forward. The matching [`PopStateEvent`] is delivered later.
    fn forward(&self);

    /// Total number of entries, including forward entries.
    fn len(&self) -> usize;

    /// Takes the oldest undelivered traversal event, if any.
    fn next_pop_event(&self) -> Option<PopStateEvent>;
}

#[derive(Debug, Clone)]
struct Entry {
    location: String,
    state: HistoryState,
}

#[derive(Debug)]
struct Inner {
    entries: Vec<Entry>,
    index: usize,
    pending: VecDeque<PopStateEvent>,
}

impl Inner {
    fn current(&self) -> &Entry {
        &self.entries[self.index]
    }

    fn emit_pop(&mut self) {
        let entry = self.current().clone();
        self.pending.push_back(PopStateEvent {
            location: entry.location,
            state: entry.state,
        });
    }
}

/// In-process history with browser semantics.
///
/// Used by the headless shell and by tests. Traversal at either end is a no-op
/// and produces no event, as in browsers.
///
/// # Example
///
/// ```
/// use pawfeed::navigation::{History, HistoryState, MemoryHistory};
///
/// let history = MemoryHistory::new("/");
/// history.push_state("/dog/nelli-1", HistoryState::Page);
/// history.back();
///
/// let event = history.next_pop_event().unwrap();
/// assert_eq!(event.location, "/");
/// assert_eq!(history.len(), 2);
/// ```
#[derive(Debug)]
pub struct MemoryHistory {
    inner: Mutex<Inner>,
}

impl MemoryHistory {
    /// Creates a history with a single page entry at `initial`.
    #[must_use]
    pub fn new(initial: &str) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: vec![Entry {
                    location: initial.to_string(),
                    state: HistoryState::Page,
                }],
                index: 0,
                pending: VecDeque::new(),
            }),
        }
    }

    /// Zero-based index of the current entry.
    #[must_use]
    pub fn index(&self) -> usize {
        self.lock().index
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // History is never left half-updated, so a poisoned lock is still usable.
        self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new("/")
    }
}

impl History for MemoryHistory {
    fn location(&self) -> String {
        self.lock().current().location.clone()
    }

    fn state(&self) -> HistoryState {
        self.lock().current().state
    }

    fn push_state(&self, location: &str, state: HistoryState) {
        let mut inner = self.lock();
        let keep = inner.index + 1;
        inner.entries.truncate(keep);
        inner.entries.push(Entry {
            location: location.to_string(),
            state,
        });
        inner.index = keep;
        tracing::trace!(location, ?state, depth = inner.entries.len(), "history push");
    }

    fn replace_state(&self, location: &str, state: HistoryState) {
        let mut inner = self.lock();
        let index = inner.index;
        inner.entries[index] = Entry {
            location: location.to_string(),
            state,
        };
        tracing::trace!(location, ?state, "history replace");
    }

    fn back(&self) {
        let mut inner = self.lock();
        if inner.index == 0 {
            return;
        }
        inner.index -= 1;
        inner.emit_pop();
    }

    fn forward(&self) {
        let mut inner = self.lock();
        if inner.index + 1 >= inner.entries.len() {
            return;
        }
        inner.index += 1;
        inner.emit_pop();
    }

    fn len(&self) -> usize {
        self.lock().entries.len()
    }

    fn next_pop_event(&self) -> Option<PopStateEvent> {
        self.lock().pending.pop_front()
    }
}
