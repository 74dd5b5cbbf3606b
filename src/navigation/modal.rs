//! Overlay-aware history coordination.
//!
//! Makes the back button close an open overlay instead of leaving the page,
//! while spending at most one history entry on overlays no matter how many are
//! stacked on screen.
//!
//! # State Machine
//!
//! ```text
//!              mark_opened (push synthetic entry)
//!   ┌──────┐ ─────────────────────────────────────▶ ┌──────────┐
//!   │ Idle │                                         │ Tracking │
//!   └──────┘ ◀───────────────────────────────────── └──────────┘
//!              mark_closed_by_ui (history.back, suppress next pop)
//!              on_browser_back   (broadcast close-all)
//! ```
//!
//! Two flags disambiguate the `popstate` that follows a transition back to
//! `Idle`:
//!
//! - `suppress_next`: the pop was triggered by [`ModalHistory::mark_closed_by_ui`]
//!   and must not be routed.
//! - `reacting_to_back`: the user pressed Back; overlays closing in response must
//!   not trigger another `history.back()`.

use super::history::{History, HistoryState};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;

/// Whether an overlay's lifetime is currently bound to a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModalState {
    #[default]
    Idle,
    Tracking,
}

/// Answer given to the router for a back/forward traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopDisposition {
    /// The coordinator consumed the traversal; the router must not resolve a route.
    Handled,
    /// Ordinary navigation; the router resolves the new location.
    NotHandled,
}

/// Broadcast payload asking every open overlay to close itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloseAllOverlays;

#[derive(Debug, Default)]
struct Flags {
    state: ModalState,
    suppress_next: bool,
    reacting_to_back: bool,
}

/// Binds overlay open/close to a single synthetic history entry.
///
/// One instance is owned by the application context and shared with the
/// router and the overlay stack.
pub struct ModalHistory {
    history: Arc<dyn History>,
    flags: Mutex<Flags>,
    close_all: broadcast::Sender<CloseAllOverlays>,
}

impl ModalHistory {
    /// Creates a coordinator in the `Idle` state.
    #[must_use]
    pub fn new(history: Arc<dyn History>) -> Self {
        let (close_all, _) = broadcast::channel(16);
        Self {
            history,
            flags: Mutex::new(Flags::default()),
            close_all,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> ModalState {
        self.flags().state
    }

    /// Receives a message each time the user backs out of an open overlay.
    #[must_use]
    pub fn subscribe_close_all(&self) -> broadcast::Receiver<CloseAllOverlays> {
        self.close_all.subscribe()
    }

    /// Records that an overlay opened.
    ///
    /// The first call from `Idle` pushes a synthetic entry for the current
    /// location; calls while already `Tracking` do nothing.
    pub fn mark_opened(&self) {
        let mut flags = self.flags();
        if flags.state == ModalState::Tracking {
            tracing::trace!("overlay opened while tracking, no new entry");
            return;
        }

        // A fresh tracked lifetime starts; a back-reaction nobody consumed is stale.
        flags.reacting_to_back = false;
        flags.state = ModalState::Tracking;
        drop(flags);

        let location = self.history.location();
        self.history.push_state(&location, HistoryState::Modal);
        tracing::debug!(%location, "modal entry pushed");
    }

    /// Records that an overlay was dismissed from the UI (close button, outside click).
    ///
    /// Consumes the synthetic entry with a programmatic back-navigation unless
    /// the dismissal is itself a reaction to the browser back button.
    pub fn mark_closed_by_ui(&self) {
        let mut flags = self.flags();

        if flags.reacting_to_back {
            flags.reacting_to_back = false;
            tracing::debug!("overlay closed by browser back, entry already consumed");
            return;
        }

        if flags.state != ModalState::Tracking {
            return;
        }

        flags.suppress_next = true;
        flags.state = ModalState::Idle;
        drop(flags);

        tracing::debug!("overlay closed by ui, popping modal entry");
        self.history.back();
    }

    /// Decides whether a back/forward traversal belongs to the coordinator.
    ///
    /// Must be called by the router before it resolves a `popstate`.
    pub fn on_browser_back(&self) -> PopDisposition {
        let mut flags = self.flags();

        if flags.suppress_next {
            flags.suppress_next = false;
            flags.state = ModalState::Idle;
            tracing::debug!("self-triggered pop suppressed");
            return PopDisposition::Handled;
        }

        if flags.state == ModalState::Tracking {
            flags.state = ModalState::Idle;
            flags.reacting_to_back = true;
            drop(flags);

            let receivers = self.close_all.send(CloseAllOverlays).unwrap_or(0);
            tracing::debug!(receivers, "browser back closed overlays");
            return PopDisposition::Handled;
        }

        PopDisposition::NotHandled
    }

    fn flags(&self) -> MutexGuard<'_, Flags> {
        self.flags.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for ModalHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModalHistory")
            .field("flags", &*self.flags())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::MemoryHistory;

    fn setup() -> (Arc<MemoryHistory>, ModalHistory) {
        let history = Arc::new(MemoryHistory::new("/dog/rex"));
        let modal = ModalHistory::new(history.clone());
        (history, modal)
    }

    #[test]
    fn stacked_overlays_push_one_entry() {
        let (history, modal) = setup();
        let before = history.len();

        modal.mark_opened();
        modal.mark_opened();

        assert_eq!(history.len() - before, 1);
        assert_eq!(history.state(), HistoryState::Modal);
        assert_eq!(history.location(), "/dog/rex");
    }

    #[test]
    fn ui_close_pops_once_and_suppresses_the_pop() {
        let (history, modal) = setup();
        modal.mark_opened();
        modal.mark_closed_by_ui();

        assert_eq!(modal.state(), ModalState::Idle);
        assert!(history.next_pop_event().is_some());
        assert!(history.next_pop_event().is_none());
        assert_eq!(modal.on_browser_back(), PopDisposition::Handled);
        assert_eq!(modal.on_browser_back(), PopDisposition::NotHandled);
    }

    #[test]
    fn browser_back_broadcasts_and_skips_second_pop() {
        let (history, modal) = setup();
        let mut rx = modal.subscribe_close_all();
        modal.mark_opened();
        history.back();
        history.next_pop_event();

        assert_eq!(modal.on_browser_back(), PopDisposition::Handled);
        assert_eq!(rx.try_recv().ok(), Some(CloseAllOverlays));

        modal.mark_closed_by_ui();
        modal.mark_closed_by_ui();
        assert!(history.next_pop_event().is_none());
        assert_eq!(modal.state(), ModalState::Idle);
    }

    #[test]
    fn closing_while_idle_is_a_no_op() {
        let (history, modal) = setup();
        modal.mark_closed_by_ui();
        assert!(history.next_pop_event().is_none());
        assert_eq!(modal.on_browser_back(), PopDisposition::NotHandled);
    }
}
