//! Overlays (modals, sheets) shown above the current page.
//!
//! Several overlays may be visible at once, but only the first one opened from
//! a page is tied to a history entry; see [`ModalHistory`].

use super::node::{Element, Node};
use crate::navigation::{CloseAllOverlays, ModalHistory};
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::TryRecvError};

/// The overlays the client can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlayKind {
    NewPost,
    NewDog,
    HealthRecord,
    InviteShare,
    ImageViewer,
}

impl OverlayKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NewPost => "new-post",
            Self::NewDog => "new-dog",
            Self::HealthRecord => "health-record",
            Self::InviteShare => "invite-share",
            Self::ImageViewer => "image-viewer",
        }
    }

    /// Parses the identifier produced by [`OverlayKind::as_str`].
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        [
            Self::NewPost,
            Self::NewDog,
            Self::HealthRecord,
            Self::InviteShare,
            Self::ImageViewer,
        ]
        .into_iter()
        .find(|kind| kind.as_str() == name)
    }
}

/// An open overlay and its content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlay {
    pub kind: OverlayKind,
    pub content: Node,
}

impl Overlay {
    #[must_use]
    pub fn new(kind: OverlayKind, content: impl Into<Node>) -> Self {
        Self {
            kind,
            content: content.into(),
        }
    }
}

/// Visually stacked overlays, topmost last.
pub struct OverlayStack {
    open: Vec<Overlay>,
    modal: Arc<ModalHistory>,
    close_all: broadcast::Receiver<CloseAllOverlays>,
}

impl OverlayStack {
    #[must_use]
    pub fn new(modal: Arc<ModalHistory>) -> Self {
        let close_all = modal.subscribe_close_all();
        Self {
            open: Vec::new(),
            modal,
            close_all,
        }
    }

    /// Shows `overlay` on top of any open ones.
    pub fn open(&mut self, overlay: Overlay) {
        tracing::debug!(overlay = overlay.kind.as_str(), depth = self.open.len() + 1, "overlay opened");
        self.open.push(overlay);
        self.modal.mark_opened();
    }

    /// Closes the topmost overlay as if its close button was pressed.
    pub fn close_top(&mut self) -> Option<Overlay> {
        let overlay = self.open.pop()?;
        tracing::debug!(overlay = overlay.kind.as_str(), "overlay closed by ui");
        self.modal.mark_closed_by_ui();
        Some(overlay)
    }

    /// Closes the topmost overlay of `kind`.
    pub fn close(&mut self, kind: OverlayKind) -> Option<Overlay> {
        let index = self.open.iter().rposition(|o| o.kind == kind)?;
        let overlay = self.open.remove(index);
        self.modal.mark_closed_by_ui();
        Some(overlay)
    }

    /// Closes every overlay from the UI side, topmost first. Returns how many
    /// closed.
    ///
    /// Only the first close consumes the synthetic history entry; the rest
    /// find the coordinator idle.
    pub fn close_all(&mut self) -> usize {
        let closed = self.open.len();
        for overlay in self.open.drain(..).rev() {
            tracing::debug!(overlay = overlay.kind.as_str(), "overlay closed by ui");
            self.modal.mark_closed_by_ui();
        }
        closed
    }

    /// Applies pending "close all" broadcasts. Returns how many overlays closed.
    pub fn sync(&mut self) -> usize {
        let mut requested = false;
        loop {
            match self.close_all.try_recv() {
                Ok(CloseAllOverlays) | Err(TryRecvError::Lagged(_)) => requested = true,
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }

        if !requested {
            return 0;
        }

        let closed = self.open.len();
        for overlay in self.open.drain(..).rev() {
            tracing::debug!(overlay = overlay.kind.as_str(), "overlay closed by browser back");
            self.modal.mark_closed_by_ui();
        }
        closed
    }

    #[must_use]
    pub fn is_open(&self, kind: OverlayKind) -> bool {
        self.open.iter().any(|o| o.kind == kind)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.open.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }

    #[must_use]
    pub fn top(&self) -> Option<&Overlay> {
        self.open.last()
    }

    /// Markup for the overlay layer.
    #[must_use]
    pub fn render(&self) -> Node {
        Element::new("div")
            .id("overlays")
            .children(self.open.iter().map(|overlay| {
                Element::new("div")
                    .class("overlay")
                    .attr("data-overlay", overlay.kind.as_str())
                    .child(overlay.content.clone())
            }))
            .into()
    }
}

impl std::fmt::Debug for OverlayStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayStack")
            .field("open", &self.open.iter().map(|o| o.kind).collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::{History, HistoryState, MemoryHistory, ModalState, PopDisposition};

    fn setup() -> (Arc<MemoryHistory>, Arc<ModalHistory>, OverlayStack) {
        let history = Arc::new(MemoryHistory::new("/"));
        let modal = Arc::new(ModalHistory::new(history.clone()));
        let stack = OverlayStack::new(modal.clone());
        (history, modal, stack)
    }

    #[test]
    fn closing_stacked_overlays_pops_history_once() {
        let (history, modal, mut stack) = setup();
        stack.open(Overlay::new(OverlayKind::NewPost, "composer"));
        stack.open(Overlay::new(OverlayKind::ImageViewer, "photo"));
        assert_eq!(history.len(), 2);

        stack.close_top();
        stack.close_top();

        assert!(stack.is_empty());
        assert!(history.next_pop_event().is_some());
        assert!(history.next_pop_event().is_none());
        assert_eq!(modal.on_browser_back(), PopDisposition::Handled);
        assert_eq!(modal.state(), ModalState::Idle);
    }

    #[test]
    fn sync_closes_everything_after_browser_back() {
        let (history, modal, mut stack) = setup();
        stack.open(Overlay::new(OverlayKind::NewDog, "form"));
        stack.open(Overlay::new(OverlayKind::ImageViewer, "photo"));

        history.back();
        assert!(history.next_pop_event().is_some());
        assert_eq!(modal.on_browser_back(), PopDisposition::Handled);

        assert_eq!(stack.sync(), 2);
        assert!(stack.is_empty());
        assert!(history.next_pop_event().is_none());
        assert_eq!(stack.sync(), 0);
    }

    #[test]
    fn close_all_consumes_the_synthetic_entry_once() {
        let (history, modal, mut stack) = setup();
        stack.open(Overlay::new(OverlayKind::NewPost, "composer"));
        stack.open(Overlay::new(OverlayKind::ImageViewer, "photo"));

        assert_eq!(stack.close_all(), 2);

        assert!(stack.is_empty());
        assert_eq!(modal.state(), ModalState::Idle);
        let event = history.next_pop_event().unwrap();
        assert_eq!(event.state, HistoryState::Page);
        assert!(history.next_pop_event().is_none());
        assert_eq!(modal.on_browser_back(), PopDisposition::Handled);
        assert_eq!(stack.close_all(), 0);
    }

    #[test]
    fn overlay_kinds_round_trip_through_names() {
        assert_eq!(OverlayKind::parse("invite-share"), Some(OverlayKind::InviteShare));
        assert_eq!(OverlayKind::parse("settings"), None);
    }
}
