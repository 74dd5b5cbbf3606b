//! Page-level views and their lifecycle.
//!
//! Exactly one view is current at a time. [`ViewManager::render`] enforces the
//! ordering guarantees the rest of the client relies on:
//!
//! 1. the outgoing view's token is revoked and its teardown completes,
//! 2. the incoming markup replaces the surface and scroll resets to the top,
//! 3. the incoming view's mount runs, with its markup already attached.
//!
//! Nothing is rolled back when a hook fails; the error propagates to the route
//! handler that requested the render.

use super::node::Node;
use super::surface::Surface;
use crate::domain::error::Result;
use crate::navigation::Navigation;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Liveness token for one mounted view.
///
/// Revoked when the view is torn down. Asynchronous work started by a view
/// checks it before touching the surface.
#[derive(Debug, Clone)]
pub struct ViewToken {
    live: Arc<AtomicBool>,
}

impl ViewToken {
    #[must_use]
    pub fn new() -> Self {
        Self {
            live: Arc::new(AtomicBool::new(true)),
        }
    }

    #[must_use]
    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    pub fn revoke(&self) {
        self.live.store(false, Ordering::Release);
    }
}

impl Default for ViewToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything a view needs while mounting.
#[derive(Debug, Clone)]
pub struct MountContext {
    pub surface: Surface,
    pub token: ViewToken,
    pub navigation: Navigation,
}

/// A page-level view.
///
/// `mount` and `teardown` are optional hooks; both default to no-ops.
#[async_trait]
pub trait View: Send {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Initial markup. Must not perform I/O.
    fn render(&self, navigation: &Navigation) -> Node;

    /// Runs after the markup is attached.
    async fn mount(&mut self, _ctx: MountContext) -> Result<()> {
        Ok(())
    }

    /// Runs before the markup is replaced.
    async fn teardown(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Owns the current view and the surface it renders into.
pub struct ViewManager {
    surface: Surface,
    current: Option<(Box<dyn View>, ViewToken)>,
}

/// The view manager as shared by route handlers.
pub type SharedViews = Arc<tokio::sync::Mutex<ViewManager>>;

impl ViewManager {
    #[must_use]
    pub fn new(surface: Surface) -> Self {
        Self {
            surface,
            current: None,
        }
    }

    /// Convenience constructor for the shared form used by route handlers.
    #[must_use]
    pub fn shared(surface: Surface) -> SharedViews {
        Arc::new(tokio::sync::Mutex::new(Self::new(surface)))
    }

    #[must_use]
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Name of the current view, if any.
    #[must_use]
    pub fn current_name(&self) -> Option<&'static str> {
        self.current.as_ref().map(|(view, _)| view.name())
    }

    /// Replaces the current view with `view`.
    ///
    /// # Errors
    ///
    /// Propagates errors from the outgoing teardown or the incoming mount.
    pub async fn render(&mut self, view: Box<dyn View>, navigation: &Navigation) -> Result<()> {
        if let Some((mut outgoing, token)) = self.current.take() {
            token.revoke();
            tracing::debug!(view = outgoing.name(), "tearing down view");
            outgoing.teardown().await?;
        }

        let markup = view.render(navigation);
        self.surface.replace(markup);
        self.surface.scroll_to(0);

        let token = ViewToken::new();
        let ctx = MountContext {
            surface: self.surface.clone(),
            token: token.clone(),
            navigation: navigation.clone(),
        };

        tracing::debug!(view = view.name(), path = %navigation.path, "mounting view");
        let (current, _) = self.current.insert((view, token));
        current.mount(ctx).await
    }
}

impl std::fmt::Debug for ViewManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewManager")
            .field("current", &self.current_name())
            .finish_non_exhaustive()
    }
}
