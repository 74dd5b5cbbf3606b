//! Client-side router.
//!
//! Maps locations to asynchronous handlers without reloading the page. Routes
//! are tried in registration order and the **first** structural match wins, so
//! a general pattern registered early shadows a more specific one registered
//! later. Route authors must register specific patterns first.
//!
//! Registering a pattern that is already present replaces its handler in place
//! without any error. This is intentional but easy to trip over.
//!
//! # Example
//!
//! ```
//! use pawfeed::navigation::{MemoryHistory, ModalHistory, Navigation, Router};
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> pawfeed::Result<()> {
//! let history = Arc::new(MemoryHistory::new("/"));
//! let modal = Arc::new(ModalHistory::new(history.clone()));
//! let mut router = Router::new(history.clone(), modal);
//!
//! router.register("/dog/:slug", |nav: Navigation| async move {
//!     assert_eq!(nav.params["slug"], "nelli-1");
//!     Ok::<(), pawfeed::PawfeedError>(())
//! })?;
//!
//! router.navigate("/dog/nelli-1").await?;
//! # Ok(())
//! # }
//! ```

use super::history::{History, HistoryState};
use super::modal::{ModalHistory, PopDisposition};
use super::pattern::{parse_query, split_location, Params, RoutePattern};
use crate::domain::error::Result;
use crate::ui::node::{Element, LINK_ATTR};
use futures_util::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::Instrument;

/// What a route handler receives.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Navigation {
    /// Path without query string.
    pub path: String,
    /// Captured `:name` segments.
    pub params: Params,
    /// Parsed query string.
    pub query: Params,
}

impl Navigation {
    /// Builds a navigation for `location` with no captured params.
    #[must_use]
    pub fn from_location(location: &str) -> Self {
        let (path, query) = split_location(location);
        Self {
            path: path.to_string(),
            params: Params::new(),
            query: parse_query(query),
        }
    }
}

/// An asynchronous route handler.
///
/// Implemented for every `Fn(Navigation) -> impl Future<Output = Result<()>>`
/// closure, so handlers are usually plain `async move` closures.
pub trait RouteHandler: Send + Sync {
    fn handle(&self, navigation: Navigation) -> BoxFuture<'static, Result<()>>;
}

impl<F, Fut> RouteHandler for F
where
    F: Fn(Navigation) -> Fut + Send + Sync,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    fn handle(&self, navigation: Navigation) -> BoxFuture<'static, Result<()>> {
        Box::pin(self(navigation))
    }
}

struct Route {
    pattern: RoutePattern,
    handler: Arc<dyn RouteHandler>,
}

/// Maps locations to handlers and drives history.
pub struct Router {
    routes: Vec<Route>,
    not_found: Option<Arc<dyn RouteHandler>>,
    history: Arc<dyn History>,
    modal: Arc<ModalHistory>,
    changes: broadcast::Sender<Navigation>,
}

impl Router {
    #[must_use]
    pub fn new(history: Arc<dyn History>, modal: Arc<ModalHistory>) -> Self {
        let (changes, _) = broadcast::channel(16);
        Self {
            routes: Vec::new(),
            not_found: None,
            history,
            modal,
            changes,
        }
    }

    /// Registers `handler` for `pattern`.
    ///
    /// A pattern identical to an existing one silently replaces that route's
    /// handler and keeps its original position.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern cannot be compiled.
    pub fn register<F, Fut>(&mut self, pattern: &str, handler: F) -> Result<()>
    where
        F: Fn(Navigation) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        let handler: Arc<dyn RouteHandler> = Arc::new(handler);

        if let Some(existing) = self.routes.iter_mut().find(|r| r.pattern.source() == pattern) {
            tracing::debug!(pattern, "route handler replaced");
            existing.handler = handler;
            return Ok(());
        }

        self.routes.push(Route {
            pattern: RoutePattern::parse(pattern)?,
            handler,
        });
        tracing::debug!(pattern, route_count = self.routes.len(), "route registered");
        Ok(())
    }

    /// Registers the handler used when no pattern matches.
    pub fn set_not_found<F, Fut>(&mut self, handler: F)
    where
        F: Fn(Navigation) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.not_found = Some(Arc::new(handler));
    }

    /// Observes every settled, matched navigation.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Navigation> {
        self.changes.subscribe()
    }

    /// Registered patterns in match order.
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.routes.iter().map(|r| r.pattern.source())
    }

    /// Pushes a history entry for `location` and resolves it.
    ///
    /// # Errors
    ///
    /// Propagates the handler's error.
    pub async fn navigate(&self, location: &str) -> Result<()> {
        let span = tracing::debug_span!("navigate", %location);
        self.history.push_state(location, HistoryState::Page);
        self.resolve(location).instrument(span).await
    }

    /// Resolves whatever location is current. Call once after registration.
    ///
    /// # Errors
    ///
    /// Propagates the handler's error.
    pub async fn start(&self) -> Result<()> {
        let location = self.history.location();
        tracing::debug!(%location, "router started");
        self.resolve(&location).await
    }

    /// Reacts to a back/forward traversal that landed on `location`.
    ///
    /// The modal coordinator is consulted first; the location is only resolved
    /// when the coordinator does not claim the event. `location` comes from the
    /// popstate event itself, so a traversal that has since been overtaken by
    /// another history move still resolves the entry it reported. Returns
    /// whether a route was resolved.
    ///
    /// # Errors
    ///
    /// Propagates the handler's error.
    pub async fn handle_pop_state(&self, location: &str) -> Result<bool> {
        if self.modal.on_browser_back() == PopDisposition::Handled {
            return Ok(false);
        }

        self.resolve(location).await?;
        Ok(true)
    }

    /// Returns the target of the internal link enclosing a click, if any.
    ///
    /// `chain` is the clicked element's ancestry, outermost first (see
    /// [`Node::path_to`](crate::ui::node::Node::path_to)). The nearest `a`
    /// decides: it is intercepted only when it carries [`LINK_ATTR`].
    #[must_use]
    pub fn intercept_click<'a>(chain: &[&'a Element]) -> Option<&'a str> {
        let anchor = chain.iter().rev().copied().find(|element| element.tag == "a")?;
        if !anchor.has_attr(LINK_ATTR) {
            return None;
        }
        anchor.attr_value("href")
    }

    /// Document-level click delegation.
    ///
    /// Internal links are turned into [`Router::navigate`] calls; returns
    /// whether the default browser action was prevented.
    ///
    /// # Errors
    ///
    /// Propagates the handler's error.
    pub async fn handle_click(&self, chain: &[&Element]) -> Result<bool> {
        let Some(href) = Self::intercept_click(chain) else {
            return Ok(false);
        };
        let href = href.to_string();
        self.navigate(&href).await?;
        Ok(true)
    }

    /// Resolves `location` against the routing table and runs the handler.
    ///
    /// # Errors
    ///
    /// Propagates the handler's error.
    pub async fn resolve(&self, location: &str) -> Result<()> {
        let (path, query) = split_location(location);

        let matched = self
            .routes
            .iter()
            .find_map(|route| route.pattern.captures(path).map(|params| (route, params)));

        let Some((route, params)) = matched else {
            tracing::debug!(path, "no route matched");
            if let Some(handler) = &self.not_found {
                handler.handle(Navigation::from_location(location)).await?;
            }
            return Ok(());
        };

        let navigation = Navigation {
            path: path.to_string(),
            params,
            query: parse_query(query),
        };
        tracing::debug!(pattern = route.pattern.source(), params = ?navigation.params, "route matched");

        route.handler.handle(navigation.clone()).await?;

        let _ = self.changes.send(navigation);
        Ok(())
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("patterns", &self.patterns().collect::<Vec<_>>())
            .field("has_not_found", &self.not_found.is_some())
            .finish_non_exhaustive()
    }
}
