//! The application context.
//!
//! [`App`] owns exactly one instance of every collaborator: history,
//! modal coordinator, router, view manager, overlays, toasts, storage, API
//! client, feature services and the unread poller. Nothing lives in globals,
//! so tests build a fresh `App` per case.

use crate::api::{ApiClient, Transport};
use crate::domain::error::Result;
use crate::domain::Dog;
use crate::features::{AuthState, IdentityProvider, Services, UnreadPoller};
use crate::navigation::{History, HistoryState, ModalHistory, Navigation, Router};
use crate::storage::{ClientStorage, KeyValueStore};
use crate::ui::node::{link, Element, Node};
use crate::ui::views::{ConversationView, DogProfileView, HomeView, MessagesView, PostView};
use crate::ui::{OverlayStack, SharedViews, Surface, Toasts, View, ViewManager};
use crate::Config;
use std::sync::Arc;
use tokio::sync::watch;

/// Platform adapters the app runs on.
pub struct Platform {
    pub history: Arc<dyn History>,
    pub store: Arc<dyn KeyValueStore>,
    pub transport: Arc<dyn Transport>,
    pub identity: Arc<dyn IdentityProvider>,
}

/// Results of the last search, shown in their own panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResults {
    pub query: String,
    pub dogs: Vec<Dog>,
}

pub struct App {
    pub(crate) history: Arc<dyn History>,
    pub(crate) modal: Arc<ModalHistory>,
    pub(crate) router: Router,
    pub(crate) views: SharedViews,
    pub(crate) surface: Surface,
    pub(crate) overlays: OverlayStack,
    pub(crate) toasts: Toasts,
    pub(crate) storage: Arc<ClientStorage>,
    pub(crate) api: ApiClient,
    pub(crate) services: Services,
    pub(crate) poller: UnreadPoller,
    pub(crate) search: Option<SearchResults>,
    auth_events: watch::Receiver<AuthState>,
}

async fn show(views: SharedViews, view: Box<dyn View>, navigation: Navigation) -> Result<()> {
    views.lock().await.render(view, &navigation).await
}

/// Registers the URL scheme. Specific patterns come before general ones.
fn register_routes(
    router: &mut Router,
    views: &SharedViews,
    services: &Services,
    storage: &Arc<ClientStorage>,
    history: &Arc<dyn History>,
) -> Result<()> {
    {
        let (views, feed, invite, storage) = (views.clone(), services.feed.clone(), services.invite.clone(), storage.clone());
        router.register("/", move |nav: Navigation| {
            if let Err(e) = invite.capture_referral(&nav.query) {
                tracing::warn!(error = %e, "could not store referral code");
            }
            show(views.clone(), Box::new(HomeView::new(feed.clone(), storage.clone())), nav)
        })?;
    }
    {
        let (views, dogs, feed) = (views.clone(), services.dogs.clone(), services.feed.clone());
        router.register("/dog/:slug", move |nav: Navigation| {
            show(views.clone(), Box::new(DogProfileView::new(dogs.clone(), feed.clone())), nav)
        })?;
    }
    {
        let (views, feed) = (views.clone(), services.feed.clone());
        router.register("/post/:id", move |nav: Navigation| {
            show(views.clone(), Box::new(PostView::new(feed.clone())), nav)
        })?;
    }
    {
        let (views, messages) = (views.clone(), services.messages.clone());
        router.register("/messages", move |nav: Navigation| {
            show(views.clone(), Box::new(MessagesView::new(messages.clone())), nav)
        })?;
    }
    {
        let (views, messages) = (views.clone(), services.messages.clone());
        router.register("/messages/:id", move |nav: Navigation| {
            show(views.clone(), Box::new(ConversationView::new(messages.clone())), nav)
        })?;
    }

    let (views, feed, storage, history) = (views.clone(), services.feed.clone(), storage.clone(), history.clone());
    router.set_not_found(move |nav: Navigation| {
        tracing::info!(path = %nav.path, "unknown path, redirecting home");
        history.replace_state("/", HistoryState::Page);
        show(
            views.clone(),
            Box::new(HomeView::new(feed.clone(), storage.clone())),
            Navigation::from_location("/"),
        )
    });
    Ok(())
}

impl App {
    /// Wires every collaborator and registers the routes. Nothing is rendered
    /// until [`Event::Start`](super::Event::Start).
    ///
    /// # Errors
    ///
    /// Returns [`PawfeedError::Config`](crate::PawfeedError::Config) for invalid
    /// URLs in `config`.
    pub fn new(config: &Config, platform: Platform) -> Result<Self> {
        config.validate()?;

        let Platform {
            history,
            store,
            transport,
            identity,
        } = platform;

        let toasts = Toasts::new();
        let storage = Arc::new(ClientStorage::new(store, config.cart_enabled));
        let api = ApiClient::new(transport, &config.api_base_url, config.request_timeout(), storage.clone());
        let services = Services::new(&api, &storage, &toasts, identity, &config.app_base_url)?;

        let modal = Arc::new(ModalHistory::new(history.clone()));
        let surface = Surface::new();
        let views = ViewManager::shared(surface.clone());
        let overlays = OverlayStack::new(modal.clone());

        let mut router = Router::new(history.clone(), modal.clone());
        register_routes(&mut router, &views, &services, &storage, &history)?;

        let poller = UnreadPoller::new(services.messages.clone(), config.poll_interval());
        let auth_events = services.auth.subscribe();

        tracing::debug!(routes = ?router.patterns().collect::<Vec<_>>(), "app wired");

        Ok(Self {
            history,
            modal,
            router,
            views,
            surface,
            overlays,
            toasts,
            storage,
            api,
            services,
            poller,
            search: None,
            auth_events,
        })
    }

    #[must_use]
    pub fn history(&self) -> &Arc<dyn History> {
        &self.history
    }

    #[must_use]
    pub fn modal(&self) -> &Arc<ModalHistory> {
        &self.modal
    }

    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    #[must_use]
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    #[must_use]
    pub fn overlays(&self) -> &OverlayStack {
        &self.overlays
    }

    #[must_use]
    pub fn toasts(&self) -> &Toasts {
        &self.toasts
    }

    #[must_use]
    pub fn storage(&self) -> &Arc<ClientStorage> {
        &self.storage
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    #[must_use]
    pub fn services(&self) -> &Services {
        &self.services
    }

    #[must_use]
    pub fn poller(&self) -> &UnreadPoller {
        &self.poller
    }

    #[must_use]
    pub fn search_results(&self) -> Option<&SearchResults> {
        self.search.as_ref()
    }

    /// Name of the mounted view.
    pub async fn current_view(&self) -> Option<&'static str> {
        self.views.lock().await.current_name()
    }

    /// Starts or stops unread polling after an auth change.
    pub(crate) fn sync_auth(&mut self) {
        if !self.auth_events.has_changed().unwrap_or(false) {
            return;
        }
        let signed_in = self.auth_events.borrow_and_update().is_signed_in();
        if signed_in {
            self.poller.start();
        } else {
            self.poller.stop();
        }
    }

    /// The whole document: page, search panel and overlay layer.
    #[must_use]
    pub fn document(&self) -> Node {
        let mut body = Element::new("body").child(self.surface.snapshot());

        if let Some(results) = &self.search {
            body = body.child(
                Element::new("section")
                    .id("search-results")
                    .child(Element::new("h2").text(format!("Results for \u{201c}{}\u{201d}", results.query)))
                    .child(Element::new("ul").children(results.dogs.iter().map(|dog| {
                        Element::new("li").child(link(format!("/dog/{}", dog.slug), dog.name.as_str()))
                    }))),
            );
        }

        if !self.overlays.is_empty() {
            body = body.child(self.overlays.render());
        }
        body.into()
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("location", &self.history.location())
            .field("router", &self.router)
            .field("overlays", &self.overlays)
            .field("poller", &self.poller)
            .finish_non_exhaustive()
    }
}
