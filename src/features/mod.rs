//! Feature services: thin orchestration over the HTTP API.
//!
//! Every service validates input before sending anything, passes results
//! through [`notify_failure`](crate::api::notify_failure) so expected failures
//! reach the user as a toast, and returns the error so callers can restore UI
//! state.
//!
//! # Modules
//!
//! - [`auth`]: Identity provider seam, sign-in and session lifecycle
//! - [`feed`]: Feed pages and posts
//! - [`profile`]: Dog profiles and follows
//! - [`messages`]: Conversations and direct messages
//! - [`health`]: Health records and reminders
//! - [`search`]: Dog search and recent-search suggestions
//! - [`invite`]: Invites and referral capture
//! - [`uploads`]: Presigned image uploads
//! - [`poller`]: Background unread-count refresh

pub mod auth;
pub mod feed;
pub mod health;
pub mod invite;
pub mod messages;
pub mod poller;
pub mod profile;
pub mod search;
pub mod uploads;

pub use auth::{AuthService, AuthState, IdentityProvider, UnconfiguredIdentityProvider};
pub use feed::FeedService;
pub use health::{upcoming, HealthService, Reminder};
pub use invite::InviteService;
pub use messages::MessageService;
pub use poller::UnreadPoller;
pub use profile::DogService;
pub use search::{SearchService, Suggestion};
pub use uploads::UploadService;

use crate::api::ApiClient;
use crate::domain::error::Result;
use crate::storage::ClientStorage;
use crate::ui::Toasts;
use std::sync::Arc;

/// One instance of every feature service, sharing a client, storage and toasts.
#[derive(Debug, Clone)]
pub struct Services {
    pub auth: AuthService,
    pub feed: FeedService,
    pub dogs: DogService,
    pub messages: MessageService,
    pub health: HealthService,
    pub search: SearchService,
    pub invite: InviteService,
    pub uploads: UploadService,
}

impl Services {
    /// # Errors
    ///
    /// Returns [`PawfeedError::Config`](crate::PawfeedError::Config) if
    /// `app_base_url` is invalid.
    pub fn new(
        api: &ApiClient,
        storage: &Arc<ClientStorage>,
        toasts: &Toasts,
        identity: Arc<dyn IdentityProvider>,
        app_base_url: &str,
    ) -> Result<Self> {
        Ok(Self {
            auth: AuthService::new(identity, storage.clone(), toasts.clone()),
            feed: FeedService::new(api.clone(), toasts.clone()),
            dogs: DogService::new(api.clone(), toasts.clone()),
            messages: MessageService::new(api.clone(), toasts.clone()),
            health: HealthService::new(api.clone(), toasts.clone()),
            search: SearchService::new(api.clone(), storage.clone(), toasts.clone()),
            invite: InviteService::new(api.clone(), storage.clone(), toasts.clone(), app_base_url)?,
            uploads: UploadService::new(api.clone(), toasts.clone()),
        })
    }
}
