//! Typed access to the values the client keeps in durable storage.
//!
//! The session token and the current user are stored under separate keys and
//! are always written and cleared together.

use super::backend::KeyValueStore;
use crate::domain::error::{PawfeedError, Result};
use crate::domain::{Session, User};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const TOKEN_KEY: &str = "pawfeed.token";
pub const USER_KEY: &str = "pawfeed.user";
pub const LANGUAGE_KEY: &str = "pawfeed.language";
pub const CART_KEY: &str = "pawfeed.cart";
pub const RECENT_SEARCHES_KEY: &str = "pawfeed.recent-searches";
pub const ONBOARDING_KEY: &str = "pawfeed.onboarding-completed";
pub const REFERRAL_KEY: &str = "pawfeed.pending-referral";

/// Number of recent searches kept.
pub const MAX_RECENT_SEARCHES: usize = 8;

/// Interface language preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    English,
    Finnish,
}

impl Language {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Finnish => "fi",
        }
    }

    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "en" => Some(Self::English),
            "fi" => Some(Self::Finnish),
            _ => None,
        }
    }
}

/// A line in the (feature-flagged) shop cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: String,
    pub quantity: u32,
}

/// Session, preferences and small client-side state on top of a [`KeyValueStore`].
pub struct ClientStorage {
    store: Arc<dyn KeyValueStore>,
    cart_enabled: bool,
}

impl ClientStorage {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, cart_enabled: bool) -> Self {
        Self { store, cart_enabled }
    }

    /// Bearer token of the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub fn token(&self) -> Result<Option<String>> {
        self.store.get(TOKEN_KEY)
    }

    /// The signed-in user.
    ///
    /// A record that no longer parses is treated as signed out.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub fn user(&self) -> Result<Option<User>> {
        let Some(raw) = self.store.get(USER_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                tracing::warn!(error = %e, "stored user is unreadable, ignoring");
                Ok(None)
            }
        }
    }

    /// Token and user, only when both are present.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub fn session(&self) -> Result<Option<Session>> {
        Ok(match (self.token()?, self.user()?) {
            (Some(token), Some(user)) => Some(Session { token, user }),
            _ => None,
        })
    }

    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub fn is_authenticated(&self) -> Result<bool> {
        Ok(self.session()?.is_some())
    }

    /// Persists token and user.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be written.
    pub fn save_session(&self, session: &Session) -> Result<()> {
        let user = serde_json::to_string(&session.user)?;
        self.store.set(USER_KEY, &user)?;
        self.store.set(TOKEN_KEY, &session.token)?;
        tracing::debug!(user_id = %session.user.id, "session saved");
        Ok(())
    }

    /// Removes token and user together.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be written.
    pub fn clear_session(&self) -> Result<()> {
        self.store.remove_many(&[TOKEN_KEY, USER_KEY])?;
        tracing::debug!("session cleared");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub fn language(&self) -> Result<Language> {
        Ok(self
            .store
            .get(LANGUAGE_KEY)?
            .and_then(|code| Language::from_code(&code))
            .unwrap_or_default())
    }

    /// # Errors
    ///
    /// Returns an error if storage cannot be written.
    pub fn set_language(&self, language: Language) -> Result<()> {
        self.store.set(LANGUAGE_KEY, language.code())
    }

    /// Recent search queries, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub fn recent_searches(&self) -> Result<Vec<String>> {
        Ok(self
            .store
            .get(RECENT_SEARCHES_KEY)?
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default())
    }

    /// Records `query` as the newest search.
    ///
    /// Earlier entries equal ignoring case are dropped; the list is capped at
    /// [`MAX_RECENT_SEARCHES`].
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read or written.
    pub fn push_recent_search(&self, query: &str) -> Result<()> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(());
        }

        let mut searches = self.recent_searches()?;
        searches.retain(|existing| !existing.eq_ignore_ascii_case(query));
        searches.insert(0, query.to_string());
        searches.truncate(MAX_RECENT_SEARCHES);

        self.store.set(RECENT_SEARCHES_KEY, &serde_json::to_string(&searches)?)
    }

    /// # Errors
    ///
    /// Returns an error if storage cannot be written.
    pub fn clear_recent_searches(&self) -> Result<()> {
        self.store.remove(RECENT_SEARCHES_KEY)
    }

    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub fn onboarding_completed(&self) -> Result<bool> {
        Ok(self.store.get(ONBOARDING_KEY)?.as_deref() == Some("true"))
    }

    /// # Errors
    ///
    /// Returns an error if storage cannot be written.
    pub fn complete_onboarding(&self) -> Result<()> {
        self.store.set(ONBOARDING_KEY, "true")
    }

    /// Referral code captured from an invite link, kept until registration.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub fn pending_referral(&self) -> Result<Option<String>> {
        self.store.get(REFERRAL_KEY)
    }

    /// # Errors
    ///
    /// Returns an error if storage cannot be written.
    pub fn set_pending_referral(&self, code: &str) -> Result<()> {
        self.store.set(REFERRAL_KEY, code)
    }

    /// Returns and forgets the pending referral code.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read or written.
    pub fn take_pending_referral(&self) -> Result<Option<String>> {
        let code = self.pending_referral()?;
        if code.is_some() {
            self.store.remove(REFERRAL_KEY)?;
        }
        Ok(code)
    }

    /// Cart contents; always empty while the shop is disabled.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub fn cart(&self) -> Result<Vec<CartItem>> {
        if !self.cart_enabled {
            return Ok(Vec::new());
        }
        Ok(self
            .store
            .get(CART_KEY)?
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default())
    }

    /// # Errors
    ///
    /// Returns [`PawfeedError::Validation`] while the shop is disabled, or a
    /// storage error.
    pub fn set_cart(&self, items: &[CartItem]) -> Result<()> {
        if !self.cart_enabled {
            return Err(PawfeedError::Validation("The shop is not available".to_string()));
        }
        self.store.set(CART_KEY, &serde_json::to_string(items)?)
    }
}

impl std::fmt::Debug for ClientStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientStorage")
            .field("cart_enabled", &self.cart_enabled)
            .finish_non_exhaustive()
    }
}
