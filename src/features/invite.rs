//! Invites and referral capture.
//!
//! A user shares `https://app/?ref=CODE`. When someone opens that link the
//! code is kept in storage until they register.

use crate::api::{notify_failure, ApiClient};
use crate::domain::error::{PawfeedError, Result};
use crate::domain::Invite;
use crate::navigation::Params;
use crate::storage::ClientStorage;
use crate::ui::Toasts;
use std::sync::Arc;
use url::Url;

/// Query parameter carrying a referral code.
pub const REFERRAL_PARAM: &str = "ref";

#[derive(Debug, Clone)]
pub struct InviteService {
    api: ApiClient,
    storage: Arc<ClientStorage>,
    toasts: Toasts,
    app_base_url: Url,
}

impl InviteService {
    /// # Errors
    ///
    /// Returns [`PawfeedError::Config`] if `app_base_url` is not a valid URL.
    pub fn new(api: ApiClient, storage: Arc<ClientStorage>, toasts: Toasts, app_base_url: &str) -> Result<Self> {
        let app_base_url = Url::parse(app_base_url)
            .map_err(|e| PawfeedError::Config(format!("invalid app_base_url {app_base_url:?}: {e}")))?;
        Ok(Self {
            api,
            storage,
            toasts,
            app_base_url,
        })
    }

    /// # Errors
    ///
    /// API failures, also shown as a toast.
    pub async fn create_invite(&self) -> Result<Invite> {
        let result = self.api.post("/invites", &serde_json::json!({})).await;
        let invite: Invite = notify_failure(&self.toasts, "Could not create invite", result)?;
        tracing::info!(code = %invite.code, "invite created");
        Ok(invite)
    }

    /// Invites created by the signed-in user.
    ///
    /// # Errors
    ///
    /// API failures, also shown as a toast.
    pub async fn invites(&self) -> Result<Vec<Invite>> {
        let result = self.api.get("/invites").await;
        notify_failure(&self.toasts, "Could not load invites", result)
    }

    /// Link to share for `code`.
    #[must_use]
    pub fn share_url(&self, code: &str) -> String {
        let mut url = self.app_base_url.clone();
        url.set_path("/");
        url.query_pairs_mut().clear().append_pair(REFERRAL_PARAM, code);
        url.into()
    }

    /// Stores the `ref` query parameter, if present. Returns the captured code.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be written.
    pub fn capture_referral(&self, query: &Params) -> Result<Option<String>> {
        let Some(code) = query.get(REFERRAL_PARAM).map(|c| c.trim()).filter(|c| !c.is_empty()) else {
            return Ok(None);
        };
        self.storage.set_pending_referral(code)?;
        tracing::debug!(code, "referral captured");
        Ok(Some(code.to_string()))
    }
}
