//! Sign-in, registration and session lifecycle.
//!
//! Credentials are checked by an external identity provider behind the
//! [`IdentityProvider`] trait. On success the session is persisted through
//! [`ClientStorage`] and the new [`AuthState`] is published on a watch channel,
//! which the app uses to start and stop unread polling.

use crate::api::notify_failure;
use crate::domain::error::{PawfeedError, Result};
use crate::domain::{Session, User};
use crate::storage::ClientStorage;
use crate::ui::Toasts;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::watch;

/// Minimum password length accepted client-side.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Managed identity service.
///
/// Implementations return [`PawfeedError::Auth`] for invalid credentials,
/// duplicate accounts and unconfirmed users.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<Session>;

    /// Creates an account. The account must be confirmed before login.
    async fn register(&self, email: &str, password: &str, referral: Option<&str>) -> Result<()>;

    async fn confirm(&self, email: &str, code: &str) -> Result<()>;

    async fn forgot_password(&self, email: &str) -> Result<()>;

    async fn reset_password(&self, email: &str, code: &str, new_password: &str) -> Result<()>;
}

/// Provider used when no identity service is configured. Every call fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredIdentityProvider;

impl UnconfiguredIdentityProvider {
    fn unavailable() -> PawfeedError {
        PawfeedError::Auth("Sign-in is not available".to_string())
    }
}

#[async_trait]
impl IdentityProvider for UnconfiguredIdentityProvider {
    async fn login(&self, _email: &str, _password: &str) -> Result<Session> {
        Err(Self::unavailable())
    }

    async fn register(&self, _email: &str, _password: &str, _referral: Option<&str>) -> Result<()> {
        Err(Self::unavailable())
    }

    async fn confirm(&self, _email: &str, _code: &str) -> Result<()> {
        Err(Self::unavailable())
    }

    async fn forgot_password(&self, _email: &str) -> Result<()> {
        Err(Self::unavailable())
    }

    async fn reset_password(&self, _email: &str, _code: &str, _new_password: &str) -> Result<()> {
        Err(Self::unavailable())
    }
}

/// Whether someone is signed in.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthState {
    #[default]
    SignedOut,
    SignedIn(User),
}

impl AuthState {
    #[must_use]
    pub const fn is_signed_in(&self) -> bool {
        matches!(self, Self::SignedIn(_))
    }
}

/// Validates an email address the way the sign-in form does.
///
/// # Errors
///
/// Returns [`PawfeedError::Validation`] when the address is clearly malformed.
pub fn validate_email(email: &str) -> Result<()> {
    let email = email.trim();
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.') && !domain.starts_with('.'));
    if valid {
        Ok(())
    } else {
        Err(PawfeedError::Validation("Enter a valid email address".to_string()))
    }
}

/// # Errors
///
/// Returns [`PawfeedError::Validation`] for passwords shorter than
/// [`MIN_PASSWORD_LEN`] characters.
pub fn validate_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(PawfeedError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// Authentication flows on top of an [`IdentityProvider`].
#[derive(Clone)]
pub struct AuthService {
    provider: Arc<dyn IdentityProvider>,
    storage: Arc<ClientStorage>,
    toasts: Toasts,
    state: Arc<watch::Sender<AuthState>>,
}

impl AuthService {
    #[must_use]
    pub fn new(provider: Arc<dyn IdentityProvider>, storage: Arc<ClientStorage>, toasts: Toasts) -> Self {
        let (state, _) = watch::channel(AuthState::SignedOut);
        Self {
            provider,
            storage,
            toasts,
            state: Arc::new(state),
        }
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    /// Publishes the session found in storage, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub fn restore(&self) -> Result<AuthState> {
        let state = match self.storage.session()? {
            Some(session) => AuthState::SignedIn(session.user),
            None => AuthState::SignedOut,
        };
        tracing::debug!(signed_in = state.is_signed_in(), "session restored");
        self.state.send_replace(state.clone());
        Ok(state)
    }

    /// # Errors
    ///
    /// Validation, identity provider, or storage failures. Expected failures are
    /// also shown as a toast.
    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        let result = self.try_login(email.trim(), password).await;
        notify_failure(&self.toasts, "Could not sign in", result)
    }

    async fn try_login(&self, email: &str, password: &str) -> Result<User> {
        validate_email(email)?;
        if password.is_empty() {
            return Err(PawfeedError::Validation("Enter your password".to_string()));
        }

        let session = self.provider.login(email, password).await?;
        self.storage.save_session(&session)?;
        tracing::info!(user_id = %session.user.id, "signed in");

        self.state.send_replace(AuthState::SignedIn(session.user.clone()));
        Ok(session.user)
    }

    /// Creates an account, attaching the referral code captured from an invite link.
    ///
    /// The code is only forgotten once registration succeeds.
    ///
    /// # Errors
    ///
    /// Validation, identity provider, or storage failures.
    pub async fn register(&self, email: &str, password: &str) -> Result<()> {
        let result = self.try_register(email.trim(), password).await;
        notify_failure(&self.toasts, "Could not create account", result)
    }

    async fn try_register(&self, email: &str, password: &str) -> Result<()> {
        validate_email(email)?;
        validate_password(password)?;

        let referral = self.storage.pending_referral()?;
        self.provider.register(email, password, referral.as_deref()).await?;
        if let Some(code) = self.storage.take_pending_referral()? {
            tracing::info!(%code, "referral attached to registration");
        }

        self.toasts.success("Check your email for a confirmation code");
        Ok(())
    }

    /// # Errors
    ///
    /// Validation or identity provider failures.
    pub async fn confirm(&self, email: &str, code: &str) -> Result<()> {
        let result = async {
            validate_email(email)?;
            if code.trim().is_empty() {
                return Err(PawfeedError::Validation("Enter the confirmation code".to_string()));
            }
            self.provider.confirm(email.trim(), code.trim()).await
        }
        .await;
        notify_failure(&self.toasts, "Could not confirm account", result)
    }

    /// # Errors
    ///
    /// Validation or identity provider failures.
    pub async fn forgot_password(&self, email: &str) -> Result<()> {
        let result = async {
            validate_email(email)?;
            self.provider.forgot_password(email.trim()).await
        }
        .await;
        notify_failure(&self.toasts, "Could not send reset code", result)
    }

    /// # Errors
    ///
    /// Validation or identity provider failures.
    pub async fn reset_password(&self, email: &str, code: &str, new_password: &str) -> Result<()> {
        let result = async {
            validate_email(email)?;
            validate_password(new_password)?;
            self.provider.reset_password(email.trim(), code.trim(), new_password).await
        }
        .await;
        notify_failure(&self.toasts, "Could not reset password", result)
    }

    /// Clears token and user together and publishes [`AuthState::SignedOut`].
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be written.
    pub fn logout(&self) -> Result<()> {
        self.storage.clear_session()?;
        self.state.send_replace(AuthState::SignedOut);
        tracing::info!("signed out");
        Ok(())
    }
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_needs_local_part_and_dotted_domain() {
        assert!(validate_email("owner@example.com").is_ok());
        assert!(validate_email("  owner@example.com ").is_ok());
        assert!(validate_email("owner@example").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("owner.example.com").is_err());
    }

    #[test]
    fn password_length_counts_characters() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("äöäöäöäö").is_ok());
    }
}
