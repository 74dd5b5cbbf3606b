//! HTTP API access.
//!
//! # Modules
//!
//! - [`transport`]: Request/response types and the [`Transport`] trait
//! - [`client`]: [`ApiClient`], the typed wrapper used by feature services
//!
//! # Error Display Policy
//!
//! Feature services pass results through [`notify_failure`]: expected failure
//! kinds (network, timeout, HTTP, validation, auth) raise an error toast, and
//! the error is still returned so callers can restore UI state.

pub mod client;
pub mod transport;

pub use client::{ApiClient, DEFAULT_TIMEOUT};
pub use transport::{ApiRequest, ApiResponse, Method, ReqwestTransport, RequestBody, Transport};

use crate::domain::error::Result;
use crate::ui::Toasts;

/// Shows a toast for expected failures and hands the result back unchanged.
///
/// # Errors
///
/// Returns `result`'s error unchanged.
///
/// # Example
///
/// ```
/// use pawfeed::api::notify_failure;
/// use pawfeed::ui::Toasts;
/// use pawfeed::PawfeedError;
///
/// let toasts = Toasts::new();
/// let result: pawfeed::Result<()> = Err(PawfeedError::Validation("Name is required".into()));
///
/// assert!(notify_failure(&toasts, "Could not save dog", result).is_err());
/// assert_eq!(toasts.drain()[0].message, "Could not save dog: Name is required");
/// ```
pub fn notify_failure<T>(toasts: &Toasts, context: &str, result: Result<T>) -> Result<T> {
    if let Err(error) = &result {
        if error.is_expected() {
            toasts.error(format!("{context}: {}", error.user_message()));
        } else {
            tracing::error!(context, error = %error, "unexpected failure");
        }
    }
    result
}
