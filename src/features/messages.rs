//! Direct messages between owners.

use crate::api::{notify_failure, ApiClient};
use crate::domain::error::{PawfeedError, Result};
use crate::domain::{Conversation, Message, UnreadCount};
use crate::ui::Toasts;
use serde::Serialize;

pub const MAX_MESSAGE_LEN: usize = 1000;

/// # Errors
///
/// Returns [`PawfeedError::Validation`] for empty or overlong messages.
pub fn validate_message(body: &str) -> Result<()> {
    match body.trim().chars().count() {
        0 => Err(PawfeedError::Validation("Message cannot be empty".to_string())),
        n if n > MAX_MESSAGE_LEN => Err(PawfeedError::Validation(format!(
            "Messages can be at most {MAX_MESSAGE_LEN} characters"
        ))),
        _ => Ok(()),
    }
}

#[derive(Serialize)]
struct Reply<'a> {
    body: &'a str,
}

#[derive(Serialize)]
struct NewConversation<'a> {
    dog_id: &'a str,
    body: &'a str,
}

#[derive(Debug, Clone)]
pub struct MessageService {
    api: ApiClient,
    toasts: Toasts,
}

impl MessageService {
    #[must_use]
    pub fn new(api: ApiClient, toasts: Toasts) -> Self {
        Self { api, toasts }
    }

    /// # Errors
    ///
    /// API failures, also shown as a toast.
    pub async fn conversations(&self) -> Result<Vec<Conversation>> {
        let result = self.api.get("/messages").await;
        notify_failure(&self.toasts, "Could not load messages", result)
    }

    /// Messages of one conversation, oldest first.
    ///
    /// # Errors
    ///
    /// API failures, also shown as a toast.
    pub async fn thread(&self, conversation_id: &str) -> Result<Vec<Message>> {
        let result = self.api.get(&format!("/messages/{conversation_id}")).await;
        notify_failure(&self.toasts, "Could not load conversation", result)
    }

    /// # Errors
    ///
    /// Validation or API failures, also shown as a toast.
    pub async fn send(&self, conversation_id: &str, body: &str) -> Result<Message> {
        let body = body.trim();
        let result = match validate_message(body) {
            Ok(()) => {
                self.api
                    .post(&format!("/messages/{conversation_id}"), &Reply { body })
                    .await
            }
            Err(e) => Err(e),
        };
        notify_failure(&self.toasts, "Could not send message", result)
    }

    /// Opens a conversation with the owner of `dog_id`.
    ///
    /// # Errors
    ///
    /// Validation or API failures, also shown as a toast.
    pub async fn start_conversation(&self, dog_id: &str, body: &str) -> Result<Conversation> {
        let body = body.trim();
        let result = match validate_message(body) {
            Ok(()) => self.api.post("/messages", &NewConversation { dog_id, body }).await,
            Err(e) => Err(e),
        };
        notify_failure(&self.toasts, "Could not send message", result)
    }

    /// Number of unread messages. Failures are not toasted; this runs in the background.
    ///
    /// # Errors
    ///
    /// API failures.
    pub async fn unread_count(&self) -> Result<u64> {
        let unread: UnreadCount = self.api.get("/messages/unread-count").await?;
        Ok(unread.count)
    }

    /// # Errors
    ///
    /// API failures.
    pub async fn mark_read(&self, conversation_id: &str) -> Result<()> {
        self.api.post_empty(&format!("/messages/{conversation_id}/read")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_bounds() {
        assert!(validate_message(" \n ").is_err());
        assert!(validate_message("woof").is_ok());
        assert!(validate_message(&"w".repeat(MAX_MESSAGE_LEN)).is_ok());
        assert!(validate_message(&"w".repeat(MAX_MESSAGE_LEN + 1)).is_err());
    }
}
