//! Following/public feed and posts.

use crate::api::{notify_failure, ApiClient};
use crate::domain::error::{PawfeedError, Result};
use crate::domain::{FeedPage, FeedScope, NewPost, Post};
use crate::ui::Toasts;

/// Longest accepted post text, in characters.
pub const MAX_POST_LEN: usize = 2000;

/// A post needs text or an image, and text may not exceed [`MAX_POST_LEN`].
///
/// # Errors
///
/// Returns [`PawfeedError::Validation`] describing the first problem found.
pub fn validate_post(post: &NewPost) -> Result<()> {
    if post.dog_id.trim().is_empty() {
        return Err(PawfeedError::Validation("Choose which dog is posting".to_string()));
    }

    let len = post.content.trim().chars().count();
    if len == 0 && post.image_url.is_none() {
        return Err(PawfeedError::Validation("Write something or add a photo".to_string()));
    }
    if len > MAX_POST_LEN {
        return Err(PawfeedError::Validation(format!(
            "Posts can be at most {MAX_POST_LEN} characters"
        )));
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct FeedService {
    api: ApiClient,
    toasts: Toasts,
}

impl FeedService {
    #[must_use]
    pub fn new(api: ApiClient, toasts: Toasts) -> Self {
        Self { api, toasts }
    }

    /// One page of the feed, starting after `cursor`.
    ///
    /// # Errors
    ///
    /// API failures, also shown as a toast.
    pub async fn feed(&self, scope: FeedScope, cursor: Option<&str>) -> Result<FeedPage> {
        // The serializer is not `Send`; it must be gone before the await.
        let path = {
            let mut query = url::form_urlencoded::Serializer::new(String::new());
            query.append_pair("scope", scope.as_str());
            if let Some(cursor) = cursor {
                query.append_pair("cursor", cursor);
            }
            format!("/feed?{}", query.finish())
        };

        let result = self.api.get(&path).await;
        notify_failure(&self.toasts, "Could not load feed", result)
    }

    /// # Errors
    ///
    /// API failures, also shown as a toast.
    pub async fn post(&self, id: &str) -> Result<Post> {
        let result = self.api.get(&format!("/posts/{id}")).await;
        notify_failure(&self.toasts, "Could not load post", result)
    }

    /// Posts by one dog, newest first.
    ///
    /// # Errors
    ///
    /// API failures, also shown as a toast.
    pub async fn dog_posts(&self, dog_id: &str) -> Result<Vec<Post>> {
        let result = self.api.get(&format!("/dogs/{dog_id}/posts")).await;
        notify_failure(&self.toasts, "Could not load posts", result)
    }

    /// Publishes a post. Invalid posts are rejected without a request.
    ///
    /// # Errors
    ///
    /// Validation or API failures, also shown as a toast.
    pub async fn create_post(&self, post: &NewPost) -> Result<Post> {
        let result = match validate_post(post) {
            Ok(()) => self.api.post("/posts", post).await,
            Err(e) => Err(e),
        };
        let created: Post = notify_failure(&self.toasts, "Could not publish post", result)?;
        tracing::info!(post_id = %created.id, dog_id = %created.dog_id, "post published");
        self.toasts.success("Post published");
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(content: &str, image: Option<&str>) -> NewPost {
        NewPost {
            dog_id: "d1".to_string(),
            content: content.to_string(),
            image_url: image.map(str::to_string),
        }
    }

    #[test]
    fn image_only_posts_are_allowed() {
        assert!(validate_post(&post("", Some("https://cdn.example.com/a.jpg"))).is_ok());
        assert!(validate_post(&post("   ", None)).is_err());
    }

    #[test]
    fn content_limit_is_inclusive() {
        assert!(validate_post(&post(&"a".repeat(MAX_POST_LEN), None)).is_ok());
        assert!(validate_post(&post(&"a".repeat(MAX_POST_LEN + 1), None)).is_err());
    }
}
