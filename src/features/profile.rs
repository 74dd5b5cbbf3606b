//! Dog profiles and follows.

use crate::api::{notify_failure, ApiClient};
use crate::domain::error::{PawfeedError, Result};
use crate::domain::{Dog, NewDog};
use crate::ui::Toasts;
use chrono::NaiveDate;

pub const MAX_DOG_NAME_LEN: usize = 50;

/// # Errors
///
/// Returns [`PawfeedError::Validation`] for a missing or overlong name, or a
/// birth date after `today`.
pub fn validate_dog(dog: &NewDog, today: NaiveDate) -> Result<()> {
    let len = dog.name.trim().chars().count();
    if len == 0 {
        return Err(PawfeedError::Validation("Name is required".to_string()));
    }
    if len > MAX_DOG_NAME_LEN {
        return Err(PawfeedError::Validation(format!(
            "Name can be at most {MAX_DOG_NAME_LEN} characters"
        )));
    }
    if dog.birth_date.is_some_and(|born| born > today) {
        return Err(PawfeedError::Validation("Birth date cannot be in the future".to_string()));
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct DogService {
    api: ApiClient,
    toasts: Toasts,
}

impl DogService {
    #[must_use]
    pub fn new(api: ApiClient, toasts: Toasts) -> Self {
        Self { api, toasts }
    }

    /// # Errors
    ///
    /// API failures, also shown as a toast.
    pub async fn dog(&self, slug: &str) -> Result<Dog> {
        let result = self.api.get(&format!("/dogs/{slug}")).await;
        notify_failure(&self.toasts, "Could not load profile", result)
    }

    /// Dogs owned by the signed-in user.
    ///
    /// # Errors
    ///
    /// API failures, also shown as a toast.
    pub async fn my_dogs(&self) -> Result<Vec<Dog>> {
        let result = self.api.get("/dogs/mine").await;
        notify_failure(&self.toasts, "Could not load your dogs", result)
    }

    /// # Errors
    ///
    /// Validation or API failures, also shown as a toast.
    pub async fn create_dog(&self, dog: &NewDog) -> Result<Dog> {
        let today = chrono::Utc::now().date_naive();
        let result = match validate_dog(dog, today) {
            Ok(()) => self.api.post("/dogs", dog).await,
            Err(e) => Err(e),
        };
        let created: Dog = notify_failure(&self.toasts, "Could not save dog", result)?;
        tracing::info!(dog_id = %created.id, slug = %created.slug, "dog created");
        self.toasts.success(format!("{} joined pawfeed", created.name));
        Ok(created)
    }

    /// # Errors
    ///
    /// API failures, also shown as a toast.
    pub async fn follow(&self, dog_id: &str) -> Result<()> {
        let result = self.api.post_empty(&format!("/dogs/{dog_id}/follow")).await;
        notify_failure(&self.toasts, "Could not follow", result)?;
        tracing::debug!(dog_id, "followed");
        Ok(())
    }

    /// # Errors
    ///
    /// API failures, also shown as a toast.
    pub async fn unfollow(&self, dog_id: &str) -> Result<()> {
        let result = self.api.delete(&format!("/dogs/{dog_id}/follow")).await;
        notify_failure(&self.toasts, "Could not unfollow", result)?;
        tracing::debug!(dog_id, "unfollowed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    #[test]
    fn name_is_trimmed_and_bounded() {
        let mut dog = NewDog {
            name: "  ".to_string(),
            ..NewDog::default()
        };
        assert!(validate_dog(&dog, today()).is_err());

        dog.name = "x".repeat(MAX_DOG_NAME_LEN);
        assert!(validate_dog(&dog, today()).is_ok());

        dog.name.push('x');
        assert!(validate_dog(&dog, today()).is_err());
    }

    #[test]
    fn birth_date_may_be_today_but_not_later() {
        let mut dog = NewDog {
            name: "Nelli".to_string(),
            birth_date: Some(today()),
            ..NewDog::default()
        };
        assert!(validate_dog(&dog, today()).is_ok());

        dog.birth_date = today().succ_opt();
        assert!(validate_dog(&dog, today()).is_err());
    }
}
