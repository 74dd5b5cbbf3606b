//! Records exchanged with the HTTP API.
//!
//! These mirror the JSON bodies of the remote API. Timestamps are RFC 3339 and
//! calendar dates are `YYYY-MM-DD`. Optional fields default when absent so older
//! servers remain readable.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// The signed-in account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Bearer token plus the user it belongs to.
///
/// Produced by the identity provider on login and persisted by
/// [`ClientStorage`](crate::storage::ClientStorage).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: User,
}

/// A dog profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dog {
    pub id: String,
    /// URL-safe identifier used in `/dog/:slug`.
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub breed: Option<String>,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    pub owner_id: String,
    #[serde(default)]
    pub followers_count: u32,
    /// Whether the signed-in user follows this dog.
    #[serde(default)]
    pub is_following: bool,
}

/// Payload for creating a dog profile.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NewDog {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breed: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

/// A post in a feed or on a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub dog_id: String,
    #[serde(default)]
    pub dog_slug: Option<String>,
    #[serde(default)]
    pub dog_name: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub like_count: u32,
}

/// Payload for publishing a post as one of the user's dogs.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NewPost {
    pub dog_id: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Which feed to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedScope {
    /// Posts from dogs the user follows.
    #[default]
    Following,
    /// Every public post.
    Public,
}

impl FeedScope {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Following => "following",
            Self::Public => "public",
        }
    }
}

/// One page of a feed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FeedPage {
    #[serde(default)]
    pub posts: Vec<Post>,
    /// Cursor for the next page; `None` when the feed is exhausted.
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// A direct-message conversation summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub participant_name: String,
    #[serde(default)]
    pub last_message: Option<String>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub unread_count: u32,
}

/// A single direct message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    pub body: String,
    pub sent_at: DateTime<Utc>,
}

/// Category of a health record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthRecordKind {
    Vaccination,
    VetVisit,
    Medication,
    Weight,
    Other,
}

/// A health entry for a dog (vaccination, vet visit, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthRecord {
    pub id: String,
    pub dog_id: String,
    pub kind: HealthRecordKind,
    pub title: String,
    pub date: NaiveDate,
    /// When the next dose or visit is due, if recurring.
    #[serde(default)]
    pub next_due: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Payload for adding a health record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewHealthRecord {
    pub kind: HealthRecordKind,
    pub title: String,
    pub date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_due: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A referral invite created by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invite {
    pub code: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub accepted_count: u32,
}

/// Presigned upload destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadTarget {
    /// Where to `PUT` the bytes.
    pub upload_url: String,
    /// Public URL of the object once uploaded.
    pub file_url: String,
}

/// Response of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub version: Option<String>,
}

/// Response of `GET /messages/unread-count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnreadCount {
    pub count: u64,
}
