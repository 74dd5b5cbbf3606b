//! Feature services against a scripted transport.

mod common;

use async_trait::async_trait;
use chrono::NaiveDate;
use common::{api_fixture, ScriptedTransport};
use pawfeed::api::ApiClient;
use pawfeed::domain::{FeedScope, HealthRecordKind, NewDog, NewHealthRecord, NewPost, Session, User};
use pawfeed::features::{AuthState, IdentityProvider, Services, UnreadPoller};
use pawfeed::storage::{ClientStorage, MemoryStore};
use pawfeed::ui::{ToastLevel, Toasts};
use pawfeed::{ErrorKind, PawfeedError, Result};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
struct FakeIdentity {
    registrations: Mutex<Vec<(String, Option<String>)>>,
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn login(&self, email: &str, password: &str) -> Result<Session> {
        if password != "correct horse" {
            return Err(PawfeedError::Auth("Incorrect username or password".into()));
        }
        Ok(Session {
            token: "tok-1".into(),
            user: User {
                id: "u1".into(),
                email: email.into(),
                display_name: None,
            },
        })
    }

    async fn register(&self, email: &str, _password: &str, referral: Option<&str>) -> Result<()> {
        self.registrations
            .lock()
            .unwrap()
            .push((email.to_string(), referral.map(str::to_string)));
        Ok(())
    }

    async fn confirm(&self, _email: &str, _code: &str) -> Result<()> {
        Ok(())
    }

    async fn forgot_password(&self, _email: &str) -> Result<()> {
        Ok(())
    }

    async fn reset_password(&self, _email: &str, _code: &str, _new_password: &str) -> Result<()> {
        Ok(())
    }
}

struct Harness {
    transport: Arc<ScriptedTransport>,
    storage: Arc<ClientStorage>,
    toasts: Toasts,
    api: ApiClient,
    identity: Arc<FakeIdentity>,
    services: Services,
}

fn harness_with(transport: ScriptedTransport, timeout: Duration) -> Harness {
    let transport = Arc::new(transport);
    let storage = Arc::new(ClientStorage::new(Arc::new(MemoryStore::new()), false));
    let toasts = Toasts::new();
    let api = ApiClient::new(transport.clone(), "http://api.test", timeout, storage.clone());
    let identity = Arc::new(FakeIdentity::default());
    let services = Services::new(&api, &storage, &toasts, identity.clone(), "https://pawfeed.example.com").unwrap();
    Harness {
        transport,
        storage,
        toasts,
        api,
        identity,
        services,
    }
}

fn harness() -> Harness {
    harness_with(ScriptedTransport::new(api_fixture), Duration::from_secs(5))
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

#[tokio::test]
async fn invalid_input_never_reaches_the_transport() {
    let h = harness();
    let s = &h.services;

    let empty_post = NewPost {
        dog_id: "d1".into(),
        content: "  ".into(),
        image_url: None,
    };
    assert_eq!(s.feed.create_post(&empty_post).await.unwrap_err().kind(), ErrorKind::Validation);

    let nameless = NewDog::default();
    assert_eq!(s.dogs.create_dog(&nameless).await.unwrap_err().kind(), ErrorKind::Validation);

    assert_eq!(s.messages.send("c1", "   ").await.unwrap_err().kind(), ErrorKind::Validation);
    assert_eq!(s.search.search(" a ").await.unwrap_err().kind(), ErrorKind::Validation);

    let record = NewHealthRecord {
        kind: HealthRecordKind::Vaccination,
        title: String::new(),
        date: date("2026-01-10"),
        next_due: None,
        notes: None,
    };
    assert_eq!(s.health.add_record("d1", &record).await.unwrap_err().kind(), ErrorKind::Validation);

    let upload = s.uploads.upload_image("notes.txt", "text/plain", b"woof".to_vec()).await;
    assert_eq!(upload.unwrap_err().kind(), ErrorKind::Validation);

    assert_eq!(h.transport.count(), 0);
    let toasts = h.toasts.drain();
    assert!(!toasts.is_empty());
    assert!(toasts.iter().all(|t| t.level == ToastLevel::Error));
}

#[tokio::test]
async fn slow_responses_surface_as_timeouts() {
    let h = harness_with(ScriptedTransport::slow(Duration::from_millis(500)), Duration::from_millis(20));

    let err = h.services.feed.feed(FeedScope::Following, None).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Timeout);
    assert_eq!(h.toasts.drain().len(), 1);
}

#[tokio::test]
async fn error_envelope_becomes_http_error() {
    let h = harness();

    let err = h.services.feed.post("missing").await.unwrap_err();

    assert_eq!(err.status(), Some(404));
    assert!(err.to_string().contains("Not found"));
}

#[tokio::test]
async fn feed_query_carries_scope_and_cursor() {
    let h = harness();

    h.services.feed.feed(FeedScope::Public, Some("abc 1")).await.unwrap();

    assert_eq!(h.transport.paths(), vec!["/feed?scope=public&cursor=abc+1".to_string()]);
}

#[tokio::test]
async fn feed_loads_on_a_spawned_task() {
    let h = harness();
    let feed = h.services.feed.clone();

    let page = tokio::spawn(async move { feed.feed(FeedScope::Public, Some("abc")).await })
        .await
        .unwrap()
        .unwrap();

    assert!(page.posts.is_empty());
    assert_eq!(h.transport.paths(), vec!["/feed?scope=public&cursor=abc".to_string()]);
}

#[tokio::test]
async fn login_persists_session_and_logout_clears_it() {
    let h = harness();
    let mut auth = h.services.auth.subscribe();

    let user = h.services.auth.login(" owner@example.com ", "correct horse").await.unwrap();
    assert_eq!(user.email, "owner@example.com");
    assert!(auth.has_changed().unwrap());
    assert!(auth.borrow_and_update().is_signed_in());
    assert_eq!(h.storage.token().unwrap().as_deref(), Some("tok-1"));

    h.api.get::<serde_json::Value>("/messages").await.unwrap();
    assert_eq!(h.transport.sent()[0].bearer.as_deref(), Some("tok-1"));

    h.services.auth.logout().unwrap();

    assert_eq!(h.services.auth.state(), AuthState::SignedOut);
    assert_eq!(h.storage.token().unwrap(), None);
    assert_eq!(h.storage.user().unwrap(), None);
    assert!(!h.storage.is_authenticated().unwrap());
}

#[tokio::test]
async fn wrong_password_is_an_auth_error_and_keeps_signed_out() {
    let h = harness();

    let err = h.services.auth.login("owner@example.com", "nope").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Auth);
    assert_eq!(h.services.auth.state(), AuthState::SignedOut);
    assert_eq!(h.storage.token().unwrap(), None);
}

#[tokio::test]
async fn registration_forwards_and_then_forgets_referral() {
    let h = harness();
    h.storage.set_pending_referral("WOOF42").unwrap();

    h.services.auth.register("new@example.com", "long enough").await.unwrap();

    let registrations = h.identity.registrations.lock().unwrap().clone();
    assert_eq!(registrations, vec![("new@example.com".to_string(), Some("WOOF42".to_string()))]);
    assert_eq!(h.storage.pending_referral().unwrap(), None);
}

#[tokio::test]
async fn poller_publishes_unread_count_until_stopped() {
    let h = harness();
    let poller = UnreadPoller::new(h.services.messages.clone(), Duration::from_millis(20));
    let mut counts = poller.subscribe();

    poller.start();
    assert!(poller.is_running());
    tokio::time::timeout(Duration::from_secs(2), counts.changed())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(poller.count(), 2);

    poller.stop();
    assert!(!poller.is_running());
    assert_eq!(poller.count(), 0);
}

#[tokio::test]
async fn zero_interval_poller_stays_idle() {
    let h = harness();
    let poller = UnreadPoller::new(h.services.messages.clone(), Duration::ZERO);

    poller.start();

    assert!(!poller.is_running());
    assert_eq!(h.transport.count(), 0);
}
