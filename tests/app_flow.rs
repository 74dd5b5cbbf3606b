//! End-to-end flows through `handle_event` on an in-memory platform.

mod common;

use common::{api_fixture, config, Fixture, ScriptedTransport};
use pawfeed::domain::{Session, User};
use pawfeed::features::UnconfiguredIdentityProvider;
use pawfeed::navigation::{History, HistoryState, MemoryHistory, ModalState};
use pawfeed::storage::session::ONBOARDING_KEY;
use pawfeed::storage::{KeyValueStore, MemoryStore};
use pawfeed::ui::OverlayKind;
use pawfeed::{handle_event, App, Event, PawfeedError, Platform, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

async fn started(initial: &str) -> (App, Fixture) {
    let fixture = Fixture::new(initial, ScriptedTransport::new(api_fixture));
    let mut app = App::new(&config(), fixture.platform()).unwrap();
    handle_event(&mut app, &Event::Start).await.unwrap();
    (app, fixture)
}

#[tokio::test]
async fn start_then_navigate_to_profile() {
    let fixture = Fixture::new("/", ScriptedTransport::new(api_fixture));
    let mut app = App::new(&config(), fixture.platform()).unwrap();
    let mut changes = app.router().subscribe();

    handle_event(&mut app, &Event::Start).await.unwrap();

    let home = changes.try_recv().unwrap();
    assert_eq!(home.path, "/");
    assert!(home.params.is_empty());
    assert_eq!(app.current_view().await, Some("home"));

    let before = fixture.history.len();
    handle_event(&mut app, &Event::Navigate("/dog/nelli-1".into())).await.unwrap();

    let profile = changes.try_recv().unwrap();
    assert_eq!(profile.params.get("slug").map(String::as_str), Some("nelli-1"));
    assert_eq!(fixture.history.len(), before + 1);
    assert_eq!(app.current_view().await, Some("dog-profile"));
    assert_eq!(app.surface().text_of("dog-name").as_deref(), Some("Nelli"));
}

#[tokio::test]
async fn browser_back_closes_overlays_without_rerouting() {
    let (mut app, fixture) = started("/dog/nelli-1").await;
    let mut changes = app.router().subscribe();
    let requests = fixture.transport.count();
    let before = fixture.history.len();

    handle_event(&mut app, &Event::OpenOverlay(OverlayKind::NewPost)).await.unwrap();
    handle_event(&mut app, &Event::OpenOverlay(OverlayKind::ImageViewer)).await.unwrap();
    assert_eq!(app.overlays().len(), 2);
    assert_eq!(fixture.history.len(), before + 1);
    assert_eq!(fixture.history.state(), HistoryState::Modal);

    handle_event(&mut app, &Event::Back).await.unwrap();

    assert!(app.overlays().is_empty());
    assert_eq!(app.modal().state(), ModalState::Idle);
    assert_eq!(fixture.history.location(), "/dog/nelli-1");
    assert_eq!(fixture.history.state(), HistoryState::Page);
    assert!(changes.try_recv().is_err());
    assert_eq!(fixture.transport.count(), requests);
}

#[tokio::test]
async fn closing_overlay_from_ui_consumes_its_entry() {
    let (mut app, fixture) = started("/dog/nelli-1").await;
    let mut changes = app.router().subscribe();

    handle_event(&mut app, &Event::OpenOverlay(OverlayKind::HealthRecord)).await.unwrap();
    handle_event(&mut app, &Event::CloseOverlay).await.unwrap();

    assert!(app.overlays().is_empty());
    assert_eq!(app.modal().state(), ModalState::Idle);
    assert_eq!(fixture.history.state(), HistoryState::Page);
    assert!(changes.try_recv().is_err());

    // The next Back is ordinary navigation again.
    handle_event(&mut app, &Event::Navigate("/messages".into())).await.unwrap();
    handle_event(&mut app, &Event::Back).await.unwrap();
    assert_eq!(app.current_view().await, Some("dog-profile"));
}

#[tokio::test]
async fn unknown_path_redirects_home() {
    let (mut app, fixture) = started("/").await;

    handle_event(&mut app, &Event::Navigate("/no/such/page".into())).await.unwrap();

    assert_eq!(fixture.history.location(), "/");
    assert_eq!(app.current_view().await, Some("home"));
}

#[tokio::test]
async fn referral_code_is_captured_from_landing_url() {
    let (app, _fixture) = started("/?ref=WOOF42").await;

    assert_eq!(app.storage().pending_referral().unwrap().as_deref(), Some("WOOF42"));
}

#[tokio::test]
async fn onboarding_banner_is_dismissed_once() {
    let (mut app, _fixture) = started("/").await;
    assert!(app.surface().query("complete-onboarding").is_some());

    handle_event(&mut app, &Event::Click("complete-onboarding".into())).await.unwrap();

    assert!(app.storage().onboarding_completed().unwrap());
    assert!(app.surface().query("complete-onboarding").is_none());

    handle_event(&mut app, &Event::Navigate("/?scope=public".into())).await.unwrap();
    assert!(app.surface().query("complete-onboarding").is_none());
}

#[tokio::test]
async fn follow_button_posts_and_refreshes_profile() {
    let (mut app, fixture) = started("/dog/nelli-1").await;

    handle_event(&mut app, &Event::Click("follow".into())).await.unwrap();

    let paths = fixture.transport.paths();
    assert!(paths.contains(&"/dogs/id-nelli-1/follow".to_string()));
    assert_eq!(paths.iter().filter(|p| *p == "/dogs/nelli-1").count(), 2);
}

#[tokio::test]
async fn search_results_are_shown_until_navigation() {
    let (mut app, _fixture) = started("/").await;

    handle_event(&mut app, &Event::Search("  lapphund ".into())).await.unwrap();

    let results = app.search_results().unwrap();
    assert_eq!(results.query, "lapphund");
    assert_eq!(results.dogs[0].slug, "nelli-1");
    assert!(app.document().to_html().contains("search-results"));
    assert_eq!(app.storage().recent_searches().unwrap(), vec!["lapphund".to_string()]);

    handle_event(&mut app, &Event::Navigate("/messages".into())).await.unwrap();
    assert!(app.search_results().is_none());
}

#[tokio::test]
async fn invite_opens_share_overlay() {
    let (mut app, _fixture) = started("/").await;

    handle_event(&mut app, &Event::CreateInvite).await.unwrap();

    assert!(app.overlays().is_open(OverlayKind::InviteShare));
    assert!(app
        .document()
        .to_html()
        .contains("https://pawfeed.example.com/?ref=WOOF42"));
}

#[tokio::test]
async fn restored_session_starts_polling_and_logout_stops_it() {
    let fixture = Fixture::new("/", ScriptedTransport::new(api_fixture));
    let mut app = App::new(&config(), fixture.platform()).unwrap();
    app.storage()
        .save_session(&Session {
            token: "tok".into(),
            user: User {
                id: "u1".into(),
                email: "owner@example.com".into(),
                display_name: None,
            },
        })
        .unwrap();

    handle_event(&mut app, &Event::Start).await.unwrap();
    assert!(app.poller().is_running());
    assert_eq!(fixture.transport.sent()[0].bearer.as_deref(), Some("tok"));

    handle_event(&mut app, &Event::Logout).await.unwrap();

    assert!(!app.poller().is_running());
    assert_eq!(app.poller().count(), 0);
    assert_eq!(app.storage().token().unwrap(), None);
    assert_eq!(app.storage().user().unwrap(), None);
    assert_eq!(fixture.history.location(), "/");
}

#[tokio::test]
async fn clicking_internal_link_navigates() {
    let (mut app, fixture) = started("/").await;
    let before = fixture.history.len();

    assert!(handle_event(&mut app, &Event::Click("/?scope=public".into())).await.unwrap());

    assert_eq!(fixture.history.location(), "/?scope=public");
    assert_eq!(fixture.history.len(), before + 1);
    assert_eq!(app.current_view().await, Some("home"));
}

#[tokio::test]
async fn search_result_link_opens_profile_and_clears_panel() {
    let (mut app, fixture) = started("/").await;
    handle_event(&mut app, &Event::Search("lapphund".into())).await.unwrap();

    handle_event(&mut app, &Event::Click("/dog/nelli-1".into())).await.unwrap();

    assert_eq!(fixture.history.location(), "/dog/nelli-1");
    assert_eq!(app.current_view().await, Some("dog-profile"));
    assert!(app.search_results().is_none());
}

#[tokio::test]
async fn click_outside_links_and_actions_changes_nothing() {
    let (mut app, fixture) = started("/").await;
    let before = fixture.history.len();

    assert!(!handle_event(&mut app, &Event::Click("feed".into())).await.unwrap());
    assert!(!handle_event(&mut app, &Event::Click("no-such-element".into())).await.unwrap());
    assert!(!handle_event(&mut app, &Event::Click("/not/linked".into())).await.unwrap());

    assert_eq!(fixture.history.len(), before);
    assert_eq!(fixture.history.location(), "/");
}

#[tokio::test]
async fn forward_after_back_returns_to_the_page() {
    let (mut app, fixture) = started("/").await;
    handle_event(&mut app, &Event::Navigate("/messages".into())).await.unwrap();

    handle_event(&mut app, &Event::Back).await.unwrap();
    assert_eq!(app.current_view().await, Some("home"));

    handle_event(&mut app, &Event::Forward).await.unwrap();
    assert_eq!(app.current_view().await, Some("messages"));
    assert_eq!(fixture.history.location(), "/messages");
    assert_eq!(fixture.history.len(), 2);
}

#[tokio::test]
async fn navigating_away_closes_overlays_and_back_returns() {
    let (mut app, fixture) = started("/dog/nelli-1").await;
    handle_event(&mut app, &Event::OpenOverlay(OverlayKind::NewPost)).await.unwrap();

    handle_event(&mut app, &Event::Navigate("/messages".into())).await.unwrap();

    assert!(app.overlays().is_empty());
    assert_eq!(app.modal().state(), ModalState::Idle);
    assert_eq!(fixture.history.location(), "/messages");
    assert_eq!(fixture.history.state(), HistoryState::Page);
    assert_eq!(fixture.history.len(), 2);

    handle_event(&mut app, &Event::Back).await.unwrap();

    assert_eq!(fixture.history.location(), "/dog/nelli-1");
    assert_eq!(app.current_view().await, Some("dog-profile"));
    assert!(app.overlays().is_empty());
}

#[tokio::test]
async fn link_click_under_overlay_closes_it_first() {
    let (mut app, fixture) = started("/").await;
    handle_event(&mut app, &Event::Search("lapphund".into())).await.unwrap();
    handle_event(&mut app, &Event::OpenOverlay(OverlayKind::ImageViewer)).await.unwrap();

    handle_event(&mut app, &Event::Click("/dog/nelli-1".into())).await.unwrap();

    assert!(app.overlays().is_empty());
    assert_eq!(fixture.history.len(), 2);

    handle_event(&mut app, &Event::Back).await.unwrap();
    assert_eq!(fixture.history.location(), "/");
    assert_eq!(app.current_view().await, Some("home"));
}

/// Memory store whose onboarding flag can be made unreadable.
#[derive(Default)]
struct FlakyStore {
    inner: MemoryStore,
    failing: AtomicBool,
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        if key == ONBOARDING_KEY && self.failing.load(Ordering::SeqCst) {
            return Err(PawfeedError::Storage("store unavailable".into()));
        }
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.inner.remove(key)
    }
}

#[tokio::test]
async fn failing_traversal_does_not_stop_the_ones_after_it() {
    let history = Arc::new(MemoryHistory::new("/"));
    let store = Arc::new(FlakyStore::default());
    let platform = Platform {
        history: history.clone(),
        store: store.clone(),
        transport: Arc::new(ScriptedTransport::new(api_fixture)),
        identity: Arc::new(UnconfiguredIdentityProvider),
    };
    let mut app = App::new(&config(), platform).unwrap();
    handle_event(&mut app, &Event::Start).await.unwrap();
    handle_event(&mut app, &Event::Navigate("/dog/nelli-1".into())).await.unwrap();
    handle_event(&mut app, &Event::Navigate("/messages".into())).await.unwrap();
    handle_event(&mut app, &Event::Back).await.unwrap();
    assert_eq!(app.current_view().await, Some("dog-profile"));

    // Home cannot mount while the store fails; the forward traversal queued
    // behind it must still be routed.
    store.failing.store(true, Ordering::SeqCst);
    history.back();
    let err = handle_event(&mut app, &Event::Forward).await.unwrap_err();

    assert!(matches!(err, PawfeedError::Storage(_)));
    assert_eq!(history.location(), "/dog/nelli-1");
    assert_eq!(app.current_view().await, Some("dog-profile"));
}
