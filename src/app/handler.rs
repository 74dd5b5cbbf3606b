//! Event dispatch.
//!
//! The host (browser glue, the shell, tests) turns user input into [`Event`]s
//! and feeds them to [`handle_event`] one at a time. After every event the
//! handler drains history traversals the event caused, routing each through
//! [`Router::handle_pop_state`](crate::navigation::Router::handle_pop_state)
//! and letting overlays react to "close all" broadcasts. Anything that
//! changes the page first closes open overlays, so no synthetic entry is left
//! behind the new page.
//!
//! # Event Types
//!
//! - **Navigation**: `Start`, `Navigate`, `Click`, `Back`, `Forward`
//! - **Overlays**: `OpenOverlay`, `CloseOverlay`
//! - **Session**: `Login`, `Logout`, `CompleteOnboarding`
//! - **Features**: `Search`, `Follow`, `Unfollow`, `SendMessage`, `CreateInvite`
//!
//! # Example
//!
//! ```
//! use pawfeed::app::Event;
//! use pawfeed::ui::OverlayKind;
//!
//! let event: Event = "open new-post".parse()?;
//! assert_eq!(event, Event::OpenOverlay(OverlayKind::NewPost));
//!
//! let event: Event = "send c1 see you at the park".parse()?;
//! assert_eq!(
//!     event,
//!     Event::SendMessage { conversation_id: "c1".into(), body: "see you at the park".into() }
//! );
//! # Ok::<(), pawfeed::PawfeedError>(())
//! ```

use super::state::{App, SearchResults};
use crate::domain::error::{PawfeedError, Result};
use crate::navigation::Router;
use crate::ui::node::{Element, Node, LINK_ATTR};
use crate::ui::{Overlay, OverlayKind};
use std::str::FromStr;
use tracing::Instrument;

/// Something the user or the platform did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Restores the session and resolves the initial location.
    Start,
    /// Programmatic navigation to a location (path plus optional query).
    Navigate(String),
    /// Click on an element of the document.
    ///
    /// The target is an element `id`, or the href of an internal link when it
    /// starts with `/`. The click then bubbles like a DOM click: an enclosing
    /// internal link navigates, otherwise the nearest `data-action` runs.
    Click(String),
    /// Browser back button.
    Back,
    /// Browser forward button.
    Forward,
    OpenOverlay(OverlayKind),
    /// Close button of the topmost overlay.
    CloseOverlay,
    Login { email: String, password: String },
    Logout,
    Search(String),
    Follow(String),
    Unfollow(String),
    SendMessage { conversation_id: String, body: String },
    CompleteOnboarding,
    CreateInvite,
}

impl Event {
    const fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Navigate(_) => "navigate",
            Self::Click(_) => "click",
            Self::Back => "back",
            Self::Forward => "forward",
            Self::OpenOverlay(_) => "open_overlay",
            Self::CloseOverlay => "close_overlay",
            Self::Login { .. } => "login",
            Self::Logout => "logout",
            Self::Search(_) => "search",
            Self::Follow(_) => "follow",
            Self::Unfollow(_) => "unfollow",
            Self::SendMessage { .. } => "send_message",
            Self::CompleteOnboarding => "complete_onboarding",
            Self::CreateInvite => "create_invite",
        }
    }
}

fn missing(what: &str) -> PawfeedError {
    PawfeedError::Validation(format!("missing {what}"))
}

impl FromStr for Event {
    type Err = PawfeedError;

    /// Parses a shell command line such as `go /dog/nelli-1` or `login a@b.fi secret`.
    fn from_str(line: &str) -> Result<Self> {
        let line = line.trim();
        let (command, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        let arg = || Some(rest.to_string()).filter(|r| !r.is_empty());

        match command {
            "start" => Ok(Self::Start),
            "go" | "navigate" => arg().map(Self::Navigate).ok_or_else(|| missing("location")),
            "click" => arg().map(Self::Click).ok_or_else(|| missing("element id or link")),
            "back" => Ok(Self::Back),
            "forward" => Ok(Self::Forward),
            "open" => {
                let name = arg().ok_or_else(|| missing("overlay name"))?;
                OverlayKind::parse(&name)
                    .map(Self::OpenOverlay)
                    .ok_or_else(|| PawfeedError::Validation(format!("unknown overlay {name:?}")))
            }
            "close" => Ok(Self::CloseOverlay),
            "login" => {
                let mut parts = rest.split_whitespace();
                let email = parts.next().ok_or_else(|| missing("email"))?.to_string();
                let password = parts.next().ok_or_else(|| missing("password"))?.to_string();
                Ok(Self::Login { email, password })
            }
            "logout" => Ok(Self::Logout),
            "search" => arg().map(Self::Search).ok_or_else(|| missing("query")),
            "follow" => arg().map(Self::Follow).ok_or_else(|| missing("dog id")),
            "unfollow" => arg().map(Self::Unfollow).ok_or_else(|| missing("dog id")),
            "send" => {
                let (conversation_id, body) = rest
                    .split_once(char::is_whitespace)
                    .ok_or_else(|| missing("conversation id and message"))?;
                Ok(Self::SendMessage {
                    conversation_id: conversation_id.to_string(),
                    body: body.trim().to_string(),
                })
            }
            "onboarded" => Ok(Self::CompleteOnboarding),
            "invite" => Ok(Self::CreateInvite),
            "" => Err(missing("command")),
            other => Err(PawfeedError::Validation(format!("unknown command {other:?}"))),
        }
    }
}

/// Default content for overlays opened directly by the user.
fn overlay_content(kind: OverlayKind) -> Node {
    let form = |id: &str, fields: &[(&str, &str)]| -> Node {
        Element::new("form")
            .id(id)
            .children(fields.iter().map(|(name, input_type)| {
                Element::new("input").attr("name", *name).attr("type", *input_type)
            }))
            .child(Element::new("button").attr("type", "submit").text("Save"))
            .child(Element::new("button").attr("data-action", "close").text("Cancel"))
            .into()
    };

    match kind {
        OverlayKind::NewPost => form("new-post-form", &[("content", "text"), ("image", "file")]),
        OverlayKind::NewDog => form(
            "new-dog-form",
            &[("name", "text"), ("breed", "text"), ("birth_date", "date")],
        ),
        OverlayKind::HealthRecord => form(
            "health-record-form",
            &[("title", "text"), ("date", "date"), ("next_due", "date")],
        ),
        OverlayKind::InviteShare => Element::new("p").text("Create an invite to get a link").into(),
        OverlayKind::ImageViewer => Element::new("figure").class("image-viewer").into(),
    }
}

/// Re-resolves the current location so the page reflects a change.
async fn refresh(app: &App) -> Result<()> {
    let location = app.history.location();
    app.router.resolve(&location).await
}

/// Routes every queued back/forward traversal, applying overlay closes after
/// each one. A failing route does not stop the drain; the first error is
/// returned once the queue is empty.
async fn drain_pop_events(app: &mut App) -> Result<()> {
    let mut first_error = None;
    while let Some(event) = app.history.next_pop_event() {
        tracing::debug!(location = %event.location, state = ?event.state, "popstate");
        if let Err(e) = app.router.handle_pop_state(&event.location).await {
            tracing::warn!(error = %e, location = %event.location, "popstate route failed");
            first_error.get_or_insert(e);
        }
        let closed = app.overlays.sync();
        if closed > 0 {
            tracing::debug!(closed, "overlays closed by browser back");
        }
    }
    first_error.map_or(Ok(()), Err)
}

/// Closes open overlays before the page changes and settles the history
/// entry they held, so the next push lands on the page entry.
async fn leave_overlays(app: &mut App) -> Result<()> {
    if app.overlays.is_empty() {
        return Ok(());
    }
    let closed = app.overlays.close_all();
    tracing::debug!(closed, "overlays closed by navigation");
    drain_pop_events(app).await
}

/// Ancestry of the clicked element, outermost first. Empty when the target
/// is not in the document.
fn click_chain<'a>(document: &'a Node, target: &str) -> Vec<&'a Element> {
    if target.starts_with('/') {
        document.path_to(|e| e.tag == "a" && e.has_attr(LINK_ATTR) && e.attr_value("href") == Some(target))
    } else {
        document.path_to(|e| e.attr_value("id") == Some(target))
    }
}

/// Runs the `data-action` of a clicked element.
async fn run_action(app: &mut App, element: &Element) -> Result<bool> {
    let Some(action) = element.attr_value("data-action") else {
        return Ok(false);
    };
    let dog_id = element.attr_value("data-dog-id").map(str::to_string);

    match (action, dog_id) {
        ("follow", Some(dog_id)) => {
            app.services.dogs.follow(&dog_id).await?;
            refresh(app).await?;
        }
        ("unfollow", Some(dog_id)) => {
            app.services.dogs.unfollow(&dog_id).await?;
            refresh(app).await?;
        }
        ("complete-onboarding", _) => complete_onboarding(app)?,
        ("close", _) => {
            app.overlays.close_top();
        }
        (other, _) => {
            tracing::debug!(action = other, "unhandled action");
            return Ok(false);
        }
    }
    Ok(true)
}

fn complete_onboarding(app: &App) -> Result<()> {
    app.storage.complete_onboarding()?;
    app.surface.patch("onboarding", Element::new("div").id("onboarding").into());
    Ok(())
}

/// Processes one event. Returns whether the document changed and should be
/// shown again.
///
/// # Errors
///
/// Route handler, storage and feature-service errors propagate. Expected
/// failures have already been shown as a toast by then; the host only logs.
///
/// # Tracing
///
/// Each call runs inside a debug-level span with the event type.
pub async fn handle_event(app: &mut App, event: &Event) -> Result<bool> {
    let span = tracing::debug_span!("handle_event", event_type = event.name());
    async {
        let dispatched = dispatch(app, event).await;
        let drained = drain_pop_events(app).await;
        app.sync_auth();
        let changed = dispatched?;
        drained?;
        Ok(changed)
    }
    .instrument(span)
    .await
}

#[allow(clippy::too_many_lines)]
async fn dispatch(app: &mut App, event: &Event) -> Result<bool> {
    match event {
        Event::Start => {
            app.services.auth.restore()?;
            app.sync_auth();
            app.router.start().await?;
            Ok(true)
        }
        Event::Navigate(location) => {
            leave_overlays(app).await?;
            app.search = None;
            app.router.navigate(location).await?;
            Ok(true)
        }
        Event::Click(target) => {
            let document = app.document();
            let chain = click_chain(&document, target);
            if chain.is_empty() {
                tracing::debug!(click = %target, "click target not found");
                return Ok(false);
            }
            if Router::intercept_click(&chain).is_some() {
                leave_overlays(app).await?;
                app.search = None;
                return app.router.handle_click(&chain).await;
            }
            match chain.iter().rev().find(|e| e.has_attr("data-action")) {
                Some(element) => run_action(app, element).await,
                None => Ok(false),
            }
        }
        Event::Back => {
            app.history.back();
            Ok(true)
        }
        Event::Forward => {
            app.history.forward();
            Ok(true)
        }
        Event::OpenOverlay(kind) => {
            app.overlays.open(Overlay::new(*kind, overlay_content(*kind)));
            Ok(true)
        }
        Event::CloseOverlay => Ok(app.overlays.close_top().is_some()),
        Event::Login { email, password } => {
            app.services.auth.login(email, password).await?;
            app.toasts.success("Welcome back!");
            refresh(app).await?;
            Ok(true)
        }
        Event::Logout => {
            app.services.auth.logout()?;
            leave_overlays(app).await?;
            app.router.navigate("/").await?;
            Ok(true)
        }
        Event::Search(query) => {
            let dogs = app.services.search.search(query).await?;
            app.search = Some(SearchResults {
                query: query.trim().to_string(),
                dogs,
            });
            Ok(true)
        }
        Event::Follow(dog_id) => {
            app.services.dogs.follow(dog_id).await?;
            refresh(app).await?;
            Ok(true)
        }
        Event::Unfollow(dog_id) => {
            app.services.dogs.unfollow(dog_id).await?;
            refresh(app).await?;
            Ok(true)
        }
        Event::SendMessage { conversation_id, body } => {
            app.services.messages.send(conversation_id, body).await?;
            if app.history.location() == format!("/messages/{conversation_id}") {
                refresh(app).await?;
            }
            Ok(true)
        }
        Event::CompleteOnboarding => {
            complete_onboarding(app)?;
            Ok(true)
        }
        Event::CreateInvite => {
            let invite = app.services.invite.create_invite().await?;
            let url = app.services.invite.share_url(&invite.code);
            let content = Element::new("div")
                .id("invite-share")
                .child(Element::new("p").text("Share this link with a friend:"))
                .child(Element::new("input").id("invite-url").attr("readonly", "").attr("value", url));
            app.overlays.open(Overlay::new(OverlayKind::InviteShare, content));
            Ok(true)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_parse_into_events() {
        assert_eq!("go /dog/nelli-1".parse::<Event>().unwrap(), Event::Navigate("/dog/nelli-1".into()));
        assert_eq!("  back ".parse::<Event>().unwrap(), Event::Back);
        assert_eq!(
            "login owner@example.com hunter22".parse::<Event>().unwrap(),
            Event::Login {
                email: "owner@example.com".into(),
                password: "hunter22".into()
            }
        );
        assert_eq!("search golden retriever".parse::<Event>().unwrap(), Event::Search("golden retriever".into()));
        assert_eq!("click /dog/rex".parse::<Event>().unwrap(), Event::Click("/dog/rex".into()));
    }

    #[test]
    fn click_targets_resolve_by_id_or_link_href() {
        let document: Node = Element::new("body")
            .child(Element::new("button").id("follow").attr("data-action", "follow"))
            .child(crate::ui::node::link("/dog/rex", "Rex"))
            .into();

        let by_id = click_chain(&document, "follow");
        assert_eq!(by_id.last().map(|e| e.tag.as_str()), Some("button"));

        let by_href = click_chain(&document, "/dog/rex");
        assert_eq!(Router::intercept_click(&by_href), Some("/dog/rex"));

        assert!(click_chain(&document, "/dog/nope").is_empty());
        assert!(click_chain(&document, "missing").is_empty());
    }

    #[test]
    fn malformed_commands_are_rejected() {
        assert!("go".parse::<Event>().is_err());
        assert!("click".parse::<Event>().is_err());
        assert!("open sidebar".parse::<Event>().is_err());
        assert!("send c1".parse::<Event>().is_err());
        assert!("dance".parse::<Event>().is_err());
        assert!("".parse::<Event>().is_err());
    }
}
