use super::{load_failed, loading, post_list};
use crate::domain::error::Result;
use crate::domain::FeedScope;
use crate::features::FeedService;
use crate::navigation::Navigation;
use crate::storage::ClientStorage;
use crate::ui::node::{link, Element, Node};
use crate::ui::view::{MountContext, View};
use async_trait::async_trait;
use std::sync::Arc;

/// `/`: onboarding banner and the feed.
///
/// `?scope=public` switches to the public feed.
pub struct HomeView {
    feed: FeedService,
    storage: Arc<ClientStorage>,
}

impl HomeView {
    #[must_use]
    pub fn new(feed: FeedService, storage: Arc<ClientStorage>) -> Self {
        Self { feed, storage }
    }

    fn scope(navigation: &Navigation) -> FeedScope {
        match navigation.query.get("scope").map(String::as_str) {
            Some("public") => FeedScope::Public,
            _ => FeedScope::Following,
        }
    }
}

fn onboarding_banner() -> Node {
    Element::new("aside")
        .id("onboarding")
        .class("banner")
        .child(Element::new("p").text("Welcome to pawfeed! Add your dog to start posting."))
        .child(
            Element::new("button")
                .id("complete-onboarding")
                .attr("data-action", "complete-onboarding")
                .text("Got it"),
        )
        .into()
}

#[async_trait]
impl View for HomeView {
    fn name(&self) -> &'static str {
        "home"
    }

    fn render(&self, navigation: &Navigation) -> Node {
        let scope = Self::scope(navigation);
        Element::new("main")
            .id("home")
            .child(Element::new("div").id("onboarding"))
            .child(
                Element::new("nav")
                    .class("feed-tabs")
                    .attr("data-scope", scope.as_str())
                    .child(link("/", "Following"))
                    .child(link("/?scope=public", "Everyone")),
            )
            .child(loading("feed"))
            .into()
    }

    async fn mount(&mut self, ctx: MountContext) -> Result<()> {
        if !self.storage.onboarding_completed()? {
            ctx.surface.patch_if_live(&ctx.token, "onboarding", onboarding_banner());
        }

        let scope = Self::scope(&ctx.navigation);
        let region = match self.feed.feed(scope, None).await {
            Ok(page) => post_list("feed", &page.posts, "No posts yet. Follow some dogs!"),
            Err(_) => load_failed("feed"),
        };
        ctx.surface.patch_if_live(&ctx.token, "feed", region);
        Ok(())
    }
}
