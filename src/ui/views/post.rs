use super::{load_failed, loading, post_card};
use crate::domain::error::Result;
use crate::features::FeedService;
use crate::navigation::Navigation;
use crate::ui::node::{link, Element, Node};
use crate::ui::view::{MountContext, View};
use async_trait::async_trait;

/// `/post/:id`: a single post.
pub struct PostView {
    feed: FeedService,
}

impl PostView {
    #[must_use]
    pub fn new(feed: FeedService) -> Self {
        Self { feed }
    }
}

#[async_trait]
impl View for PostView {
    fn name(&self) -> &'static str {
        "post"
    }

    fn render(&self, _navigation: &Navigation) -> Node {
        Element::new("main")
            .id("post-page")
            .child(link("/", "← Back to feed"))
            .child(loading("post"))
            .into()
    }

    async fn mount(&mut self, ctx: MountContext) -> Result<()> {
        let id = ctx.navigation.params.get("id").cloned().unwrap_or_default();
        let region = match self.feed.post(&id).await {
            Ok(post) => post_card(&post).id("post").into(),
            Err(_) => load_failed("post"),
        };
        ctx.surface.patch_if_live(&ctx.token, "post", region);
        Ok(())
    }
}
