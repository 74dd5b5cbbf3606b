use super::{load_failed, loading, post_list};
use crate::domain::error::Result;
use crate::domain::Dog;
use crate::features::{DogService, FeedService};
use crate::navigation::Navigation;
use crate::ui::node::{Element, Node};
use crate::ui::view::{MountContext, View};
use async_trait::async_trait;

/// `/dog/:slug`: profile header, follow button and the dog's posts.
pub struct DogProfileView {
    dogs: DogService,
    feed: FeedService,
}

impl DogProfileView {
    #[must_use]
    pub fn new(dogs: DogService, feed: FeedService) -> Self {
        Self { dogs, feed }
    }
}

fn follow_button(dog: &Dog) -> Element {
    let (action, label) = if dog.is_following {
        ("unfollow", "Following")
    } else {
        ("follow", "Follow")
    };
    Element::new("button")
        .id("follow")
        .attr("data-action", action)
        .attr("data-dog-id", dog.id.as_str())
        .text(label)
}

fn profile_header(dog: &Dog) -> Node {
    let mut details = Element::new("dl").class("dog-details");
    if let Some(breed) = &dog.breed {
        details = details
            .child(Element::new("dt").text("Breed"))
            .child(Element::new("dd").text(breed.as_str()));
    }
    if let Some(born) = dog.birth_date {
        details = details
            .child(Element::new("dt").text("Born"))
            .child(Element::new("dd").text(born.to_string()));
    }

    let mut header = Element::new("header").id("dog-header").class("profile");
    if let Some(avatar) = &dog.avatar_url {
        header = header.child(Element::new("img").class("avatar").attr("src", avatar.as_str()).attr("alt", dog.name.as_str()));
    }
    header = header
        .child(Element::new("h1").id("dog-name").text(dog.name.as_str()))
        .child(details)
        .child(
            Element::new("p")
                .class("followers")
                .text(format!("{} followers", dog.followers_count)),
        )
        .child(follow_button(dog));
    if let Some(bio) = &dog.bio {
        header = header.child(Element::new("p").class("bio").text(bio.as_str()));
    }
    header.into()
}

#[async_trait]
impl View for DogProfileView {
    fn name(&self) -> &'static str {
        "dog-profile"
    }

    fn render(&self, _navigation: &Navigation) -> Node {
        Element::new("main")
            .id("dog-profile")
            .child(loading("dog-header"))
            .child(loading("dog-posts"))
            .into()
    }

    async fn mount(&mut self, ctx: MountContext) -> Result<()> {
        let slug = ctx.navigation.params.get("slug").cloned().unwrap_or_default();

        let Ok(dog) = self.dogs.dog(&slug).await else {
            ctx.surface.patch_if_live(&ctx.token, "dog-header", load_failed("dog-header"));
            ctx.surface.patch_if_live(&ctx.token, "dog-posts", Element::new("div").id("dog-posts").into());
            return Ok(());
        };
        if !ctx.surface.patch_if_live(&ctx.token, "dog-header", profile_header(&dog)) {
            return Ok(());
        }

        let posts = match self.feed.dog_posts(&dog.id).await {
            Ok(posts) => post_list("dog-posts", &posts, &format!("{} has not posted yet.", dog.name)),
            Err(_) => load_failed("dog-posts"),
        };
        ctx.surface.patch_if_live(&ctx.token, "dog-posts", posts);
        Ok(())
    }
}
