//! Page-level views.
//!
//! Each view renders a skeleton with `id`'d regions synchronously, then fills
//! those regions from the API during `mount`. Writes go through
//! [`Surface::patch_if_live`](super::Surface::patch_if_live) so a load that
//! finishes after navigation never touches the next page.
//!
//! Load failures have already been toasted by the feature service; views only
//! swap the region for an error note.

mod dog;
mod home;
mod messages;
mod post;

pub use dog::DogProfileView;
pub use home::HomeView;
pub use messages::{ConversationView, MessagesView};
pub use post::PostView;

use super::node::{link, Element, Node};
use crate::domain::Post;

/// Placeholder shown while a region loads.
fn loading(id: &str) -> Element {
    Element::new("div").id(id).class("loading").text("Loading…")
}

/// Replacement for a region whose load failed.
fn load_failed(id: &str) -> Node {
    Element::new("div")
        .id(id)
        .class("error-state")
        .text("Something went wrong. Try again later.")
        .into()
}

fn empty_state(id: &str, message: &str) -> Node {
    Element::new("div").id(id).class("empty-state").text(message).into()
}

fn post_card(post: &Post) -> Element {
    let author = match (&post.dog_slug, &post.dog_name) {
        (Some(slug), Some(name)) => Node::from(link(format!("/dog/{slug}"), name.as_str())),
        (_, Some(name)) => Node::text(name.as_str()),
        _ => Node::text("Unknown dog"),
    };

    let mut card = Element::new("article")
        .class("post")
        .attr("data-post-id", post.id.as_str())
        .child(Element::new("header").child(author))
        .child(Element::new("p").class("post-content").text(post.content.as_str()));

    if let Some(image) = &post.image_url {
        card = card.child(Element::new("img").attr("src", image.as_str()).attr("alt", ""));
    }

    card.child(
        Element::new("footer")
            .child(link(format!("/post/{}", post.id), post.created_at.format("%Y-%m-%d %H:%M").to_string()))
            .child(Element::new("span").class("likes").text(format!("♥ {}", post.like_count))),
    )
}

fn post_list(id: &str, posts: &[Post], empty: &str) -> Node {
    if posts.is_empty() {
        return empty_state(id, empty);
    }
    Element::new("section")
        .id(id)
        .class("post-list")
        .children(posts.iter().map(post_card))
        .into()
}
