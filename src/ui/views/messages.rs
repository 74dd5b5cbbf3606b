use super::{empty_state, load_failed, loading};
use crate::domain::error::Result;
use crate::domain::{Conversation, Message};
use crate::features::MessageService;
use crate::navigation::Navigation;
use crate::ui::node::{link, Element, Node};
use crate::ui::view::{MountContext, View};
use async_trait::async_trait;

/// `/messages`: conversation list.
pub struct MessagesView {
    messages: MessageService,
}

impl MessagesView {
    #[must_use]
    pub fn new(messages: MessageService) -> Self {
        Self { messages }
    }
}

fn conversation_item(conversation: &Conversation) -> Element {
    let mut item = Element::new("li")
        .class("conversation")
        .child(link(
            format!("/messages/{}", conversation.id),
            conversation.participant_name.as_str(),
        ));
    if let Some(last) = &conversation.last_message {
        item = item.child(Element::new("p").class("preview").text(last.as_str()));
    }
    if conversation.unread_count > 0 {
        item = item
            .class("unread")
            .child(Element::new("span").class("badge").text(conversation.unread_count.to_string()));
    }
    item
}

#[async_trait]
impl View for MessagesView {
    fn name(&self) -> &'static str {
        "messages"
    }

    fn render(&self, _navigation: &Navigation) -> Node {
        Element::new("main")
            .id("messages")
            .child(Element::new("h1").text("Messages"))
            .child(loading("conversations"))
            .into()
    }

    async fn mount(&mut self, ctx: MountContext) -> Result<()> {
        let region = match self.messages.conversations().await {
            Ok(list) if list.is_empty() => empty_state("conversations", "No conversations yet."),
            Ok(list) => Element::new("ul")
                .id("conversations")
                .children(list.iter().map(conversation_item))
                .into(),
            Err(_) => load_failed("conversations"),
        };
        ctx.surface.patch_if_live(&ctx.token, "conversations", region);
        Ok(())
    }
}

/// `/messages/:id`: one conversation thread with a reply form.
pub struct ConversationView {
    messages: MessageService,
}

impl ConversationView {
    #[must_use]
    pub fn new(messages: MessageService) -> Self {
        Self { messages }
    }
}

fn message_item(message: &Message) -> Element {
    Element::new("li")
        .class("message")
        .attr("data-sender", message.sender_id.as_str())
        .child(Element::new("p").text(message.body.as_str()))
        .child(
            Element::new("time")
                .attr("datetime", message.sent_at.to_rfc3339())
                .text(message.sent_at.format("%H:%M").to_string()),
        )
}

#[async_trait]
impl View for ConversationView {
    fn name(&self) -> &'static str {
        "conversation"
    }

    fn render(&self, navigation: &Navigation) -> Node {
        let id = navigation.params.get("id").map_or("", String::as_str);
        Element::new("main")
            .id("conversation")
            .attr("data-conversation-id", id)
            .child(link("/messages", "← All messages"))
            .child(loading("thread"))
            .child(
                Element::new("form")
                    .id("reply")
                    .child(Element::new("textarea").attr("name", "body").attr("maxlength", "1000"))
                    .child(Element::new("button").attr("type", "submit").text("Send")),
            )
            .into()
    }

    async fn mount(&mut self, ctx: MountContext) -> Result<()> {
        let id = ctx.navigation.params.get("id").cloned().unwrap_or_default();
        let region = match self.messages.thread(&id).await {
            Ok(thread) if thread.is_empty() => empty_state("thread", "Say hello!"),
            Ok(thread) => Element::new("ol")
                .id("thread")
                .children(thread.iter().map(message_item))
                .into(),
            Err(_) => {
                ctx.surface.patch_if_live(&ctx.token, "thread", load_failed("thread"));
                return Ok(());
            }
        };

        if ctx.surface.patch_if_live(&ctx.token, "thread", region) {
            if let Err(e) = self.messages.mark_read(&id).await {
                tracing::debug!(conversation_id = %id, error = %e, "mark read failed");
            }
        }
        Ok(())
    }
}
