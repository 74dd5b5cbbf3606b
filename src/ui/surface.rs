//! Root container the current view renders into.
//!
//! [`Surface`] is a cheap, cloneable handle. The view manager replaces its
//! content on every navigation; views keep a clone to patch regions after
//! asynchronous loads, guarded by their [`ViewToken`](super::view::ViewToken).

use super::node::{Element, Node};
use super::view::ViewToken;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug)]
struct Inner {
    root: Node,
    scroll_top: u32,
}

/// Shared handle to the attached UI tree.
#[derive(Debug, Clone)]
pub struct Surface {
    inner: Arc<Mutex<Inner>>,
}

impl Default for Surface {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface {
    /// Creates an empty `<div id="app">` container.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                root: Element::new("div").id("app").into(),
                scroll_top: 0,
            })),
        }
    }

    /// Replaces the whole content.
    pub fn replace(&self, root: Node) {
        self.lock().root = root;
    }

    /// Replaces the element with `id`. Returns whether it was attached.
    pub fn patch(&self, id: &str, node: Node) -> bool {
        self.lock().root.replace_by_id(id, node)
    }

    /// Patches only while `token` is live; writes from torn-down views are dropped.
    pub fn patch_if_live(&self, token: &ViewToken, id: &str, node: Node) -> bool {
        if !token.is_live() {
            tracing::debug!(id, "dropping write from unmounted view");
            return false;
        }
        self.patch(id, node)
    }

    /// Clone of the attached element with `id`.
    #[must_use]
    pub fn query(&self, id: &str) -> Option<Element> {
        self.lock().root.find_by_id(id).cloned()
    }

    /// Text content of the element with `id`.
    #[must_use]
    pub fn text_of(&self, id: &str) -> Option<String> {
        self.lock()
            .root
            .find_by_id(id)
            .map(|element| Node::Element(element.clone()).text_content())
    }

    #[must_use]
    pub fn snapshot(&self) -> Node {
        self.lock().root.clone()
    }

    #[must_use]
    pub fn to_html(&self) -> String {
        self.lock().root.to_html()
    }

    #[must_use]
    pub fn scroll_top(&self) -> u32 {
        self.lock().scroll_top
    }

    pub fn scroll_to(&self, offset: u32) {
        self.lock().scroll_top = offset;
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
