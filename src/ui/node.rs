//! Virtual UI tree.
//!
//! Views describe their markup as a [`Node`] tree instead of writing HTML
//! strings. The tree can be queried by `id`, patched in place, and serialized
//! to escaped HTML for a DOM adapter or the headless shell.
//!
//! # Example
//!
//! ```
//! use pawfeed::ui::node::{link, Element, Node};
//!
//! let page: Node = Element::new("main")
//!     .id("home")
//!     .child(Element::new("h1").text("Feed"))
//!     .child(link("/dog/rex", "Rex"))
//!     .into();
//!
//! assert_eq!(page.find_by_id("home").unwrap().tag, "main");
//! assert_eq!(
//!     page.to_html(),
//!     r#"<main id="home"><h1>Feed</h1><a data-link="" href="/dog/rex">Rex</a></main>"#
//! );
//! ```

use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Marker attribute identifying anchors the router should intercept.
pub const LINK_ATTR: &str = "data-link";

/// A node in the virtual tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An element with attributes and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attrs: BTreeMap<String, String>,
    pub children: Vec<Node>,
}

impl Element {
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn id(self, id: impl Into<String>) -> Self {
        self.attr("id", id)
    }

    /// Adds a class, keeping any already set.
    #[must_use]
    pub fn class(mut self, class: impl Into<String>) -> Self {
        let class = class.into();
        self.attrs
            .entry("class".to_string())
            .and_modify(|existing| {
                existing.push(' ');
                existing.push_str(&class);
            })
            .or_insert_with(|| class.clone());
        self
    }

    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    #[must_use]
    pub fn children<I, N>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<Node>,
    {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }

    /// Appends a text child.
    #[must_use]
    pub fn text(self, text: impl Into<String>) -> Self {
        self.child(Node::Text(text.into()))
    }

    #[must_use]
    pub fn attr_value(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.contains_key(name)
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Self::Element(element)
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Node {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl Node {
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Depth-first search for the element with `id`.
    #[must_use]
    pub fn find_by_id(&self, id: &str) -> Option<&Element> {
        match self {
            Self::Text(_) => None,
            Self::Element(element) => {
                if element.attr_value("id") == Some(id) {
                    return Some(element);
                }
                element.children.iter().find_map(|child| child.find_by_id(id))
            }
        }
    }

    /// Elements from this node down to the first element matching `target`,
    /// outermost first. Empty when nothing matches.
    ///
    /// Click delegation walks this chain backwards the way a DOM listener
    /// walks `closest()`.
    #[must_use]
    pub fn path_to(&self, target: impl Fn(&Element) -> bool + Copy) -> Vec<&Element> {
        let mut chain = Vec::new();
        if self.collect_path(target, &mut chain) {
            chain
        } else {
            Vec::new()
        }
    }

    fn collect_path<'a>(
        &'a self,
        target: impl Fn(&Element) -> bool + Copy,
        chain: &mut Vec<&'a Element>,
    ) -> bool {
        let Self::Element(element) = self else {
            return false;
        };
        chain.push(element);
        if target(element)
            || element
                .children
                .iter()
                .any(|child| child.collect_path(target, chain))
        {
            return true;
        }
        chain.pop();
        false
    }

    /// Replaces the element with `id` by `replacement`. Returns whether it was found.
    pub fn replace_by_id(&mut self, id: &str, replacement: Node) -> bool {
        let Self::Element(element) = self else {
            return false;
        };

        if element.attr_value("id") == Some(id) {
            *self = replacement;
            return true;
        }

        let mut replacement = Some(replacement);
        for child in &mut element.children {
            if child.find_by_id(id).is_some() {
                return replacement
                    .take()
                    .is_some_and(|node| child.replace_by_id(id, node));
            }
        }
        false
    }

    /// Concatenated text of this subtree.
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Self::Text(text) => out.push_str(text),
            Self::Element(element) => {
                for child in &element.children {
                    child.collect_text(out);
                }
            }
        }
    }

    /// Serializes the subtree to HTML, escaping text and attribute values.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        match self {
            Self::Text(text) => out.push_str(&escape(text)),
            Self::Element(element) => {
                let _ = write!(out, "<{}", element.tag);
                for (name, value) in &element.attrs {
                    let _ = write!(out, " {name}=\"{}\"", escape(value));
                }
                out.push('>');
                for child in &element.children {
                    child.write_html(out);
                }
                let _ = write!(out, "</{}>", element.tag);
            }
        }
    }
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// An internal link: an anchor carrying [`LINK_ATTR`].
#[must_use]
pub fn link(href: impl Into<String>, label: impl Into<String>) -> Element {
    Element::new("a")
        .attr("href", href)
        .attr(LINK_ATTR, "")
        .text(label)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> Node {
        Element::new("div")
            .id("root")
            .child(Element::new("section").id("feed").text("loading"))
            .child(Element::new("aside").id("sidebar"))
            .into()
    }

    #[test]
    fn replace_by_id_swaps_nested_subtree() {
        let mut root = page();
        let replaced = root.replace_by_id("feed", Element::new("section").id("feed").text("3 posts").into());

        assert!(replaced);
        assert_eq!(root.find_by_id("feed").unwrap().children, vec![Node::text("3 posts")]);
        assert!(root.find_by_id("sidebar").is_some());
    }

    #[test]
    fn replace_by_id_reports_missing_target() {
        let mut root = page();
        assert!(!root.replace_by_id("nope", Node::text("x")));
        assert_eq!(root, page());
    }

    #[test]
    fn html_escapes_text_and_attributes() {
        let node: Node = Element::new("p")
            .attr("title", "\"Rex\" & co")
            .text("<b>woof</b>")
            .into();
        assert_eq!(
            node.to_html(),
            "<p title=\"&quot;Rex&quot; &amp; co\">&lt;b&gt;woof&lt;/b&gt;</p>"
        );
    }

    #[test]
    fn path_to_lists_ancestors_outermost_first() {
        let root: Node = Element::new("main")
            .id("root")
            .child(Element::new("aside").id("sidebar"))
            .child(link("/dog/rex", "").child(Element::new("span").id("badge").text("Rex")))
            .into();

        let chain = root.path_to(|e| e.attr_value("id") == Some("badge"));
        let tags: Vec<&str> = chain.iter().map(|e| e.tag.as_str()).collect();
        assert_eq!(tags, vec!["main", "a", "span"]);

        assert!(root.path_to(|e| e.attr_value("id") == Some("nope")).is_empty());
    }

    #[test]
    fn text_content_flattens_children() {
        assert_eq!(page().text_content(), "loading");
    }
}
