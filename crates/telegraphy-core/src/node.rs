//! Content node tree.
//!
//! A document body is a [`Forest`]: an ordered list of top-level nodes mixing
//! text and elements. Nodes are plain owned values, so a tree has no parent
//! pointers and can never contain a cycle.
//!
//! Construction never validates. Parsers build trees bottom-up and check each
//! element as they go; programmatic callers build with the helpers below and
//! run [`crate::validate`] once the tree is complete.

use indexmap::IndexMap;

/// Attribute mapping of an element.
///
/// Keeps insertion order for deterministic output, while equality ignores
/// order.
pub type Attrs = IndexMap<String, String>;

/// A document body: the ordered top-level nodes.
pub type Forest = Vec<Node>;

/// A node of the content tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Text content, no markup semantics
    Text(String),
    /// Element with tag, attributes and children
    Element(Element),
}

/// An element node
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attrs: Attrs,
    pub children: Vec<Node>,
}

impl Node {
    /// Create a new text node
    pub fn text(content: impl Into<String>) -> Self {
        Node::Text(content.into())
    }

    /// Create a new element node without attributes or children
    pub fn element(tag: impl Into<String>) -> Self {
        Node::Element(Element::new(tag))
    }

    /// Create a new element node from all of its parts
    pub fn element_with<I, K, V>(tag: impl Into<String>, attrs: I, children: Vec<Node>) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Node::Element(Element {
            tag: tag.into(),
            attrs: attrs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            children,
        })
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Node::Text(_))
    }

    pub fn is_element(&self) -> bool {
        matches!(self, Node::Element(_))
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Text(text) => Some(text),
            Node::Element(_) => None,
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        }
    }

    /// Tag name for elements, `None` for text
    pub fn tag(&self) -> Option<&str> {
        self.as_element().map(|e| e.tag.as_str())
    }

    /// Iterate over this node and all of its descendants, depth-first, pre-order.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// Get all text content from this node and descendants
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for node in self.descendants() {
            if let Node::Text(text) = node {
                out.push_str(text);
            }
        }
        out
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Node::Text(text.to_string())
    }
}

impl From<String> for Node {
    fn from(text: String) -> Self {
        Node::Text(text)
    }
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Attrs::new(),
            children: Vec::new(),
        }
    }

    /// Builder form of [`Element::set_attr`]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Builder form of [`Element::add_child`]
    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.add_child(child);
        self
    }

    /// Add a child node
    pub fn add_child(&mut self, child: impl Into<Node>) -> &mut Self {
        self.children.push(child.into());
        self
    }

    /// Set an attribute, replacing any previous value
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    /// Remove an attribute, returning its value
    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        self.attrs.shift_remove(name)
    }

    /// Get an attribute value by name
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }
}

/// Iterate over a whole forest, depth-first, pre-order.
pub fn descendants(nodes: &[Node]) -> Descendants<'_> {
    Descendants {
        stack: nodes.iter().rev().collect(),
    }
}

/// Pre-order iterator over a node tree.
///
/// Uses an explicit stack, so arbitrarily deep trees do not grow the call
/// stack.
#[derive(Debug, Clone)]
pub struct Descendants<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        if let Node::Element(element) = node {
            self.stack.extend(element.children.iter().rev());
        }
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_element() {
        let node = Node::element("p");
        assert!(node.is_element());
        assert_eq!(node.tag(), Some("p"));
        assert!(node.as_element().unwrap().children.is_empty());
    }

    #[test]
    fn test_create_text() {
        let node = Node::text("Hello World");
        assert!(node.is_text());
        assert_eq!(node.as_text(), Some("Hello World"));
        assert_eq!(node.tag(), None);
    }

    #[test]
    fn test_attributes() {
        let mut a = Element::new("a").with_attr("href", "https://example.com");
        assert_eq!(a.attr("href"), Some("https://example.com"));
        assert_eq!(a.attr("src"), None);

        a.set_attr("href", "/other");
        assert_eq!(a.attr("href"), Some("/other"));
        assert_eq!(a.attrs.len(), 1);

        assert_eq!(a.remove_attr("href"), Some("/other".to_string()));
        assert!(a.attrs.is_empty());
    }

    #[test]
    fn test_attribute_order_does_not_affect_equality() {
        let left = Node::element_with("a", [("href", "x"), ("src", "y")], vec![]);
        let right = Node::element_with("a", [("src", "y"), ("href", "x")], vec![]);
        assert_eq!(left, right);
    }

    #[test]
    fn test_children_order_matters() {
        let left = Node::element_with("p", Attrs::new(), vec!["a".into(), "b".into()]);
        let right = Node::element_with("p", Attrs::new(), vec!["b".into(), "a".into()]);
        assert_ne!(left, right);
    }

    #[test]
    fn test_text_content() {
        let p = Element::new("p")
            .with_child("Hello ")
            .with_child(Element::new("b").with_child("World"));

        assert_eq!(Node::from(p).text_content(), "Hello World");
    }

    #[test]
    fn test_descendants_pre_order() {
        let forest = vec![
            Node::text("a"),
            Element::new("ul")
                .with_child(Element::new("li").with_child("b"))
                .with_child(Element::new("li"))
                .into(),
            Node::element("hr"),
        ];

        let visited: Vec<String> = descendants(&forest)
            .map(|n| match n {
                Node::Text(t) => t.clone(),
                Node::Element(e) => e.tag.clone(),
            })
            .collect();

        assert_eq!(visited, ["a", "ul", "li", "b", "li", "hr"]);
    }
}
