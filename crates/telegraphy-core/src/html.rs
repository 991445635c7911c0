//! Tree to HTML rendering.
//!
//! Output is plain concatenation: no whitespace or indentation is added.

use crate::allowlist::is_void;
use crate::node::{Element, Node};

/// Render a forest to HTML
pub fn to_html(nodes: &[Node]) -> String {
    let mut out = String::with_capacity(256);
    for node in nodes {
        write_node(node, &mut out);
    }
    out
}

/// Render a single node (outer HTML)
pub fn node_to_html(node: &Node) -> String {
    let mut out = String::new();
    write_node(node, &mut out);
    out
}

fn write_node(node: &Node, out: &mut String) {
    match node {
        Node::Text(text) => escape_into(text, out),
        Node::Element(element) => write_element(element, out),
    }
}

fn write_element(element: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&element.tag);
    for (name, value) in &element.attrs {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        escape_into(value, out);
        out.push('"');
    }

    // void elements never have content
    if is_void(&element.tag) {
        out.push_str("/>");
        return;
    }

    out.push('>');
    for child in &element.children {
        write_node(child, out);
    }
    out.push_str("</");
    out.push_str(&element.tag);
    out.push('>');
}

/// Escape text for use in HTML content or a quoted attribute value
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    escape_into(s, &mut out);
    out
}

fn escape_into(s: &str, out: &mut String) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
}
