//! Property based round trips through the wire form and HTML.

use proptest::prelude::*;
use telegraphy::{from_html, parse_wire_form, to_html, to_wire_form, validate, Element, Node};

const CONTAINER_TAGS: &[&str] = &[
    "a", "aside", "b", "blockquote", "code", "em", "figcaption", "figure", "h1", "h3", "h4",
    "i", "iframe", "li", "ol", "p", "pre", "s", "strong", "u", "ul", "video",
];

const VOID_TAGS: &[&str] = &["br", "hr", "img"];

fn attrs() -> impl Strategy<Value = Vec<(&'static str, String)>> {
    (
        proptest::option::of("\\PC{0,16}"),
        proptest::option::of("\\PC{0,16}"),
    )
        .prop_map(|(href, src)| {
            let mut attrs = Vec::new();
            if let Some(href) = href {
                attrs.push(("href", href));
            }
            if let Some(src) = src {
                attrs.push(("src", src));
            }
            attrs
        })
}

fn leaf() -> impl Strategy<Value = Node> {
    prop_oneof![
        "\\PC{0,12}".prop_map(Node::Text),
        (proptest::sample::select(VOID_TAGS), attrs())
            .prop_map(|(tag, attrs)| Node::element_with(tag, attrs, Vec::new())),
    ]
}

fn node() -> impl Strategy<Value = Node> {
    leaf().prop_recursive(5, 48, 4, |inner| {
        (
            proptest::sample::select(CONTAINER_TAGS),
            attrs(),
            prop::collection::vec(inner, 0..4),
        )
            .prop_map(|(tag, attrs, children)| Node::element_with(tag, attrs, children))
    })
}

fn forest() -> impl Strategy<Value = Vec<Node>> {
    prop::collection::vec(node(), 0..6)
}

/// Merge adjacent text nodes and drop empty ones, the shape HTML parsing
/// produces
fn coalesce(nodes: Vec<Node>) -> Vec<Node> {
    let mut out: Vec<Node> = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            Node::Text(text) if text.is_empty() => {}
            Node::Text(text) => match out.last_mut() {
                Some(Node::Text(previous)) => previous.push_str(&text),
                _ => out.push(Node::Text(text)),
            },
            Node::Element(element) => out.push(Node::Element(Element {
                children: coalesce(element.children),
                ..element
            })),
        }
    }
    out
}

proptest! {
    #[test]
    fn prop_generated_forests_are_valid(nodes in forest()) {
        prop_assert_eq!(validate(&nodes), Ok(()));
    }

    #[test]
    fn prop_wire_round_trip(nodes in forest()) {
        let encoded = to_wire_form(&nodes);
        let decoded = parse_wire_form(encoded.as_bytes(), usize::MAX).unwrap();
        prop_assert_eq!(decoded, nodes);
    }

    #[test]
    fn prop_wire_encoding_is_canonical(nodes in forest()) {
        let encoded = to_wire_form(&nodes);
        let decoded = parse_wire_form(encoded.as_bytes(), usize::MAX).unwrap();
        prop_assert_eq!(to_wire_form(&decoded), encoded);
    }

    #[test]
    fn prop_html_round_trip(nodes in forest()) {
        let nodes = coalesce(nodes);
        let html = to_html(&nodes);
        let parsed = from_html(&html);
        prop_assert_eq!(parsed, Ok(nodes), "html: {}", html);
    }
}
