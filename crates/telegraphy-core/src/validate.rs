//! Allowlist validation.
//!
//! A tree is valid when every element passes [`check_element`]. Elements are
//! visited in document order (depth-first, pre-order) and the first violation
//! wins, so the same input always produces the same error.

use crate::allowlist::{is_allowed_attr, is_allowed_tag, is_void};
use crate::node::{descendants, Attrs, Element, Node};

/// Why an element was rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Violation {
    #[error("tag \"{tag}\" is not allowed")]
    TagNotAllowed { tag: String },

    #[error("attribute \"{attr}\" is not allowed on <{tag}>")]
    AttributeNotAllowed { tag: String, attr: String },

    #[error("void tag <{tag}> cannot have children")]
    ChildrenNotAllowedForVoidTag { tag: String },
}

impl Violation {
    /// Stable client-facing error code
    pub fn code(&self) -> String {
        match self {
            Violation::TagNotAllowed { tag } => format!("NOT_ALLOWED_TAG_{tag}"),
            Violation::AttributeNotAllowed { attr, .. } => format!("NOT_ALLOWED_ATTR_{attr}"),
            Violation::ChildrenNotAllowedForVoidTag { tag } => {
                format!("NOT_ALLOWED_CHILDREN_{tag}")
            }
        }
    }
}

/// Validate a whole forest.
pub fn validate(nodes: &[Node]) -> Result<(), Violation> {
    descendants(nodes)
        .filter_map(Node::as_element)
        .try_for_each(check_element)
}

/// Validate a single node and its subtree.
pub fn validate_node(node: &Node) -> Result<(), Violation> {
    node.descendants()
        .filter_map(Node::as_element)
        .try_for_each(check_element)
}

/// Check one element without descending into its children.
///
/// Order: tag, then the void rule, then attributes in insertion order.
pub fn check_element(element: &Element) -> Result<(), Violation> {
    check_fields(&element.tag, &element.attrs, element.children.len())
}

/// Element checks shared with decoders that know the child count before the
/// children themselves are built
pub(crate) fn check_fields(
    tag: &str,
    attrs: &Attrs,
    child_count: usize,
) -> Result<(), Violation> {
    check_tag(tag)?;
    check_void_children(tag, child_count)?;
    for attr in attrs.keys() {
        check_attr(tag, attr)?;
    }
    Ok(())
}

pub fn check_tag(tag: &str) -> Result<(), Violation> {
    if is_allowed_tag(tag) {
        Ok(())
    } else {
        Err(Violation::TagNotAllowed {
            tag: tag.to_string(),
        })
    }
}

pub fn check_attr(tag: &str, attr: &str) -> Result<(), Violation> {
    if is_allowed_attr(attr) {
        Ok(())
    } else {
        Err(Violation::AttributeNotAllowed {
            tag: tag.to_string(),
            attr: attr.to_string(),
        })
    }
}

fn check_void_children(tag: &str, child_count: usize) -> Result<(), Violation> {
    if child_count > 0 && is_void(tag) {
        Err(Violation::ChildrenNotAllowedForVoidTag {
            tag: tag.to_string(),
        })
    } else {
        Ok(())
    }
}
