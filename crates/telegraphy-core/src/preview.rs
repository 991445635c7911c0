//! Preview image extraction.

use crate::allowlist::{IMAGE_SRC_ATTR, IMAGE_TAG};
use crate::node::{descendants, Node};

/// Source of the first image in document order.
///
/// The search is depth-first, pre-order and stops at the first image
/// element, even when its source is empty or missing (yielding `""`).
pub fn first_image(nodes: &[Node]) -> Option<String> {
    descendants(nodes)
        .filter_map(Node::as_element)
        .find(|element| element.tag == IMAGE_TAG)
        .map(|image| image.attr(IMAGE_SRC_ATTR).unwrap_or_default().to_string())
}

/// Alias of [`first_image`] under the name used by callers building page
/// responses
pub fn extract_preview(nodes: &[Node]) -> Option<String> {
    first_image(nodes)
}
