//! Fixed tag and attribute allowlists.

/// Tags a document may contain
pub const ALLOWED_TAGS: &[&str] = &[
    "a", "aside", "b", "blockquote", "br", "code", "em", "figcaption", "figure",
    "h1", "h3", "h4", "hr", "i", "iframe", "img", "li", "ol", "p", "pre", "s",
    "strong", "u", "ul", "video",
];

/// Attributes any allowed element may carry
pub const ALLOWED_ATTRS: &[&str] = &["href", "src"];

/// Void (self-closing) HTML elements
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "keygen",
    "link", "menuitem", "meta", "param", "source", "track", "wbr",
];

/// Tag whose source attribute becomes the document preview
pub const IMAGE_TAG: &str = "img";

/// Attribute holding an image source
pub const IMAGE_SRC_ATTR: &str = "src";

/// Check if a tag is allowed. Matching is exact: tags are stored lowercase.
pub fn is_allowed_tag(tag: &str) -> bool {
    ALLOWED_TAGS.contains(&tag)
}

/// Check if an attribute name is allowed
pub fn is_allowed_attr(attr: &str) -> bool {
    ALLOWED_ATTRS.contains(&attr)
}

/// Check if a tag is a void element
pub fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_allowed_tag() {
        assert!(is_allowed_tag("a"));
        assert!(is_allowed_tag("blockquote"));
        assert!(!is_allowed_tag("div"));
        assert!(!is_allowed_tag("script"));
        assert!(!is_allowed_tag("B"));
    }

    #[test]
    fn test_is_allowed_attr() {
        assert!(is_allowed_attr("href"));
        assert!(is_allowed_attr("src"));
        assert!(!is_allowed_attr("onclick"));
        assert!(!is_allowed_attr("style"));
    }

    #[test]
    fn test_is_void() {
        assert!(is_void("br"));
        assert!(is_void("img"));
        assert!(is_void("hr"));
        assert!(!is_void("p"));
    }

    #[test]
    fn test_image_tag_is_allowed_void() {
        assert!(is_allowed_tag(IMAGE_TAG));
        assert!(is_void(IMAGE_TAG));
        assert!(is_allowed_attr(IMAGE_SRC_ATTR));
    }
}
