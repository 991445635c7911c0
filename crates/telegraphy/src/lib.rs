//! # telegraphy
//!
//! Sanitizing content codec for an anonymous publishing service.
//!
//! Documents are trees of text and a small allowlisted set of HTML elements.
//! They arrive either as a compact JSON wire form or as an HTML fragment, are
//! validated strictly (never repaired), stored in canonical wire form under a
//! readable slug, and rendered back to HTML.
//!
//! ## Design
//!
//! The tree model, validation, wire form and HTML rendering live in
//! `telegraphy-core`. This crate adds:
//!
//! - **Strict HTML parsing** (feature `html`, on by default): malformed or
//!   disallowed markup is an error, not something to fix up
//! - **Slug allocation**: transliterated title plus a time based suffix,
//!   retried against a store until one is free
//! - **ContentService**: the publish and load flows over a [`DocumentStore`]
//!
//! ## Example (wire form)
//!
//! ```rust
//! use telegraphy::{ContentService, MemoryStore};
//!
//! let service = ContentService::new();
//! let store = MemoryStore::new();
//!
//! let content = r#"[{"tag":"p","children":["Hello ",{"tag":"b","children":["World"]}]}]"#;
//! let published = service.publish(&store, "Hello World", content.as_bytes()).unwrap();
//! assert!(published.slug.starts_with("hello-world-"));
//!
//! let stored = store.get(&published.slug).unwrap();
//! let page = service.load(&stored).unwrap();
//! assert_eq!(page.html, "<p>Hello <b>World</b></p>");
//! ```
//!
//! ## Example (HTML string)
//!
//! ```rust
//! use telegraphy::{from_html, to_wire_form};
//!
//! let nodes = from_html("<p>Hi <a href=\"/x\">there</a></p>").unwrap();
//! assert_eq!(
//!     to_wire_form(&nodes),
//!     r#"[{"tag":"p","children":["Hi ",{"tag":"a","attrs":{"href":"/x"},"children":["there"]}]}]"#
//! );
//! ```

mod options;
#[cfg(feature = "html")]
mod parser;
mod service;
pub mod slug;
mod store;

pub use options::{
    CodecOptions, DEFAULT_MAX_DEPTH, DEFAULT_MAX_INPUT_BYTES, DEFAULT_MAX_SLUG_ATTEMPTS,
    DEFAULT_MAX_STORED_BYTES, DEFAULT_SLUG_MAX_LEN,
};
#[cfg(feature = "html")]
pub use parser::{from_html, HtmlParseError, HtmlParser};
pub use service::{ContentService, PreparedDocument, PublishedDocument, RenderedDocument};
pub use slug::{
    allocate_slug, slug_prefix, slug_suffix, transliterate, AllocationError, InsertError,
    SlugAllocator,
};
pub use store::{DocumentStore, MemoryStore};

pub use telegraphy_core::allowlist;
pub use telegraphy_core::{
    check_attr, check_element, check_tag, descendants, escape_html, extract_preview,
    first_image, node_to_html, parse_wire_form, parse_wire_form_with, to_html, to_wire_form,
    to_wire_form_checked, validate, validate_node, Attrs, Descendants, Element, Forest, Node,
    Violation, WireError, WireLimits,
};

/// Error type for telegraphy operations
#[derive(Debug, thiserror::Error)]
pub enum TelegraphyError {
    #[error(transparent)]
    Wire(#[from] WireError),

    #[cfg(feature = "html")]
    #[error(transparent)]
    Html(#[from] HtmlParseError),

    #[error(transparent)]
    Allocation(#[from] AllocationError),
}

pub type Result<T> = std::result::Result<T, TelegraphyError>;
