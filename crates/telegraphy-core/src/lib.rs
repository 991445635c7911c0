//! telegraphy-core - content node model and sanitizing codec
//!
//! This crate provides the document tree and everything that works on a tree
//! without needing an HTML tokenizer. It is used by `telegraphy`, which adds
//! HTML parsing, slug allocation and the publishing facade.
//!
//! # Architecture
//!
//! ```text
//!                    ┌─────────────┐ ──to_html──▶ HTML String
//! Wire form ─parse──▶│  Node tree  │
//!           ◀─to_wire│  (validated)│ ──first_image──▶ preview URL
//!                    └─────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use telegraphy_core::{parse_wire_form, to_html, to_wire_form};
//!
//! let input = r#"["Hello ",{"tag":"b","children":["World"]}]"#;
//! let nodes = parse_wire_form(input.as_bytes(), 1024).unwrap();
//!
//! assert_eq!(to_html(&nodes), "Hello <b>World</b>");
//! assert_eq!(to_wire_form(&nodes), input);
//! ```

pub mod allowlist;
pub mod html;
mod node;
mod preview;
mod validate;
mod wire;

pub use html::{escape_html, node_to_html, to_html};
pub use node::{descendants, Attrs, Descendants, Element, Forest, Node};
pub use preview::{extract_preview, first_image};
pub use validate::{check_attr, check_element, check_tag, validate, validate_node, Violation};
pub use wire::{
    parse_wire_form, parse_wire_form_with, to_wire_form, to_wire_form_checked, WireError,
    WireLimits, DEFAULT_MAX_DEPTH,
};
