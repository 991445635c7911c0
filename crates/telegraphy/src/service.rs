//! ContentService - the main entry point for publishing and rendering content.

use telegraphy_core::{
    first_image, parse_wire_form_with, to_html, to_wire_form_checked, Forest, Node, WireLimits,
};

#[cfg(feature = "html")]
use crate::parser::HtmlParser;
use crate::options::CodecOptions;
use crate::slug::SlugAllocator;
use crate::store::DocumentStore;
use crate::Result;

/// Validated content ready to be stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedDocument {
    pub nodes: Forest,
    /// Canonical wire form of `nodes`
    pub payload: String,
    pub preview: Option<String>,
}

/// A document accepted by a store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedDocument {
    pub slug: String,
    pub nodes: Forest,
    pub payload: String,
    pub preview: Option<String>,
}

/// A stored document decoded for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub nodes: Forest,
    pub html: String,
    pub preview: Option<String>,
}

/// The service tying the codec, the slug allocator and a store together
#[derive(Debug)]
pub struct ContentService {
    options: CodecOptions,
    allocator: SlugAllocator,
}

impl Default for ContentService {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentService {
    /// Create a new ContentService with default options
    pub fn new() -> Self {
        Self::with_options(CodecOptions::default())
    }

    /// Create a ContentService with custom options
    pub fn with_options(options: CodecOptions) -> Self {
        let allocator = SlugAllocator::with_limits(options.slug_max_len, options.max_slug_attempts);
        Self { options, allocator }
    }

    /// Use a fixed or simulated clock for slug suffixes
    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> chrono::DateTime<chrono::Utc> + Send + Sync + 'static,
    {
        self.allocator = self.allocator.with_clock(clock);
        self
    }

    pub fn options(&self) -> &CodecOptions {
        &self.options
    }

    fn wire_limits(&self) -> WireLimits {
        WireLimits {
            max_bytes: self.options.max_input_bytes,
            max_depth: self.options.max_depth,
        }
    }

    /// Decode and validate submitted wire form content
    pub fn parse_content(&self, raw: &[u8]) -> Result<Forest> {
        Ok(parse_wire_form_with(raw, &self.wire_limits())?)
    }

    /// Canonical wire form, refused when larger than the stored ceiling
    pub fn encode(&self, nodes: &[Node]) -> Result<String> {
        Ok(to_wire_form_checked(nodes, self.options.max_stored_bytes)?)
    }

    pub fn render_html(&self, nodes: &[Node]) -> String {
        to_html(nodes)
    }

    /// Parse HTML with the configured limits
    #[cfg(feature = "html")]
    pub fn parse_html(&self, html: &str) -> Result<Forest> {
        let parser = HtmlParser::with_limits(self.options.max_input_bytes, self.options.max_depth);
        Ok(parser.parse(html)?)
    }

    /// Convert an HTML fragment straight to its canonical wire form
    #[cfg(feature = "html")]
    pub fn html_to_wire(&self, html: &str) -> Result<String> {
        let nodes = self.parse_html(html)?;
        self.encode(&nodes)
    }

    /// Validate submitted content and compute everything a store needs
    pub fn prepare(&self, raw: &[u8]) -> Result<PreparedDocument> {
        let nodes = self.parse_content(raw)?;
        let payload = self.encode(&nodes)?;
        let preview = first_image(&nodes);
        Ok(PreparedDocument {
            nodes,
            payload,
            preview,
        })
    }

    /// Validate `raw` and insert it into `store` under a fresh slug for
    /// `title`.
    ///
    /// Nothing is inserted when the content is rejected.
    pub fn publish<S>(&self, store: &S, title: &str, raw: &[u8]) -> Result<PublishedDocument>
    where
        S: DocumentStore + ?Sized,
    {
        let prepared = self.prepare(raw)?;
        let slug = self.allocator.allocate(title, |candidate| {
            store.insert_document(candidate, &prepared.payload)
        })?;

        tracing::debug!(
            slug = %slug,
            bytes = prepared.payload.len(),
            "published document"
        );
        Ok(PublishedDocument {
            slug,
            nodes: prepared.nodes,
            payload: prepared.payload,
            preview: prepared.preview,
        })
    }

    /// Decode a stored payload for display
    pub fn load(&self, stored: &str) -> Result<RenderedDocument> {
        let nodes = self.parse_content(stored.as_bytes())?;
        let html = to_html(&nodes);
        let preview = first_image(&nodes);
        Ok(RenderedDocument {
            nodes,
            html,
            preview,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slug::{AllocationError, InsertError};
    use crate::store::MemoryStore;
    use crate::TelegraphyError;
    use chrono::{TimeZone, Utc};
    use telegraphy_core::{Violation, WireError};

    fn service() -> ContentService {
        ContentService::new().with_clock(|| Utc.with_ymd_and_hms(2024, 5, 12, 12, 34, 56).unwrap())
    }

    const CONTENT: &str = r#"["Intro ",{"tag":"figure","children":[{"tag":"img","attrs":{"src":"/file/cat.jpg"}}]}]"#;

    #[test]
    fn test_prepare() {
        let prepared = service().prepare(CONTENT.as_bytes()).unwrap();
        assert_eq!(prepared.payload, CONTENT);
        assert_eq!(prepared.preview.as_deref(), Some("/file/cat.jpg"));
        assert_eq!(prepared.nodes.len(), 2);
    }

    #[test]
    fn test_prepare_canonicalizes() {
        let raw = br#"[ {"tag":"p","attrs":{},"children":[]} ]"#;
        let prepared = service().prepare(raw).unwrap();
        assert_eq!(prepared.payload, r#"[{"tag":"p"}]"#);
        assert_eq!(prepared.preview, None);
    }

    #[test]
    fn test_publish_and_load() {
        let store = MemoryStore::new();
        let service = service();

        let published = service.publish(&store, "Cats", CONTENT.as_bytes()).unwrap();
        assert_eq!(published.slug, "cats-5-12-184");

        let stored = store.get(&published.slug).unwrap();
        let rendered = service.load(&stored).unwrap();
        assert_eq!(
            rendered.html,
            "Intro <figure><img src=\"/file/cat.jpg\"/></figure>"
        );
        assert_eq!(rendered.preview, published.preview);
        assert_eq!(rendered.nodes, published.nodes);
    }

    #[test]
    fn test_publish_same_title_twice() {
        let store = MemoryStore::new();
        let service = service();

        let first = service.publish(&store, "Cats", CONTENT.as_bytes()).unwrap();
        let second = service.publish(&store, "Cats", CONTENT.as_bytes()).unwrap();
        assert_eq!(first.slug, "cats-5-12-184");
        assert_eq!(second.slug, "cats-5-12-184-2");
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_rejected_content_is_not_stored() {
        let store = MemoryStore::new();
        let result = service().publish(&store, "Bad", br#"[{"tag":"script"}]"#);

        assert!(matches!(
            result,
            Err(TelegraphyError::Wire(WireError::Validation {
                violation: Violation::TagNotAllowed { .. },
                ..
            }))
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn test_stored_ceiling() {
        let options = CodecOptions {
            max_stored_bytes: 8,
            ..CodecOptions::default()
        };
        let service = ContentService::with_options(options);

        assert!(matches!(
            service.prepare(br#"["0123456789"]"#),
            Err(TelegraphyError::Wire(WireError::SizeExceeded { limit: 8, .. }))
        ));
    }

    #[test]
    fn test_input_ceiling() {
        let options = CodecOptions {
            max_input_bytes: 4,
            ..CodecOptions::default()
        };
        let service = ContentService::with_options(options);

        assert!(matches!(
            service.parse_content(br#"["long"]"#),
            Err(TelegraphyError::Wire(WireError::SizeExceeded { size: 8, limit: 4 }))
        ));
    }

    #[test]
    fn test_store_failure() {
        struct Broken;
        impl DocumentStore for Broken {
            fn insert_document(&self, _: &str, _: &str) -> std::result::Result<(), InsertError> {
                Err(InsertError::Store("connection reset".into()))
            }
        }

        let result = service().publish(&Broken, "x", CONTENT.as_bytes());
        assert!(matches!(
            result,
            Err(TelegraphyError::Allocation(AllocationError::Store(_)))
        ));
    }

    #[cfg(feature = "html")]
    #[test]
    fn test_html_to_wire() {
        let wire = service()
            .html_to_wire("<p>Hi <a href=\"/x\">there</a></p>")
            .unwrap();
        assert_eq!(
            wire,
            r#"[{"tag":"p","children":["Hi ",{"tag":"a","attrs":{"href":"/x"},"children":["there"]}]}]"#
        );
    }

    #[cfg(feature = "html")]
    #[test]
    fn test_parse_html_uses_depth_limit() {
        let options = CodecOptions {
            max_depth: 1,
            ..CodecOptions::default()
        };
        let service = ContentService::with_options(options);
        assert!(service.parse_html("<p>x</p>").is_ok());
        assert!(matches!(
            service.parse_html("<p><b>x</b></p>"),
            Err(TelegraphyError::Html(
                crate::parser::HtmlParseError::NestingTooDeep { limit: 1 }
            ))
        ));
    }
}
