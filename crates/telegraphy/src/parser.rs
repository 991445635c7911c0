//! Strict HTML to tree parsing.
//!
//! Markup is split into tokens by the html5ever tokenizer, which also decodes
//! character references. The tree is then built here, without any of the
//! repairs a browser would make: every start tag must be closed by a matching
//! end tag (void tags excepted), and every tag and attribute must pass the
//! allowlist. The first problem aborts the parse.

use std::cell::RefCell;

use html5ever::tendril::StrTendril;
use html5ever::tokenizer::{
    BufferQueue, Tag, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts,
};
use telegraphy_core::allowlist::is_void;
use telegraphy_core::{check_attr, check_tag, Attrs, Element, Forest, Node, Violation};
use thiserror::Error;

use crate::options::{DEFAULT_MAX_DEPTH, DEFAULT_MAX_INPUT_BYTES};

/// Parse error message html5ever reports when input ends inside markup
const UNEXPECTED_EOF: &str = "Unexpected EOF";

/// Errors produced while parsing HTML into a tree
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HtmlParseError {
    #[error(transparent)]
    Violation(#[from] Violation),

    #[error("tag {found} closed instead of {expected}")]
    MismatchedCloseTag { expected: String, found: String },

    #[error("tag {found} closed but never opened")]
    UnexpectedCloseTag { found: String },

    #[error("tag {tag} is not closed")]
    UnclosedTag { tag: String },

    #[error("elements nested deeper than {limit}")]
    NestingTooDeep { limit: usize },

    #[error("input is {size} bytes, limit is {limit}")]
    SizeExceeded { size: usize, limit: usize },

    #[error("malformed markup on line {line}: {reason}")]
    Malformed { line: u64, reason: &'static str },
}

/// Configurable HTML parser
#[derive(Debug, Clone)]
pub struct HtmlParser {
    max_bytes: usize,
    max_depth: usize,
}

impl Default for HtmlParser {
    fn default() -> Self {
        Self::new()
    }
}

impl HtmlParser {
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_MAX_INPUT_BYTES, DEFAULT_MAX_DEPTH)
    }

    pub fn with_limits(max_bytes: usize, max_depth: usize) -> Self {
        Self {
            max_bytes,
            max_depth,
        }
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Parse an HTML fragment into a validated forest.
    ///
    /// Adjacent runs of character data become a single text node. Comments
    /// and doctypes are skipped, end tags of void elements are ignored.
    pub fn parse(&self, html: &str) -> Result<Forest, HtmlParseError> {
        if html.len() > self.max_bytes {
            return Err(HtmlParseError::SizeExceeded {
                size: html.len(),
                limit: self.max_bytes,
            });
        }

        let opts = TokenizerOpts {
            exact_errors: true,
            discard_bom: false,
            ..TokenizerOpts::default()
        };
        let tokenizer = Tokenizer::new(BuildSink::new(self.max_depth), opts);
        let input = BufferQueue::default();
        input.push_back(StrTendril::from_slice(html));
        let _ = tokenizer.feed(&input);
        tokenizer.end();

        let nodes = tokenizer.sink.finish()?;
        tracing::debug!(
            bytes = html.len(),
            top_level = nodes.len(),
            "parsed html fragment"
        );
        Ok(nodes)
    }
}

/// Parse HTML with the default limits
pub fn from_html(html: &str) -> Result<Forest, HtmlParseError> {
    HtmlParser::new().parse(html)
}

/// Token sink feeding the tree builder and keeping the first error
struct BuildSink {
    builder: RefCell<TreeBuilder>,
    error: RefCell<Option<HtmlParseError>>,
}

impl BuildSink {
    fn new(max_depth: usize) -> Self {
        Self {
            builder: RefCell::new(TreeBuilder::new(max_depth)),
            error: RefCell::new(None),
        }
    }

    fn finish(self) -> Result<Forest, HtmlParseError> {
        match self.error.into_inner() {
            Some(err) => Err(err),
            None => self.builder.into_inner().finish(),
        }
    }
}

impl TokenSink for BuildSink {
    type Handle = ();

    fn process_token(&self, token: Token, line_number: u64) -> TokenSinkResult<()> {
        if self.error.borrow().is_some() {
            return TokenSinkResult::Continue;
        }

        if let Err(err) = self.builder.borrow_mut().push(token, line_number) {
            tracing::debug!(line = line_number, error = %err, "html rejected");
            *self.error.borrow_mut() = Some(err);
        }
        TokenSinkResult::Continue
    }
}

struct OpenElement {
    tag: String,
    attrs: Attrs,
    /// Children collected so far
    siblings: Vec<Node>,
}

impl OpenElement {
    fn close(self) -> Node {
        Node::Element(Element {
            tag: self.tag,
            attrs: self.attrs,
            children: self.siblings,
        })
    }
}

/// Stack of open elements, innermost last
struct TreeBuilder {
    root: Vec<Node>,
    open: Vec<OpenElement>,
    max_depth: usize,
}

impl TreeBuilder {
    fn new(max_depth: usize) -> Self {
        Self {
            root: Vec::new(),
            open: Vec::new(),
            max_depth,
        }
    }

    fn current(&mut self) -> &mut Vec<Node> {
        match self.open.last_mut() {
            Some(parent) => &mut parent.siblings,
            None => &mut self.root,
        }
    }

    fn push(&mut self, token: Token, line: u64) -> Result<(), HtmlParseError> {
        match token {
            Token::CharacterTokens(text) => self.push_text(&text),
            Token::TagToken(tag) => match tag.kind {
                TagKind::StartTag => self.open_element(tag)?,
                TagKind::EndTag => self.close_element(tag.name.to_string())?,
            },
            Token::ParseError(message) if message == UNEXPECTED_EOF => {
                return Err(HtmlParseError::Malformed {
                    line,
                    reason: "input ends inside a tag or comment",
                });
            }
            // recoverable tokenizer errors, comments, doctypes and NUL
            // characters leave no trace in the tree
            Token::ParseError(_)
            | Token::CommentToken(_)
            | Token::DoctypeToken(_)
            | Token::NullCharacterToken
            | Token::EOFToken => {}
        }
        Ok(())
    }

    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let children = self.current();
        match children.last_mut() {
            Some(Node::Text(previous)) => previous.push_str(text),
            _ => children.push(Node::Text(text.to_string())),
        }
    }

    fn open_element(&mut self, tag: Tag) -> Result<(), HtmlParseError> {
        let name = tag.name.to_string();
        check_tag(&name)?;

        // the tokenizer already drops repeated attributes, keeping the first
        let mut attrs = Attrs::with_capacity(tag.attrs.len());
        for attr in tag.attrs {
            let attr_name = attr.name.local.to_string();
            check_attr(&name, &attr_name)?;
            attrs.insert(attr_name, attr.value.to_string());
        }

        if self.open.len() + 1 > self.max_depth {
            return Err(HtmlParseError::NestingTooDeep {
                limit: self.max_depth,
            });
        }

        let element = OpenElement {
            tag: name,
            attrs,
            siblings: Vec::new(),
        };
        if is_void(&element.tag) || tag.self_closing {
            self.current().push(element.close());
        } else {
            self.open.push(element);
        }
        Ok(())
    }

    fn close_element(&mut self, found: String) -> Result<(), HtmlParseError> {
        if is_void(&found) {
            return Ok(());
        }

        let Some(element) = self.open.pop() else {
            return Err(HtmlParseError::UnexpectedCloseTag { found });
        };
        if element.tag != found {
            return Err(HtmlParseError::MismatchedCloseTag {
                expected: element.tag,
                found,
            });
        }

        let node = element.close();
        self.current().push(node);
        Ok(())
    }

    fn finish(mut self) -> Result<Forest, HtmlParseError> {
        match self.open.pop() {
            Some(unclosed) => Err(HtmlParseError::UnclosedTag { tag: unclosed.tag }),
            None => Ok(self.root),
        }
    }
}
