//! Wire form: the compact JSON encoding used for storage and transport.
//!
//! A document is a JSON array. Each item is either a string (text node) or an
//! object `{"tag": .., "attrs": {..}, "children": [..]}` where `attrs` and
//! `children` are optional. The canonical form written by [`to_wire_form`]
//! omits both when empty.

use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::node::{Attrs, Element, Forest, Node};
use crate::validate::{check_fields, Violation};

/// Default maximum element nesting accepted by the parsers.
///
/// Each element level costs two levels of JSON nesting (object and children
/// array), so this keeps every accepted tree below serde_json's recursion
/// limit and guarantees stored trees can always be read back.
pub const DEFAULT_MAX_DEPTH: usize = 60;

/// Errors produced while decoding the wire form
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WireError {
    #[error("content is {size} bytes, limit is {limit}")]
    SizeExceeded { size: usize, limit: usize },

    #[error("malformed wire form: {message}")]
    Syntax { message: String },

    #[error("invalid field at {path}: {reason}")]
    Schema { path: String, reason: String },

    #[error("invalid element at {path}: {violation}")]
    Validation { path: String, violation: Violation },

    #[error("elements nested deeper than {limit} levels")]
    NestingTooDeep { limit: usize },
}

/// Limits applied while decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireLimits {
    pub max_bytes: usize,
    /// Element nesting limit. The JSON reader caps documents at about 64
    /// element levels regardless of this value.
    pub max_depth: usize,
}

impl WireLimits {
    pub fn new(max_bytes: usize) -> Self {
        Self {
            max_bytes,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Decode and validate a wire-form document.
///
/// Oversized input is rejected before any decoding happens.
pub fn parse_wire_form(input: &[u8], max_size: usize) -> Result<Forest, WireError> {
    parse_wire_form_with(input, &WireLimits::new(max_size))
}

/// Decode and validate a wire-form document with explicit limits.
pub fn parse_wire_form_with(input: &[u8], limits: &WireLimits) -> Result<Forest, WireError> {
    tracing::debug!(bytes = input.len(), "parsing wire form");

    let result = decode_document(input, limits);
    match &result {
        Ok(nodes) => tracing::debug!(nodes = nodes.len(), "wire form accepted"),
        Err(err) => tracing::debug!(error = %err, "wire form rejected"),
    }
    result
}

fn decode_document(input: &[u8], limits: &WireLimits) -> Result<Forest, WireError> {
    if input.len() > limits.max_bytes {
        return Err(WireError::SizeExceeded {
            size: input.len(),
            limit: limits.max_bytes,
        });
    }

    let value: Value = serde_json::from_slice(input).map_err(|e| syntax_error(e, limits))?;

    let Value::Array(items) = value else {
        return Err(WireError::Syntax {
            message: format!("expected an array, found {}", kind(&value)),
        });
    };

    let root = Path::Root;
    let mut nodes = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        nodes.push(decode_node(item, &Path::Index(&root, index), 1, limits)?);
    }
    Ok(nodes)
}

/// serde_json stops at 128 levels of JSON nesting, about 64 element levels.
/// Hitting that is reported like any other over-deep document.
fn syntax_error(err: serde_json::Error, limits: &WireLimits) -> WireError {
    let message = err.to_string();
    if message.starts_with("recursion limit exceeded") {
        WireError::NestingTooDeep {
            limit: limits.max_depth,
        }
    } else {
        WireError::Syntax { message }
    }
}

fn decode_node(
    value: Value,
    path: &Path<'_>,
    depth: usize,
    limits: &WireLimits,
) -> Result<Node, WireError> {
    match value {
        Value::String(text) => Ok(Node::Text(text)),
        Value::Object(fields) => decode_element(fields, path, depth, limits).map(Node::Element),
        other => Err(schema(
            path,
            format!("expected a string or an object, found {}", kind(&other)),
        )),
    }
}

/// Decode one element. Its own fields are checked against the allowlists
/// before any child is decoded, so violations surface in document order.
fn decode_element(
    mut fields: Map<String, Value>,
    path: &Path<'_>,
    depth: usize,
    limits: &WireLimits,
) -> Result<Element, WireError> {
    if depth > limits.max_depth {
        return Err(WireError::NestingTooDeep {
            limit: limits.max_depth,
        });
    }

    let tag = match fields.remove("tag") {
        Some(Value::String(tag)) => tag,
        Some(other) => {
            return Err(schema(
                &Path::Field(path, "tag"),
                format!("expected a string, found {}", kind(&other)),
            ))
        }
        None => return Err(schema(&Path::Field(path, "tag"), "missing required field")),
    };

    let attrs_path = Path::Field(path, "attrs");
    let attrs = match fields.remove("attrs") {
        None => Attrs::new(),
        Some(Value::Object(map)) => {
            let mut attrs = Attrs::with_capacity(map.len());
            for (name, value) in map {
                match value {
                    Value::String(value) => {
                        attrs.insert(name, value);
                    }
                    other => {
                        return Err(schema(
                            &Path::Field(&attrs_path, &name),
                            format!("expected a string, found {}", kind(&other)),
                        ))
                    }
                }
            }
            attrs
        }
        Some(other) => {
            return Err(schema(
                &attrs_path,
                format!("expected an object, found {}", kind(&other)),
            ))
        }
    };

    let children_path = Path::Field(path, "children");
    let items = match fields.remove("children") {
        None => Vec::new(),
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(schema(
                &children_path,
                format!("expected an array, found {}", kind(&other)),
            ))
        }
    };

    check_fields(&tag, &attrs, items.len()).map_err(|violation| WireError::Validation {
        path: path.to_string(),
        violation,
    })?;

    let mut children = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        children.push(decode_node(
            item,
            &Path::Index(&children_path, index),
            depth + 1,
            limits,
        )?);
    }

    Ok(Element {
        tag,
        attrs,
        children,
    })
}

fn schema(path: &Path<'_>, reason: impl Into<String>) -> WireError {
    WireError::Schema {
        path: path.to_string(),
        reason: reason.into(),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Location inside the document, rendered like `$[0].children[2].attrs.href`.
/// Built on the stack and only formatted when an error is reported.
#[derive(Debug, Clone, Copy)]
enum Path<'a> {
    Root,
    Index(&'a Path<'a>, usize),
    Field(&'a Path<'a>, &'a str),
}

impl fmt::Display for Path<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Path::Root => f.write_str("$"),
            Path::Index(parent, index) => write!(f, "{parent}[{index}]"),
            Path::Field(parent, name) => write!(f, "{parent}.{name}"),
        }
    }
}

/// Encode a forest in canonical wire form.
///
/// Never validates and never fails: whatever shape is given is written out.
pub fn to_wire_form(nodes: &[Node]) -> String {
    Value::Array(nodes.iter().map(Value::from).collect()).to_string()
}

/// Encode a forest and enforce the stored-size ceiling.
pub fn to_wire_form_checked(nodes: &[Node], limit: usize) -> Result<String, WireError> {
    let encoded = to_wire_form(nodes);
    if encoded.len() > limit {
        return Err(WireError::SizeExceeded {
            size: encoded.len(),
            limit,
        });
    }
    Ok(encoded)
}

impl From<&Node> for Value {
    fn from(node: &Node) -> Self {
        match node {
            Node::Text(text) => Value::String(text.clone()),
            Node::Element(element) => {
                let mut map = Map::new();
                map.insert("tag".to_string(), Value::String(element.tag.clone()));
                if !element.attrs.is_empty() {
                    let attrs = element
                        .attrs
                        .iter()
                        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                        .collect();
                    map.insert("attrs".to_string(), Value::Object(attrs));
                }
                if !element.children.is_empty() {
                    let children = element.children.iter().map(Value::from).collect();
                    map.insert("children".to_string(), Value::Array(children));
                }
                Value::Object(map)
            }
        }
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Value::from(self).serialize(serializer)
    }
}
