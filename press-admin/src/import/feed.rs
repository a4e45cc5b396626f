//! Feed parsing into an untyped node tree
//!
//! XML is folded into nested mappings:
//! - attributes and child elements share one key space
//! - a repeated child tag becomes a sequence under that key
//! - an element with neither attributes nor children is a text scalar
//! - text next to attributes or children lives under `#text`
//! - attribute values `true`/`false` become booleans
//!
//! No schema validation happens here. Any well-formedness error rejects
//! the whole document.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::BTreeMap;

use super::ImportError;

/// Key holding an element's own text when it also has attributes or children
pub const TEXT_KEY: &str = "#text";

/// Untyped feed tree node
#[derive(Debug, Clone, PartialEq)]
pub enum FeedNode {
    Text(String),
    Bool(bool),
    Map(BTreeMap<String, FeedNode>),
    List(Vec<FeedNode>),
}

impl FeedNode {
    /// Child under `key` when this node is a mapping
    pub fn get(&self, key: &str) -> Option<&FeedNode> {
        match self {
            FeedNode::Map(map) => map.get(key),
            _ => None,
        }
    }

    /// Walk a chain of mapping keys
    pub fn get_path(&self, path: &[&str]) -> Option<&FeedNode> {
        path.iter().try_fold(self, |node, key| node.get(key))
    }

    /// String form of a scalar; mappings and sequences have none
    pub fn as_text(&self) -> Option<String> {
        match self {
            FeedNode::Text(text) => Some(text.clone()),
            FeedNode::Bool(value) => Some(value.to_string()),
            FeedNode::Map(_) | FeedNode::List(_) => None,
        }
    }

    /// Whether this node is a scalar that trims to nothing
    pub fn is_blank(&self) -> bool {
        matches!(self, FeedNode::Text(text) if text.trim().is_empty())
    }
}

/// First candidate key whose scalar value is non-empty after trimming
///
/// Candidates are tried in order; the trimmed value is returned.
pub fn first_string(node: &FeedNode, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| node.get(key).and_then(FeedNode::as_text))
        .map(|text| text.trim().to_string())
        .find(|text| !text.is_empty())
}

/// Children under `key` as a sequence
///
/// A single child becomes a one-element sequence, a missing key an empty
/// one. Blank scalars are dropped.
pub fn as_sequence<'a>(node: &'a FeedNode, key: &str) -> Vec<&'a FeedNode> {
    let children: Vec<&FeedNode> = match node.get(key) {
        None => Vec::new(),
        Some(FeedNode::List(items)) => items.iter().collect(),
        Some(other) => vec![other],
    };

    children.into_iter().filter(|n| !n.is_blank()).collect()
}

/// Element under construction
struct OpenElement {
    name: String,
    children: BTreeMap<String, FeedNode>,
    text: String,
}

impl OpenElement {
    fn new(start: &BytesStart<'_>) -> Result<Self, quick_xml::Error> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut children = BTreeMap::new();

        for attr in start.attributes() {
            let attr = attr?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = decode_entities(&String::from_utf8_lossy(&attr.value));
            let node = match value.as_str() {
                "true" => FeedNode::Bool(true),
                "false" => FeedNode::Bool(false),
                _ => FeedNode::Text(value),
            };
            insert_child(&mut children, key, node);
        }

        Ok(Self {
            name,
            children,
            text: String::new(),
        })
    }

    fn finish(self) -> (String, FeedNode) {
        let text = self.text.trim();
        let node = if self.children.is_empty() {
            FeedNode::Text(text.to_string())
        } else {
            let mut children = self.children;
            if !text.is_empty() {
                insert_child(&mut children, TEXT_KEY.to_string(), FeedNode::Text(text.to_string()));
            }
            FeedNode::Map(children)
        };
        (self.name, node)
    }
}

/// Insert a child, turning repeated keys into a sequence
fn insert_child(map: &mut BTreeMap<String, FeedNode>, key: String, node: FeedNode) {
    match map.remove(&key) {
        None => {
            map.insert(key, node);
        }
        Some(FeedNode::List(mut items)) => {
            items.push(node);
            map.insert(key, FeedNode::List(items));
        }
        Some(existing) => {
            map.insert(key, FeedNode::List(vec![existing, node]));
        }
    }
}

/// Decode XML character and entity references
///
/// Predefined entities and numeric references are resolved one at a time.
/// Anything quick-xml can't resolve (HTML entities such as `&nbsp;`, a bare
/// `&`) is kept verbatim without affecting its neighbours.
pub fn decode_entities(raw: &str) -> String {
    let mut decoded = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(amp) = rest.find('&') {
        decoded.push_str(&rest[..amp]);
        let tail = &rest[amp..];

        let end = tail[1..]
            .find(|c: char| c == ';' || c == '&' || c.is_whitespace())
            .map(|i| i + 1)
            .filter(|&i| tail[i..].starts_with(';'));

        match end {
            Some(end) => {
                let reference = &tail[..=end];
                match quick_xml::escape::unescape(reference) {
                    Ok(text) => decoded.push_str(&text),
                    Err(_) => decoded.push_str(reference),
                }
                rest = &tail[end + 1..];
            }
            None => {
                decoded.push('&');
                rest = &tail[1..];
            }
        }
    }

    decoded.push_str(rest);
    decoded
}

/// Parse an XML document into a feed tree
///
/// The returned root is a mapping of the document's top-level elements.
pub fn parse_feed(xml: &str) -> Result<FeedNode, ImportError> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<OpenElement> = Vec::new();
    let mut root: BTreeMap<String, FeedNode> = BTreeMap::new();

    let malformed = |reader: &Reader<&[u8]>, e: quick_xml::Error| {
        ImportError::MalformedInput(format!(
            "XML parse error at position {}: {}",
            reader.buffer_position(),
            e
        ))
    };

    loop {
        let event = reader.read_event().map_err(|e| malformed(&reader, e))?;

        match event {
            Event::Start(start) => {
                let element = OpenElement::new(&start).map_err(|e| malformed(&reader, e))?;
                stack.push(element);
            }
            Event::Empty(start) => {
                let element = OpenElement::new(&start).map_err(|e| malformed(&reader, e))?;
                let (name, node) = element.finish();
                attach(&mut stack, &mut root, name, node);
            }
            Event::End(_) => {
                // quick-xml has already matched the end tag against its start
                if let Some(element) = stack.pop() {
                    let (name, node) = element.finish();
                    attach(&mut stack, &mut root, name, node);
                }
            }
            Event::Text(text) => {
                if let Some(current) = stack.last_mut() {
                    current
                        .text
                        .push_str(&decode_entities(&String::from_utf8_lossy(&text)));
                }
            }
            Event::CData(data) => {
                if let Some(current) = stack.last_mut() {
                    current
                        .text
                        .push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions, DOCTYPE
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(ImportError::MalformedInput(format!(
            "XML parse error: unclosed element <{}>",
            open.name
        )));
    }

    Ok(FeedNode::Map(root))
}

fn attach(
    stack: &mut [OpenElement],
    root: &mut BTreeMap<String, FeedNode>,
    name: String,
    node: FeedNode,
) {
    match stack.last_mut() {
        Some(parent) => insert_child(&mut parent.children, name, node),
        None => insert_child(root, name, node),
    }
}
