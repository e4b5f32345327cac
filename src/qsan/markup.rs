//! Permissive markup tree
//!
//! The array answers with a mix of XML fragments and HTML pages, and at least one
//! firmware emits structurally invalid records (a bare `<img/>` wedged between
//! fields). This module turns any response body into a small element tree without
//! ever failing:
//!
//! - end tags that do not match the open element close up to the nearest match,
//!   or are dropped when nothing matches
//! - HTML void elements (`img`, `br`, ...) never open a scope
//! - unknown entities fall back to the raw text
//! - a reader error ends the parse, keeping everything built so far
//!
//! Element and attribute names are lower-cased, mirroring HTML parsers.

use crate::qsan::types::Attributes;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::borrow::Cow;
use std::ops::Deref;
use tracing::debug;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

const ROOT_NAME: &str = "#document";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// A tag with its attributes and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    fn from_start(start: &BytesStart<'_>) -> Self {
        let name = lossy(start.name().as_ref()).to_ascii_lowercase();
        let attributes = start
            .html_attributes()
            .with_checks(false)
            .filter_map(|attr| attr.ok())
            .map(|attr| {
                let key = lossy(attr.key.as_ref()).to_ascii_lowercase();
                let value = match attr.unescape_value() {
                    Ok(value) => value.into_owned(),
                    Err(_) => lossy(&attr.value),
                };
                (key, value)
            })
            .collect();

        Self {
            name,
            attributes,
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Direct element children, text nodes excluded.
    pub fn children(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    pub fn has_children(&self) -> bool {
        self.children().next().is_some()
    }

    /// Concatenated text of this element and all of its descendants.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.children {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Element(element) => element.collect_text(out),
            }
        }
    }

    /// All descendants in document order.
    pub fn descendants(&self) -> Vec<&Element> {
        let mut out = Vec::new();
        let mut pending: Vec<&Element> = self.children().collect();
        pending.reverse();
        while let Some(element) = pending.pop() {
            out.push(element);
            let mut nested: Vec<&Element> = element.children().collect();
            nested.reverse();
            pending.extend(nested);
        }
        out
    }

    /// First descendant named `name`.
    pub fn find(&self, name: &str) -> Option<&Element> {
        self.descendants().into_iter().find(|e| e.name == name)
    }

    /// Every descendant named `name`, in document order.
    pub fn find_all(&self, name: &str) -> Vec<&Element> {
        self.descendants()
            .into_iter()
            .filter(|e| e.name == name)
            .collect()
    }

    /// First descendant named `name` whose attribute `key` equals `value`.
    pub fn find_with_attribute(&self, name: &str, key: &str, value: &str) -> Option<&Element> {
        self.descendants()
            .into_iter()
            .find(|e| e.name == name && e.attribute(key) == Some(value))
    }

    /// First descendant of any name carrying `id`.
    pub fn find_by_id(&self, id: &str) -> Option<&Element> {
        self.descendants()
            .into_iter()
            .find(|e| e.attribute("id") == Some(id))
    }

    /// Text of the first descendant named `name`.
    pub fn child_text(&self, name: &str) -> Option<String> {
        self.find(name).map(Element::text)
    }

    /// Collects every named direct child into a name → text map, skipping the
    /// names in `skip`. A repeated name keeps the last value.
    pub fn fields(&self, skip: &[&str]) -> Attributes {
        self.children()
            .filter(|child| !child.name.is_empty() && !skip.contains(&child.name.as_str()))
            .map(|child| (child.name.clone(), child.text()))
            .collect()
    }
}

/// A parsed response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    root: Element,
}

impl Document {
    pub fn parse(markup: &str) -> Self {
        let mut reader = Reader::from_str(markup);
        let config = reader.config_mut();
        config.trim_text(true);
        config.check_end_names = false;
        config.allow_unmatched_ends = true;

        let mut stack = vec![Element::new(ROOT_NAME)];

        loop {
            match reader.read_event() {
                Ok(Event::Start(start)) => {
                    let element = Element::from_start(&start);
                    if VOID_ELEMENTS.contains(&element.name.as_str()) {
                        attach(&mut stack, Node::Element(element));
                    } else {
                        stack.push(element);
                    }
                }
                Ok(Event::Empty(start)) => {
                    attach(&mut stack, Node::Element(Element::from_start(&start)));
                }
                Ok(Event::End(end)) => {
                    let name = lossy(end.name().as_ref()).to_ascii_lowercase();
                    close(&mut stack, &name);
                }
                Ok(Event::Text(text)) => {
                    let text = match text.unescape() {
                        Ok(text) => text.into_owned(),
                        Err(_) => lossy(&text),
                    };
                    if !text.is_empty() {
                        attach(&mut stack, Node::Text(text));
                    }
                }
                Ok(Event::CData(data)) => {
                    attach(&mut stack, Node::Text(lossy(&data)));
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => {
                    debug!(
                        "Markup parse stopped at byte {}: {}",
                        reader.buffer_position(),
                        e
                    );
                    break;
                }
            }
        }

        // Close whatever is still open
        while stack.len() > 1 {
            if let Some(element) = stack.pop() {
                attach(&mut stack, Node::Element(element));
            }
        }

        let root = stack.pop().unwrap_or_else(|| Element::new(ROOT_NAME));
        Self { root }
    }
}

impl Deref for Document {
    type Target = Element;

    fn deref(&self) -> &Element {
        &self.root
    }
}

fn attach(stack: &mut [Element], node: Node) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
    }
}

/// Pops up to and including the nearest open element named `name`. Ends with no
/// open match are ignored; the root is never closed.
fn close(stack: &mut Vec<Element>, name: &str) {
    let Some(position) = stack.iter().rposition(|e| e.name == name) else {
        return;
    };
    if position == 0 {
        return;
    }
    while stack.len() > position {
        if let Some(element) = stack.pop() {
            attach(stack, Node::Element(element));
        }
    }
}

fn lossy(bytes: &[u8]) -> String {
    match String::from_utf8_lossy(bytes) {
        Cow::Borrowed(s) => s.to_string(),
        Cow::Owned(s) => s,
    }
}
