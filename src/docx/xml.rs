//! A small owned XML element tree over quick-xml.
//!
//! OOXML parts are parsed into [`Element`]s, edited in place and written back
//! with a standard declaration. Names are kept as qualified strings
//! (`w:p`, `w:fldSimple`), which matches how Word writes its parts.

use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::borrow::Cow;

use crate::error::{Error, Result};

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\r\n";

/// A node in the element tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
}

/// An XML element with ordered attributes and children.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder: add an attribute.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(key, value);
        self
    }

    /// Builder: add a child element.
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    /// Builder: add a text node.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((key, value)),
        }
    }

    /// Child elements in document order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    pub fn child(&self, name: &str) -> Option<&Element> {
        self.elements().find(|e| e.is(name))
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.elements_mut().find(|e| e.is(name))
    }

    /// Get the named child, appending an empty one if absent.
    pub fn ensure_child(&mut self, name: &str) -> &mut Element {
        let pos = self
            .children
            .iter()
            .position(|n| matches!(n, Node::Element(e) if e.is(name)));
        let index = match pos {
            Some(i) => i,
            None => {
                self.children.push(Node::Element(Element::new(name)));
                self.children.len() - 1
            }
        };
        match &mut self.children[index] {
            Node::Element(e) => e,
            _ => unreachable!("index points at an element"),
        }
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    /// Insert `child` before the first child element named in `before`,
    /// or append it when none is present.
    pub fn insert_before_any(&mut self, child: Element, before: &[&str]) {
        let pos = self
            .children
            .iter()
            .position(|n| matches!(n, Node::Element(e) if before.contains(&e.name.as_str())));
        match pos {
            Some(i) => self.children.insert(i, Node::Element(child)),
            None => self.children.push(Node::Element(child)),
        }
    }

    /// Remove every direct child element with the given name.
    pub fn remove_children(&mut self, name: &str) -> usize {
        let before = self.children.len();
        self.children
            .retain(|n| !matches!(n, Node::Element(e) if e.is(name)));
        before - self.children.len()
    }

    /// Depth-first search over descendants (excluding `self`).
    pub fn find_descendant<F>(&self, pred: F) -> Option<&Element>
    where
        F: Fn(&Element) -> bool + Copy,
    {
        for child in self.elements() {
            if pred(child) {
                return Some(child);
            }
            if let Some(found) = child.find_descendant(pred) {
                return Some(found);
            }
        }
        None
    }

    /// All descendants with the given name, in document order.
    pub fn descendants_named<'a>(&'a self, name: &str, out: &mut Vec<&'a Element>) {
        for child in self.elements() {
            if child.is(name) {
                out.push(child);
            }
            child.descendants_named(name, out);
        }
    }

    pub fn has_descendant(&self, name: &str) -> bool {
        self.find_descendant(|e| e.is(name)).is_some()
    }

    /// Concatenated text of direct text children.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|n| match n {
                Node::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }
}

fn xml_error(part: &str, err: impl std::fmt::Display) -> Error {
    Error::Xml {
        part: part.to_string(),
        message: err.to_string(),
    }
}

fn start_element(e: &BytesStart<'_>, part: &str) -> Result<Element> {
    let mut element = Element::new(String::from_utf8_lossy(e.name().as_ref()).into_owned());
    for attr in e.attributes() {
        let attr = attr.map_err(|err| xml_error(part, err))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|err| xml_error(part, err))?
            .into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element, part: &str) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.push(element);
        Ok(())
    } else if root.is_none() {
        *root = Some(element);
        Ok(())
    } else {
        Err(xml_error(part, "multiple root elements"))
    }
}

/// Parse an XML part into its root element.
pub fn parse(xml: &[u8], part: &str) -> Result<Element> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(false);

    let mut buf = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader
            .read_event_into(&mut buf)
            .map_err(|e| xml_error(part, e))?
        {
            Event::Start(e) => stack.push(start_element(&e, part)?),
            Event::Empty(e) => {
                let element = start_element(&e, part)?;
                attach(&mut stack, &mut root, element, part)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| xml_error(part, "unbalanced end tag"))?;
                attach(&mut stack, &mut root, element, part)?;
            }
            Event::Text(t) => {
                if let Some(parent) = stack.last_mut() {
                    let text = t.unescape().map_err(|e| xml_error(part, e))?;
                    parent.children.push(Node::Text(text.into_owned()));
                }
            }
            Event::CData(c) => {
                if let Some(parent) = stack.last_mut() {
                    let text = String::from_utf8_lossy(&c.into_inner()).into_owned();
                    parent.children.push(Node::Text(text));
                }
            }
            Event::Comment(c) => {
                if let Some(parent) = stack.last_mut() {
                    let text = String::from_utf8_lossy(&c.into_inner()).into_owned();
                    parent.children.push(Node::Comment(text));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(xml_error(part, "unexpected end of document"));
    }
    root.ok_or_else(|| xml_error(part, "no root element"))
}

/// Whether `c` may appear in an XML 1.0 document.
pub fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}')
}

/// `text` without the characters XML 1.0 forbids.
pub fn strip_invalid_chars(text: &str) -> Cow<'_, str> {
    if text.chars().all(is_xml_char) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.chars().filter(|&c| is_xml_char(c)).collect())
    }
}

/// Serialize an element tree with an XML declaration.
pub fn to_bytes(root: &Element) -> Vec<u8> {
    let mut out = String::from(XML_DECLARATION);
    write_element(&mut out, root);
    out.into_bytes()
}

fn write_element(out: &mut String, element: &Element) {
    out.push('<');
    out.push_str(&element.name);
    for (key, value) in &element.attributes {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(&escape(strip_invalid_chars(value).as_ref()));
        out.push('"');
    }
    if element.children.is_empty() {
        out.push_str("/>");
        return;
    }
    out.push('>');
    for child in &element.children {
        match child {
            Node::Element(e) => write_element(out, e),
            Node::Text(t) => out.push_str(&escape(strip_invalid_chars(t).as_ref())),
            Node::Comment(c) => {
                out.push_str("<!--");
                out.push_str(&strip_invalid_chars(c));
                out.push_str("-->");
            }
        }
    }
    out.push_str("</");
    out.push_str(&element.name);
    out.push('>');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_chars_dropped_on_write() {
        assert!(matches!(strip_invalid_chars("plain\ttekst\n"), Cow::Borrowed(_)));
        assert_eq!(strip_invalid_chars("a\u{0C}b\u{0B}c\u{FFFE}d"), "abcd");

        let element = Element::new("w:t")
            .with_attr("w:val", "x\u{01}y")
            .with_text("side\u{0C}skift");
        let bytes = to_bytes(&element);
        let reparsed = parse(&bytes, "test.xml").unwrap();
        assert_eq!(reparsed.attr("w:val"), Some("xy"));
        assert_eq!(reparsed.text(), "sideskift");
    }

    #[test]
    fn test_parse_and_serialize() {
        let xml = br#"<?xml version="1.0"?><w:p a="1 &amp; 2"><w:r><w:t xml:space="preserve"> hi &lt;there&gt; </w:t></w:r><w:br/></w:p>"#;
        let root = parse(xml, "test.xml").unwrap();
        assert_eq!(root.name, "w:p");
        assert_eq!(root.attr("a"), Some("1 & 2"));
        let t = root.find_descendant(|e| e.is("w:t")).unwrap();
        assert_eq!(t.text(), " hi <there> ");

        let out = String::from_utf8(to_bytes(&root)).unwrap();
        assert!(out.starts_with("<?xml"));
        assert!(out.contains(r#"<w:p a="1 &amp; 2">"#));
        assert!(out.contains("hi &lt;there&gt; "));
        assert!(out.contains("<w:br/>"));

        let reparsed = parse(out.as_bytes(), "test.xml").unwrap();
        assert_eq!(reparsed, root);
    }

    #[test]
    fn test_malformed_xml_is_reported_with_part() {
        let err = parse(b"<a><b></a>", "word/document.xml").unwrap_err();
        match err {
            Error::Xml { part, .. } => assert_eq!(part, "word/document.xml"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_insert_before_any_and_remove() {
        let mut settings = Element::new("w:settings")
            .with_child(Element::new("w:zoom"))
            .with_child(Element::new("w:compat"));
        settings.insert_before_any(Element::new("w:updateFields"), &["w:compat"]);
        let names: Vec<&str> = settings.elements().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["w:zoom", "w:updateFields", "w:compat"]);

        assert_eq!(settings.remove_children("w:updateFields"), 1);
        assert!(settings.child("w:updateFields").is_none());
    }

    #[test]
    fn test_ensure_child() {
        let mut doc = Element::new("w:document");
        doc.ensure_child("w:body").push(Element::new("w:p"));
        doc.ensure_child("w:body").push(Element::new("w:p"));
        assert_eq!(doc.children.len(), 1);
        assert_eq!(doc.child("w:body").unwrap().elements().count(), 2);
    }
}
