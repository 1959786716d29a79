//! Lenient XML element tree.
//!
//! Upstream payloads (PubMed/PMC efetch, arXiv Atom) are consumed by element
//! name rather than by schema, so this module builds a small arena tree over
//! the `quick-xml` event stream and exposes name-based lookups in document
//! order. Namespace prefixes are dropped (`arxiv:comment` is `comment`).
//!
//! Parsing never fails: mismatched end tags are tolerated and a syntax error
//! ends the document at the point it was hit, keeping everything read so far.

use std::borrow::Cow;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

#[derive(Debug)]
enum Node {
    Text(String),
    Element(usize),
}

#[derive(Debug)]
struct ElementData {
    name: String,
    children: Vec<Node>,
}

/// A parsed XML document. Index 0 is a synthetic root holding the top-level nodes.
#[derive(Debug)]
pub struct XmlDocument {
    elements: Vec<ElementData>,
}

impl XmlDocument {
    /// Parse `xml`, keeping whatever was well-formed up to the first syntax error.
    #[must_use]
    pub fn parse(xml: &str) -> Self {
        let mut doc = Self { elements: vec![ElementData { name: String::new(), children: vec![] }] };
        let mut reader = Reader::from_str(xml);
        reader.config_mut().check_end_names = false;

        let mut stack: Vec<usize> = vec![0];

        loop {
            let parent = stack.last().copied().unwrap_or(0);
            match reader.read_event() {
                Ok(Event::Start(ref e)) => {
                    let idx = doc.push_element(parent, e);
                    stack.push(idx);
                }
                Ok(Event::Empty(ref e)) => {
                    doc.push_element(parent, e);
                }
                Ok(Event::End(ref e)) => {
                    let local = e.local_name();
                    // Close the nearest open element with this name; stray end tags are ignored.
                    let open = stack
                        .iter()
                        .rposition(|&i| i != 0 && doc.elements[i].name.as_bytes() == local.as_ref());
                    if let Some(pos) = open {
                        stack.truncate(pos);
                    }
                }
                Ok(Event::Text(ref e)) => {
                    let text = e
                        .unescape()
                        .map(Cow::into_owned)
                        .unwrap_or_else(|_| String::from_utf8_lossy(e).into_owned());
                    doc.push_text(parent, text);
                }
                Ok(Event::CData(ref e)) => {
                    doc.push_text(parent, String::from_utf8_lossy(e).into_owned());
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        position = reader.buffer_position(),
                        "Malformed XML, keeping partial document"
                    );
                    break;
                }
                _ => {}
            }
        }

        doc
    }

    fn push_element(&mut self, parent: usize, start: &BytesStart<'_>) -> usize {
        let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
        let idx = self.elements.len();
        self.elements.push(ElementData { name, children: vec![] });
        self.elements[parent].children.push(Node::Element(idx));
        idx
    }

    fn push_text(&mut self, parent: usize, text: String) {
        if !text.is_empty() {
            self.elements[parent].children.push(Node::Text(text));
        }
    }

    /// The synthetic document root.
    #[must_use]
    pub const fn root(&self) -> Element<'_> {
        Element { doc: self, idx: 0 }
    }

    /// First element named `name` anywhere in the document.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<Element<'_>> {
        self.root().find(name)
    }

    /// All elements named `name`, in document order.
    pub fn find_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = Element<'a>> + 'a {
        self.root().find_all(name)
    }

    /// Number of elements parsed (excluding the synthetic root).
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.elements.len() - 1
    }
}

/// Borrowed handle to one element of an [`XmlDocument`].
#[derive(Debug, Clone, Copy)]
pub struct Element<'a> {
    doc: &'a XmlDocument,
    idx: usize,
}

impl<'a> Element<'a> {
    /// Local name, without namespace prefix.
    #[must_use]
    pub fn name(&self) -> &'a str {
        &self.doc.elements[self.idx].name
    }

    /// All descendant elements in document (pre-)order, excluding `self`.
    #[must_use]
    pub fn descendants(&self) -> Descendants<'a> {
        let mut descendants = Descendants { doc: self.doc, stack: Vec::new() };
        descendants.push_children(self.idx);
        descendants
    }

    /// First descendant named `name`.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<Element<'a>> {
        self.descendants().find(|e| e.name() == name)
    }

    /// All descendants named `name`, in document order.
    pub fn find_all(self, name: &'a str) -> impl Iterator<Item = Element<'a>> + 'a {
        self.descendants().filter(move |e| e.name() == name)
    }

    /// Concatenated text of every descendant text node, unmodified.
    #[must_use]
    pub fn text(&self) -> String {
        let mut out = String::new();
        let mut stack: Vec<&Node> = self.doc.elements[self.idx].children.iter().rev().collect();
        while let Some(node) = stack.pop() {
            match node {
                Node::Text(t) => out.push_str(t),
                Node::Element(i) => stack.extend(self.doc.elements[*i].children.iter().rev()),
            }
        }
        out
    }
}

/// Pre-order iterator over descendant elements.
#[derive(Debug)]
pub struct Descendants<'a> {
    doc: &'a XmlDocument,
    stack: Vec<usize>,
}

impl Descendants<'_> {
    fn push_children(&mut self, idx: usize) {
        self.stack.extend(self.doc.elements[idx].children.iter().rev().filter_map(|n| match n {
            Node::Element(i) => Some(*i),
            Node::Text(_) => None,
        }));
    }
}

impl<'a> Iterator for Descendants<'a> {
    type Item = Element<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.stack.pop()?;
        self.push_children(idx);
        Some(Element { doc: self.doc, idx })
    }
}
