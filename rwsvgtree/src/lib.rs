// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Represents an [SVG](https://www.w3.org/TR/SVG11/Overview.html) document as a mutable tree.

`rwsvgtree` uses [`roxmltree`](https://github.com/RazrFalcon/roxmltree) for parsing,
but instead of a read-only XML tree it produces an owned SVG tree that can be edited
in place and written back to a string.

Every element below the root `svg` element is guaranteed to have an `id`,
so it can be addressed by an editor.
*/

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![warn(missing_copy_implementations)]

use std::collections::HashMap;
use std::num::NonZeroU32;
use std::str::FromStr;

mod parse;
mod writer;

pub use roxmltree;
pub use svgtypes;
pub use writer::WriteOptions;

/// The SVG namespace URI.
pub const SVG_NS: &str = "http://www.w3.org/2000/svg";
/// The XLink namespace URI.
pub const XLINK_NS: &str = "http://www.w3.org/1999/xlink";
/// The XML namespace URI. Bound to the `xml` prefix implicitly.
pub const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// List of all errors.
#[derive(Debug)]
pub enum Error {
    /// The input is not a well-formed XML.
    MalformedXml(roxmltree::Error),

    /// The root element is not `svg`.
    NoRootSvgElement,

    /// We do not allow SVG with more than 1_000_000 elements for security reasons.
    ElementsLimitReached,

    /// We do not allow elements nested deeper than 1024 levels.
    NestingLimitReached,
}

impl From<roxmltree::Error> for Error {
    fn from(e: roxmltree::Error) -> Self {
        Error::MalformedXml(e)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            Error::MalformedXml(ref e) => {
                write!(f, "SVG data parsing failed cause {}", e)
            }
            Error::NoRootSvgElement => {
                write!(f, "the root element is not an svg element")
            }
            Error::ElementsLimitReached => {
                write!(f, "the maximum number of SVG elements has been reached")
            }
            Error::NestingLimitReached => {
                write!(f, "the maximum elements nesting depth has been reached")
            }
        }
    }
}

impl std::error::Error for Error {}

/// An SVG tree container.
///
/// Contains only element and text nodes.
/// Comments and processing instructions are not preserved.
#[derive(Clone)]
pub struct Document {
    nodes: Vec<NodeData>,
    links: HashMap<String, NodeId>,
}

impl Document {
    /// Returns the root node.
    #[inline]
    pub fn root(&self) -> Node {
        self.get(NodeId::new(0))
    }

    /// Returns the root `svg` element.
    #[inline]
    pub fn root_element(&self) -> Node {
        // `unwrap` is safe, because `Document` is guarantee to have the `svg` element.
        self.root().first_element_child().unwrap()
    }

    /// Returns an iterator over document's descendant nodes.
    ///
    /// Shorthand for `doc.root().descendants()`.
    #[inline]
    pub fn descendants(&self) -> Descendants {
        self.root().descendants()
    }

    /// Returns an element by ID.
    ///
    /// Unlike the [`Descendants`] iterator, this is just a HashMap lookup.
    /// When several elements share an ID, the first one in document order is returned.
    #[inline]
    pub fn element_by_id(&self, id: &str) -> Option<Node> {
        let node_id = self.links.get(id)?;
        Some(self.get(*node_id))
    }

    /// Returns a node by its handle.
    ///
    /// # Panics
    ///
    /// When `id` belongs to a different document.
    #[inline]
    pub fn get(&self, id: NodeId) -> Node {
        Node {
            id,
            d: &self.nodes[id.get_usize()],
            doc: self,
        }
    }

    /// Returns the root element `viewBox`, if it is set and valid.
    pub fn view_box(&self) -> Option<svgtypes::ViewBox> {
        let value = self.root_element().attribute("viewBox")?;
        match svgtypes::ViewBox::from_str(value) {
            Ok(vb) => Some(vb),
            Err(e) => {
                log::warn!("Failed to parse viewBox value: '{}' cause {}.", value, e);
                None
            }
        }
    }

    /// Sets an element attribute, overwriting an existing value.
    ///
    /// New attributes are appended after the existing ones.
    /// Does nothing for non-element nodes.
    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        let attributes = match self.nodes[node.get_usize()].kind {
            NodeKind::Element {
                ref mut attributes, ..
            } => attributes,
            _ => return,
        };

        if let Some(attr) = attributes.iter_mut().find(|a| a.name == name) {
            attr.value = value.to_string();
        } else {
            attributes.push(Attribute {
                name: name.to_string(),
                value: value.to_string(),
            });
        }

        if name == "id" {
            self.collect_links();
        }
    }

    /// Declares a namespace on an element.
    ///
    /// An existing declaration of the same prefix is overwritten.
    /// Does nothing for non-element nodes.
    pub fn declare_namespace(&mut self, node: NodeId, prefix: Option<&str>, uri: &str) {
        let namespaces = match self.nodes[node.get_usize()].kind {
            NodeKind::Element {
                ref mut namespaces, ..
            } => namespaces,
            _ => return,
        };

        if let Some(ns) = namespaces.iter_mut().find(|ns| ns.prefix.as_deref() == prefix) {
            ns.uri = uri.to_string();
        } else {
            namespaces.push(Namespace {
                prefix: prefix.map(str::to_string),
                uri: uri.to_string(),
            });
        }
    }

    /// Removes an element attribute and returns its previous value.
    pub fn remove_attribute(&mut self, node: NodeId, name: &str) -> Option<String> {
        let attributes = match self.nodes[node.get_usize()].kind {
            NodeKind::Element {
                ref mut attributes, ..
            } => attributes,
            _ => return None,
        };

        let idx = attributes.iter().position(|a| a.name == name)?;
        let attr = attributes.remove(idx);

        if name == "id" {
            self.collect_links();
        }

        Some(attr.value)
    }

    /// Replaces all children of an element with a single text node.
    ///
    /// An empty `text` leaves the element without children.
    pub fn set_text(&mut self, node: NodeId, text: &str) {
        if !matches!(self.nodes[node.get_usize()].kind, NodeKind::Element { .. }) {
            return;
        }

        // Reuse a lone text child.
        if let Some((first, last)) = self.nodes[node.get_usize()].children {
            if first == last && !text.is_empty() {
                if let NodeKind::Text(ref mut s) = self.nodes[first.get_usize()].kind {
                    *s = text.to_string();
                    return;
                }
            }
        }

        let had_elements = self.get(node).children().any(|n| n.is_element());

        // Detached nodes stay in the arena, but are no longer reachable.
        self.nodes[node.get_usize()].children = None;

        if !text.is_empty() {
            self.append(node, NodeKind::Text(text.to_string()));
        }

        if had_elements {
            self.collect_links();
        }
    }

    /// Writes the document back to an SVG string.
    pub fn to_string(&self, opt: &WriteOptions) -> String {
        writer::convert(self, opt, false)
    }

    /// Writes the document to an SVG string suitable for an interactive surface.
    ///
    /// Every element below the root gets a pointer cursor.
    /// The document itself is not modified.
    pub fn to_interactive_string(&self, opt: &WriteOptions) -> String {
        writer::convert(self, opt, true)
    }

    pub(crate) fn append(&mut self, parent_id: NodeId, kind: NodeKind) -> NodeId {
        let new_child_id = NodeId::from(self.nodes.len());
        self.nodes.push(NodeData {
            parent: Some(parent_id),
            next_sibling: None,
            children: None,
            kind,
        });

        let last_child_id = self.nodes[parent_id.get_usize()].children.map(|(_, id)| id);

        if let Some(id) = last_child_id {
            self.nodes[id.get_usize()].next_sibling = Some(new_child_id);
        }

        self.nodes[parent_id.get_usize()].children = Some(
            if let Some((first_child_id, _)) = self.nodes[parent_id.get_usize()].children {
                (first_child_id, new_child_id)
            } else {
                (new_child_id, new_child_id)
            },
        );

        new_child_id
    }

    pub(crate) fn collect_links(&mut self) {
        let mut links = HashMap::new();
        for node in self.descendants() {
            if let Some(id) = node.attribute("id") {
                links.entry(id.to_string()).or_insert(node.id);
            }
        }
        self.links = links;
    }
}

impl PartialEq for Document {
    /// Compares reachable nodes only.
    fn eq(&self, other: &Self) -> bool {
        fn node_eq(a: Node, b: Node) -> bool {
            match (&a.d.kind, &b.d.kind) {
                (NodeKind::Root, NodeKind::Root) => {}
                (NodeKind::Text(ref t1), NodeKind::Text(ref t2)) => return t1 == t2,
                (
                    NodeKind::Element {
                        tag_name: ref n1,
                        namespaces: ref ns1,
                        attributes: ref a1,
                    },
                    NodeKind::Element {
                        tag_name: ref n2,
                        namespaces: ref ns2,
                        attributes: ref a2,
                    },
                ) => {
                    if n1 != n2 || ns1 != ns2 || a1 != a2 {
                        return false;
                    }
                }
                _ => return false,
            }

            let mut c1 = a.children();
            let mut c2 = b.children();
            loop {
                match (c1.next(), c2.next()) {
                    (Some(x), Some(y)) => {
                        if !node_eq(x, y) {
                            return false;
                        }
                    }
                    (None, None) => return true,
                    _ => return false,
                }
            }
        }

        node_eq(self.root(), other.root())
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        if !self.root().has_children() {
            return write!(f, "Document []");
        }

        macro_rules! writeln_indented {
            ($depth:expr, $f:expr, $fmt:expr) => {
                for _ in 0..$depth { write!($f, "    ")?; }
                writeln!($f, $fmt)?;
            };
            ($depth:expr, $f:expr, $fmt:expr, $($arg:tt)*) => {
                for _ in 0..$depth { write!($f, "    ")?; }
                writeln!($f, $fmt, $($arg)*)?;
            };
        }

        fn print_children(
            parent: Node,
            depth: usize,
            f: &mut std::fmt::Formatter,
        ) -> Result<(), std::fmt::Error> {
            for child in parent.children() {
                if child.is_element() {
                    writeln_indented!(depth, f, "Element {{");
                    writeln_indented!(depth, f, "    tag_name: {:?}", child.tag_name());

                    if !child.attributes().is_empty() {
                        writeln_indented!(depth + 1, f, "attributes: [");
                        for attr in child.attributes() {
                            writeln_indented!(depth + 2, f, "{:?}", attr);
                        }
                        writeln_indented!(depth + 1, f, "]");
                    }

                    if child.has_children() {
                        writeln_indented!(depth, f, "    children: [");
                        print_children(child, depth + 2, f)?;
                        writeln_indented!(depth, f, "    ]");
                    }

                    writeln_indented!(depth, f, "}}");
                } else {
                    writeln_indented!(depth, f, "{:?}", child);
                }
            }

            Ok(())
        }

        writeln!(f, "Document [")?;
        print_children(self.root(), 1, f)?;
        writeln!(f, "]")?;

        Ok(())
    }
}

/// A node handle.
///
/// Stays valid for the lifetime of the document it was taken from,
/// but does not borrow it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NodeId(NonZeroU32);

impl NodeId {
    #[inline]
    fn new(id: u32) -> Self {
        debug_assert!(id < u32::MAX);

        // We are using `NonZeroU32` to reduce overhead of `Option<NodeId>`.
        NodeId(NonZeroU32::new(id + 1).unwrap())
    }

    #[inline]
    fn get(self) -> u32 {
        self.0.get() - 1
    }

    #[inline]
    fn get_usize(self) -> usize {
        self.get() as usize
    }
}

impl From<usize> for NodeId {
    #[inline]
    fn from(id: usize) -> Self {
        // We already checked that `id` is limited by u32::MAX.
        debug_assert!(id <= u32::MAX as usize);
        NodeId::new(id as u32)
    }
}

#[derive(Clone, Debug)]
pub(crate) enum NodeKind {
    Root,
    Element {
        tag_name: String,
        namespaces: Vec<Namespace>,
        attributes: Vec<Attribute>,
    },
    Text(String),
}

#[derive(Clone, Debug)]
struct NodeData {
    parent: Option<NodeId>,
    next_sibling: Option<NodeId>,
    children: Option<(NodeId, NodeId)>,
    kind: NodeKind,
}

/// An attribute.
///
/// Prefixed attributes keep their qualified name, like `xlink:href`.
#[derive(Clone, PartialEq, Debug)]
pub struct Attribute {
    /// Attribute's qualified name.
    pub name: String,
    /// Attribute's value.
    pub value: String,
}

/// A namespace declaration.
#[derive(Clone, PartialEq, Debug)]
pub struct Namespace {
    /// Namespace prefix. `None` for the default namespace.
    pub prefix: Option<String>,
    /// Namespace URI.
    pub uri: String,
}

/// An SVG node.
#[derive(Clone, Copy)]
pub struct Node<'a> {
    id: NodeId,
    doc: &'a Document,
    d: &'a NodeData,
}

impl Eq for Node<'_> {}

impl PartialEq for Node<'_> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && std::ptr::eq(self.doc, other.doc) && std::ptr::eq(self.d, other.d)
    }
}

impl<'a> Node<'a> {
    /// Returns node's handle.
    #[inline]
    pub fn node_id(&self) -> NodeId {
        self.id
    }

    /// Checks if the current node is an element.
    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self.d.kind, NodeKind::Element { .. })
    }

    /// Checks if the current node is a text.
    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self.d.kind, NodeKind::Text(_))
    }

    /// Returns node's document.
    #[inline]
    pub fn document(&self) -> &'a Document {
        self.doc
    }

    /// Returns element's qualified tag name, unless the current node is text.
    #[inline]
    pub fn tag_name(&self) -> Option<&'a str> {
        match self.d.kind {
            NodeKind::Element { ref tag_name, .. } => Some(tag_name),
            _ => None,
        }
    }

    /// Returns element's local tag name, like `rect` for `svg:rect`.
    ///
    /// Returns an empty string for non-element nodes.
    #[inline]
    pub fn kind(&self) -> &'a str {
        self.tag_name().map(local_name).unwrap_or("")
    }

    /// Returns element's `id` attribute value.
    ///
    /// Returns an empty string otherwise.
    #[inline]
    pub fn element_id(&self) -> &'a str {
        self.attribute("id").unwrap_or("")
    }

    /// Returns an attribute value.
    #[inline]
    pub fn attribute(&self, name: &str) -> Option<&'a str> {
        self.attributes()
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Resolves a namespace prefix in the scope of this element.
    ///
    /// `None` stands for the default namespace.
    /// The `xml` prefix is always bound.
    pub fn namespace_uri(&self, prefix: Option<&str>) -> Option<&'a str> {
        if prefix == Some("xml") {
            return Some(XML_NS);
        }

        self.ancestors()
            .flat_map(|n| n.namespaces().iter())
            .find(|ns| ns.prefix.as_deref() == prefix)
            .map(|ns| ns.uri.as_str())
    }

    /// Returns a list of all element's attributes.
    #[inline]
    pub fn attributes(&self) -> &'a [Attribute] {
        match self.d.kind {
            NodeKind::Element { ref attributes, .. } => attributes,
            _ => &[],
        }
    }

    /// Returns namespaces declared on this element.
    #[inline]
    pub fn namespaces(&self) -> &'a [Namespace] {
        match self.d.kind {
            NodeKind::Element { ref namespaces, .. } => namespaces,
            _ => &[],
        }
    }

    /// Returns node's text content.
    ///
    /// For text nodes returns its content.
    /// For elements returns the concatenated content of all descendant text nodes.
    pub fn text(&self) -> String {
        match self.d.kind {
            NodeKind::Text(ref text) => text.clone(),
            NodeKind::Element { .. } => {
                let mut s = String::new();
                for node in self.descendants() {
                    if let NodeKind::Text(ref text) = node.d.kind {
                        s.push_str(text);
                    }
                }
                s
            }
            NodeKind::Root => String::new(),
        }
    }

    /// Returns a parent node.
    #[inline]
    pub fn parent(&self) -> Option<Self> {
        self.d.parent.map(|id| self.doc.get(id))
    }

    /// Returns the parent element.
    #[inline]
    pub fn parent_element(&self) -> Option<Self> {
        self.ancestors().skip(1).find(|n| n.is_element())
    }

    /// Returns the next sibling.
    #[inline]
    pub fn next_sibling(&self) -> Option<Self> {
        self.d.next_sibling.map(|id| self.doc.get(id))
    }

    /// Returns the first child.
    #[inline]
    pub fn first_child(&self) -> Option<Self> {
        self.d.children.map(|(id, _)| self.doc.get(id))
    }

    /// Returns the first child element.
    #[inline]
    pub fn first_element_child(&self) -> Option<Self> {
        self.children().find(|n| n.is_element())
    }

    /// Returns the last child.
    #[inline]
    pub fn last_child(&self) -> Option<Self> {
        self.d.children.map(|(_, id)| self.doc.get(id))
    }

    /// Checks if the node has child nodes.
    #[inline]
    pub fn has_children(&self) -> bool {
        self.d.children.is_some()
    }

    /// Returns an iterator over ancestor nodes starting at this node.
    #[inline]
    pub fn ancestors(&self) -> Ancestors<'a> {
        Ancestors(Some(*self))
    }

    /// Returns an iterator over children nodes.
    #[inline]
    pub fn children(&self) -> Children<'a> {
        Children {
            front: self.first_child(),
            back: self.last_child(),
        }
    }

    /// Returns an iterator which traverses the subtree starting at this node.
    #[inline]
    fn traverse(&self) -> Traverse<'a> {
        Traverse {
            root: *self,
            edge: None,
        }
    }

    /// Returns an iterator over this node and its descendants.
    #[inline]
    pub fn descendants(&self) -> Descendants<'a> {
        Descendants(self.traverse())
    }
}

impl std::fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        match self.d.kind {
            NodeKind::Root => write!(f, "Root"),
            NodeKind::Element { .. } => {
                write!(
                    f,
                    "Element {{ tag_name: {:?}, attributes: {:?} }}",
                    self.tag_name(),
                    self.attributes()
                )
            }
            NodeKind::Text(ref text) => write!(f, "Text({:?})", text),
        }
    }
}

/// An iterator over ancestor nodes.
#[derive(Clone, Debug)]
pub struct Ancestors<'a>(Option<Node<'a>>);

impl<'a> Iterator for Ancestors<'a> {
    type Item = Node<'a>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let node = self.0.take();
        self.0 = node.as_ref().and_then(Node::parent);
        node
    }
}

/// An iterator over children nodes.
#[derive(Clone, Debug)]
pub struct Children<'a> {
    front: Option<Node<'a>>,
    back: Option<Node<'a>>,
}

impl<'a> Iterator for Children<'a> {
    type Item = Node<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.front.take();
        if self.front == self.back {
            self.back = None;
        } else {
            self.front = node.as_ref().and_then(Node::next_sibling);
        }
        node
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
enum Edge<'a> {
    Open(Node<'a>),
    Close(Node<'a>),
}

#[derive(Clone, Debug)]
struct Traverse<'a> {
    root: Node<'a>,
    edge: Option<Edge<'a>>,
}

impl<'a> Iterator for Traverse<'a> {
    type Item = Edge<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.edge {
            Some(Edge::Open(node)) => {
                self.edge = Some(match node.first_child() {
                    Some(first_child) => Edge::Open(first_child),
                    None => Edge::Close(node),
                });
            }
            Some(Edge::Close(node)) => {
                if node == self.root {
                    self.edge = None;
                } else if let Some(next_sibling) = node.next_sibling() {
                    self.edge = Some(Edge::Open(next_sibling));
                } else {
                    self.edge = node.parent().map(Edge::Close);
                }
            }
            None => {
                self.edge = Some(Edge::Open(self.root));
            }
        }

        self.edge
    }
}

/// A descendants iterator.
#[derive(Clone, Debug)]
pub struct Descendants<'a>(Traverse<'a>);

impl<'a> Iterator for Descendants<'a> {
    type Item = Node<'a>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        for edge in &mut self.0 {
            if let Edge::Open(node) = edge {
                return Some(node);
            }
        }

        None
    }
}

/// Strips a namespace prefix from a qualified name.
#[inline]
pub fn local_name(qname: &str) -> &str {
    match qname.split_once(':') {
        Some((_, local)) => local,
        None => qname,
    }
}

/// Checks that a string is an XML 1.0 `Name`.
///
/// Colons are allowed, so QNames pass as well.
pub fn is_xml_name(s: &str) -> bool {
    fn is_name_start_char(c: char) -> bool {
        matches!(c,
            ':' | 'A'..='Z' | '_' | 'a'..='z'
            | '\u{C0}'..='\u{D6}' | '\u{D8}'..='\u{F6}' | '\u{F8}'..='\u{2FF}'
            | '\u{370}'..='\u{37D}' | '\u{37F}'..='\u{1FFF}' | '\u{200C}'..='\u{200D}'
            | '\u{2070}'..='\u{218F}' | '\u{2C00}'..='\u{2FEF}' | '\u{3001}'..='\u{D7FF}'
            | '\u{F900}'..='\u{FDCF}' | '\u{FDF0}'..='\u{FFFD}' | '\u{10000}'..='\u{EFFFF}'
        )
    }

    fn is_name_char(c: char) -> bool {
        is_name_start_char(c)
            || matches!(c,
                '-' | '.' | '0'..='9' | '\u{B7}' | '\u{300}'..='\u{36F}' | '\u{203F}'..='\u{2040}'
            )
    }

    let mut chars = s.chars();
    match chars.next() {
        Some(c) if is_name_start_char(c) => chars.all(is_name_char),
        _ => false,
    }
}

/// Checks that a string contains only characters allowed in an XML 1.0 document.
pub fn is_xml_chars(s: &str) -> bool {
    s.chars().all(|c| {
        matches!(c,
            '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'
        )
    })
}
