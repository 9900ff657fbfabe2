// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::collections::{HashMap, HashSet};

use crate::{Attribute, Document, Error, Namespace, NodeData, NodeId, NodeKind, SVG_NS, XML_NS};

impl Document {
    /// Parses a [`Document`] from a string.
    ///
    /// Every element below the root one that doesn't have an `id` gets
    /// `element-{index}`, where `index` is the element position in the document order,
    /// not counting the root element.
    /// When the input already uses this ID, `element-{index}-{n}` with the smallest free `n`
    /// is used instead.
    pub fn parse_str(text: &str) -> Result<Document, Error> {
        let xml_opt = roxmltree::ParsingOptions {
            allow_dtd: true,
            ..Default::default()
        };

        let xml = roxmltree::Document::parse_with_options(text, xml_opt)?;
        parse(&xml)
    }

    /// Parses a [`Document`] from a [`roxmltree::Document`].
    pub fn parse_tree(xml: &roxmltree::Document) -> Result<Document, Error> {
        parse(xml)
    }
}

fn parse(xml: &roxmltree::Document) -> Result<Document, Error> {
    let mut doc = Document {
        nodes: Vec::new(),
        links: HashMap::new(),
    };

    // Add a root node.
    doc.nodes.push(NodeData {
        parent: None,
        next_sibling: None,
        children: None,
        kind: NodeKind::Root,
    });

    let svg = xml.root_element();
    if svg.tag_name().name() != "svg" {
        return Err(Error::NoRootSvgElement);
    }

    let mut namespaces = declared_namespaces(svg, None);
    let tag_name = qualified_tag_name(svg);
    // A standalone SVG file must declare its namespace.
    // Otherwise no renderer would treat it as SVG.
    if !tag_name.contains(':') && !namespaces.iter().any(|ns| ns.prefix.is_none()) {
        namespaces.insert(
            0,
            Namespace {
                prefix: None,
                uri: SVG_NS.to_string(),
            },
        );
    }

    let root_id = doc.root().node_id();
    let svg_id = doc.append(
        root_id,
        NodeKind::Element {
            tag_name,
            namespaces,
            attributes: collect_attributes(svg),
        },
    );

    let mut ctx = Context {
        elements: 0,
        ids: xml
            .descendants()
            .filter_map(|n| n.attribute("id"))
            .map(str::to_string)
            .collect(),
    };
    parse_xml_node_children(svg, svg_id, 1, &mut ctx, &mut doc)?;

    doc.collect_links();

    Ok(doc)
}

struct Context {
    elements: usize,
    /// IDs that are already taken.
    ids: HashSet<String>,
}

impl Context {
    fn generate_id(&mut self, index: usize) -> String {
        let mut id = format!("element-{}", index);
        let mut n = 1;
        while self.ids.contains(&id) {
            id = format!("element-{}-{}", index, n);
            n += 1;
        }

        self.ids.insert(id.clone());
        id
    }
}

fn parse_xml_node_children(
    parent: roxmltree::Node,
    parent_id: NodeId,
    depth: u32,
    ctx: &mut Context,
    doc: &mut Document,
) -> Result<(), Error> {
    for node in parent.children() {
        parse_xml_node(node, parent_id, depth, ctx, doc)?;
    }

    Ok(())
}

fn parse_xml_node(
    node: roxmltree::Node,
    parent_id: NodeId,
    depth: u32,
    ctx: &mut Context,
    doc: &mut Document,
) -> Result<(), Error> {
    if depth > 1024 {
        return Err(Error::NestingLimitReached);
    }

    if node.is_text() {
        if let Some(text) = node.text() {
            doc.append(parent_id, NodeKind::Text(text.to_string()));
        }
        return Ok(());
    }

    if !node.is_element() {
        return Ok(());
    }

    if ctx.elements >= 1_000_000 {
        return Err(Error::ElementsLimitReached);
    }

    let index = ctx.elements;
    ctx.elements += 1;

    let mut attributes = collect_attributes(node);
    if !attributes.iter().any(|a| a.name == "id") {
        attributes.push(Attribute {
            name: "id".to_string(),
            value: ctx.generate_id(index),
        });
    }

    let node_id = doc.append(
        parent_id,
        NodeKind::Element {
            tag_name: qualified_tag_name(node),
            namespaces: declared_namespaces(node, node.parent_element()),
            attributes,
        },
    );

    parse_xml_node_children(node, node_id, depth + 1, ctx, doc)
}

fn collect_attributes(node: roxmltree::Node) -> Vec<Attribute> {
    let mut attributes = Vec::new();
    for attr in node.attributes() {
        let name = match attribute_prefix(node, attr.namespace()) {
            Some(prefix) => format!("{}:{}", prefix, attr.name()),
            None => attr.name().to_string(),
        };

        attributes.push(Attribute {
            name,
            value: attr.value().to_string(),
        });
    }

    attributes
}

fn qualified_tag_name(node: roxmltree::Node) -> String {
    let name = node.tag_name().name();
    match element_prefix(node) {
        Some(prefix) => format!("{}:{}", prefix, name),
        None => name.to_string(),
    }
}

/// Resolves the prefix an element was written with.
///
/// The default namespace wins when the same URI is bound to a prefix as well.
fn element_prefix(node: roxmltree::Node) -> Option<String> {
    let uri = node.tag_name().namespace()?;
    if node
        .namespaces()
        .any(|ns| ns.name().is_none() && ns.uri() == uri)
    {
        return None;
    }

    node.namespaces()
        .find(|ns| ns.name().is_some() && ns.uri() == uri)
        .and_then(|ns| ns.name())
        .map(str::to_string)
}

fn attribute_prefix(node: roxmltree::Node, uri: Option<&str>) -> Option<String> {
    let uri = uri?;
    if uri == XML_NS {
        return Some("xml".to_string());
    }

    // Unprefixed attributes never belong to a namespace,
    // so only prefixed bindings are checked.
    node.namespaces()
        .find(|ns| ns.name().is_some() && ns.uri() == uri)
        .and_then(|ns| ns.name())
        .map(str::to_string)
}

/// Returns namespaces that are in scope of `node`, but not of its `parent`.
fn declared_namespaces(node: roxmltree::Node, parent: Option<roxmltree::Node>) -> Vec<Namespace> {
    let mut list = Vec::new();
    for ns in node.namespaces() {
        if ns.name() == Some("xml") {
            continue;
        }

        let inherited = parent.map_or(false, |p| {
            p.namespaces()
                .any(|pns| pns.name() == ns.name() && pns.uri() == ns.uri())
        });

        if !inherited {
            list.push(Namespace {
                prefix: ns.name().map(str::to_string),
                uri: ns.uri().to_string(),
            });
        }
    }

    list
}
