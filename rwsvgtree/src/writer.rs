// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use xmlwriter::XmlWriter;

use crate::{Document, Node, NodeKind};

const POINTER_STYLE: &str = "cursor:pointer";

/// XML writing options.
#[derive(Clone, Copy, Debug)]
pub struct WriteOptions {
    /// Use single quote marks instead of double quote.
    ///
    /// # Examples
    ///
    /// Before:
    ///
    /// ```text
    /// <rect fill="red"/>
    /// ```
    ///
    /// After:
    ///
    /// ```text
    /// <rect fill='red'/>
    /// ```
    ///
    /// Default: disabled
    pub use_single_quote: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            use_single_quote: false,
        }
    }
}

// No indention is used, since whitespace text nodes are part of the tree already.
pub(crate) fn convert(doc: &Document, opt: &WriteOptions, interactive: bool) -> String {
    let mut xml = XmlWriter::new(xmlwriter::Options {
        use_single_quote: opt.use_single_quote,
        indent: xmlwriter::Indent::None,
        attributes_indent: xmlwriter::Indent::None,
    });

    let svg = doc.root_element();
    write_element(svg, false, &mut xml);
    for child in svg.children() {
        write_node(child, interactive, &mut xml);
    }

    xml.end_document()
}

fn write_node(node: Node, interactive: bool, xml: &mut XmlWriter) {
    match node.d.kind {
        NodeKind::Element { .. } => {
            write_element(node, interactive, xml);
            for child in node.children() {
                write_node(child, interactive, xml);
            }
            xml.end_element();
        }
        NodeKind::Text(ref text) => {
            // `XmlWriter` escapes only `<` in text.
            // A raw `\r` would be normalized to `\n` by the next parser.
            xml.write_text(
                &text
                    .replace('&', "&amp;")
                    .replace('>', "&gt;")
                    .replace('\r', "&#13;"),
            );
        }
        NodeKind::Root => {}
    }
}

/// Writes the element start tag with all its attributes.
fn write_element(node: Node, interactive: bool, xml: &mut XmlWriter) {
    let tag_name = match node.tag_name() {
        Some(v) => v,
        None => return,
    };

    xml.start_element(tag_name);

    for ns in node.namespaces() {
        match ns.prefix {
            Some(ref prefix) => {
                xml.write_attribute(&format!("xmlns:{}", prefix), &escape_attribute(&ns.uri))
            }
            None => xml.write_attribute("xmlns", &escape_attribute(&ns.uri)),
        }
    }

    let mut has_style = false;
    for attr in node.attributes() {
        if interactive && attr.name == "style" {
            has_style = true;
            let style = attr.value.trim_end().trim_end_matches(';');
            let style = escape_attribute(style);
            if style.is_empty() {
                xml.write_attribute("style", POINTER_STYLE);
            } else {
                xml.write_attribute_fmt("style", format_args!("{};{}", style, POINTER_STYLE));
            }
        } else {
            xml.write_attribute(&attr.name, &escape_attribute(&attr.value));
        }
    }

    if interactive && !has_style {
        xml.write_attribute("style", POINTER_STYLE);
    }
}

/// `XmlWriter` escapes only quotes in attribute values.
///
/// Whitespace other than a space is written as a character reference,
/// because attribute value normalization replaces it with a space.
fn escape_attribute(value: &str) -> String {
    let mut s = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => s.push_str("&amp;"),
            '<' => s.push_str("&lt;"),
            '\n' => s.push_str("&#10;"),
            '\t' => s.push_str("&#9;"),
            '\r' => s.push_str("&#13;"),
            _ => s.push(c),
        }
    }

    s
}
