// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use rwsvgtree::{Attribute, Node};

/// A property key that addresses element text instead of an attribute.
pub const TEXT_CONTENT: &str = "textContent";

/// A detached view of a selected element.
///
/// Captured from the live document on selection and kept in sync
/// with edits applied to the same element.
#[derive(Clone, PartialEq, Debug)]
pub struct ElementSnapshot {
    /// Element's local tag name, like `rect` or `text`.
    pub kind: String,

    /// Element's ID.
    pub id: String,

    /// Element's attributes in the document order.
    ///
    /// Contains the `id` attribute as well.
    pub attributes: Vec<Attribute>,

    /// Element's text content.
    ///
    /// Set only for `text` elements.
    pub text_content: Option<String>,
}

impl ElementSnapshot {
    /// Captures an element.
    pub fn capture(node: Node) -> Self {
        let kind = node.kind().to_string();
        let text_content = if kind == "text" {
            Some(node.text())
        } else {
            None
        };

        ElementSnapshot {
            kind,
            id: node.element_id().to_string(),
            attributes: node.attributes().to_vec(),
            text_content,
        }
    }

    /// Checks that this is a `text` element.
    #[inline]
    pub fn is_text(&self) -> bool {
        self.kind == "text"
    }

    /// Returns an attribute value.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Mirrors an edit that was applied to the live element.
    pub(crate) fn update(&mut self, key: &str, value: &str) {
        if key == TEXT_CONTENT {
            if self.is_text() {
                self.text_content = Some(value.to_string());
            }
            return;
        }

        if key == "id" {
            self.id = value.to_string();
        }

        match self.attributes.iter_mut().find(|a| a.name == key) {
            Some(attr) => attr.value = value.to_string(),
            None => self.attributes.push(Attribute {
                name: key.to_string(),
                value: value.to_string(),
            }),
        }
    }
}
