// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::str::FromStr;

use crate::selection::{ElementSnapshot, TEXT_CONTENT};
use crate::Error;

/// Colors offered for the `fill` property.
pub const FILL_PALETTE: &[&str] = &["#f0f9ff", "#60a5fa", "#1e40af", "#ffffff"];

/// Colors offered for the `stroke` property.
pub const STROKE_PALETTE: &[&str] = &["#60a5fa", "#1e40af", "#000000"];

/// Values offered for the `text-anchor` property.
pub const TEXT_ANCHORS: &[&str] = &["start", "middle", "end"];

const STROKE_WIDTH_MIN: u32 = 1;
const STROKE_WIDTH_MAX: u32 = 10;

// Keys with a dedicated field. Everything else is listed generically.
const KNOWN_KEYS: &[&str] = &["id", "x", "y", "fill", "stroke", "stroke-width", "text-anchor"];

/// A property field kind.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum FieldKind {
    /// A numeric input.
    Number,
    /// A free text input.
    Text,
    /// One of the listed values.
    Choice(&'static [&'static str]),
    /// One of the listed colors.
    Swatches(&'static [&'static str]),
    /// An integer in a range.
    #[allow(missing_docs)]
    Slider { min: u32, max: u32, step: u32 },
}

/// A single editable property.
#[derive(Clone, PartialEq, Debug)]
pub struct Field {
    element_id: String,

    /// A property name.
    ///
    /// An attribute name or `textContent`.
    pub key: String,

    /// A field kind.
    pub kind: FieldKind,

    /// A current value.
    pub value: String,
}

impl Field {
    fn new(element_id: &str, key: &str, kind: FieldKind, value: String) -> Self {
        Field {
            element_id: element_id.to_string(),
            key: key.to_string(),
            kind,
            value,
        }
    }

    /// Validates a new value and turns it into an edit.
    pub fn edit(&self, value: &str) -> Result<Edit, Error> {
        if !self.accepts(value) {
            log::warn!("'{}' is not a valid '{}' value.", value, self.key);
            return Err(Error::InvalidValue {
                key: self.key.clone(),
                value: value.to_string(),
            });
        }

        Ok(Edit {
            id: self.element_id.clone(),
            key: self.key.clone(),
            value: value.to_string(),
        })
    }

    /// Checks that a value can be set through this field.
    pub fn accepts(&self, value: &str) -> bool {
        match self.kind {
            FieldKind::Number => svgtypes::Number::from_str(value.trim()).is_ok(),
            FieldKind::Text => rwsvgtree::is_xml_chars(value),
            FieldKind::Choice(list) | FieldKind::Swatches(list) => list.contains(&value),
            FieldKind::Slider { min, max, step } => match value.trim().parse::<u32>() {
                Ok(n) => n >= min && n <= max && (n - min) % step == 0,
                Err(_) => false,
            },
        }
    }
}

/// A validated property edit.
#[derive(Clone, PartialEq, Debug)]
pub struct Edit {
    /// A target element ID.
    pub id: String,
    /// A property name.
    pub key: String,
    /// A new value.
    pub value: String,
}

/// A set of fields describing the selected element.
#[derive(Clone, PartialEq, Debug)]
pub struct PropertyPanel {
    element_id: String,
    kind: String,
    fields: Vec<Field>,
}

impl PropertyPanel {
    /// Builds a panel for a selected element.
    pub fn from_selection(sel: &ElementSnapshot) -> Self {
        let id = sel.id.as_str();
        let mut fields = Vec::new();

        for key in ["x", "y"] {
            let value = sel.attribute(key).unwrap_or("0").to_string();
            fields.push(Field::new(id, key, FieldKind::Number, value));
        }

        if sel.is_text() {
            let text = sel.text_content.clone().unwrap_or_default();
            fields.push(Field::new(id, TEXT_CONTENT, FieldKind::Text, text));

            let anchor = sel.attribute("text-anchor").unwrap_or("start").to_string();
            fields.push(Field::new(
                id,
                "text-anchor",
                FieldKind::Choice(TEXT_ANCHORS),
                anchor,
            ));
        }

        let fill = sel.attribute("fill").unwrap_or_default().to_string();
        fields.push(Field::new(id, "fill", FieldKind::Swatches(FILL_PALETTE), fill));

        let stroke = sel.attribute("stroke").unwrap_or_default().to_string();
        fields.push(Field::new(
            id,
            "stroke",
            FieldKind::Swatches(STROKE_PALETTE),
            stroke,
        ));

        let stroke_width = sel
            .attribute("stroke-width")
            .and_then(integer_prefix)
            .unwrap_or(STROKE_WIDTH_MIN);
        fields.push(Field::new(
            id,
            "stroke-width",
            FieldKind::Slider {
                min: STROKE_WIDTH_MIN,
                max: STROKE_WIDTH_MAX,
                step: 1,
            },
            stroke_width.to_string(),
        ));

        for attr in &sel.attributes {
            if KNOWN_KEYS.contains(&attr.name.as_str()) {
                continue;
            }

            let kind = match attr.name.as_str() {
                "width" | "height" => FieldKind::Number,
                _ => FieldKind::Text,
            };

            fields.push(Field::new(id, &attr.name, kind, attr.value.clone()));
        }

        PropertyPanel {
            element_id: sel.id.clone(),
            kind: sel.kind.clone(),
            fields,
        }
    }

    /// Returns the edited element ID.
    pub fn element_id(&self) -> &str {
        &self.element_id
    }

    /// Returns the edited element kind.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Returns all fields in display order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Returns a field by key.
    pub fn field(&self, key: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.key == key)
    }

    /// Validates a new value of a field.
    pub fn edit(&self, key: &str, value: &str) -> Result<Edit, Error> {
        match self.field(key) {
            Some(field) => field.edit(value),
            None => Err(Error::UnknownProperty(key.to_string())),
        }
    }
}

/// Parses a leading integer, ignoring the rest. Like `12px` -> `12`.
fn integer_prefix(s: &str) -> Option<u32> {
    let s = s.trim_start();
    let end = s
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(s.len());

    s[..end].parse().ok()
}
