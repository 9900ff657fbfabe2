// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::export::ExportError;

/// List of all errors.
#[derive(Debug)]
pub enum Error {
    /// The document is not a valid SVG.
    Parse(rwsvgtree::Error),

    /// An element with the given id doesn't exist.
    ElementNotFound(String),

    /// A template with the given id doesn't exist.
    TemplateNotFound(String),

    /// An upstream response matched no templates.
    NoTemplatesMatched,

    /// A property value was rejected by its field
    /// or contains characters not allowed in XML.
    InvalidValue {
        /// A property name.
        key: String,
        /// A rejected value.
        value: String,
    },

    /// A property doesn't belong to the current panel
    /// or is not a valid attribute name.
    UnknownProperty(String),

    /// Failed to export a document.
    Export(ExportError),

    /// Failed to parse a JSON input.
    Json(serde_json::Error),

    /// An I/O error.
    Io(std::io::Error),
}

impl From<rwsvgtree::Error> for Error {
    fn from(e: rwsvgtree::Error) -> Self {
        Error::Parse(e)
    }
}

impl From<ExportError> for Error {
    fn from(e: ExportError) -> Self {
        Error::Export(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Json(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            Error::Parse(ref e) => write!(f, "{}", e),
            Error::ElementNotFound(ref id) => {
                write!(f, "an element with id '{}' does not exist", id)
            }
            Error::TemplateNotFound(ref id) => {
                write!(f, "a template with id '{}' does not exist", id)
            }
            Error::NoTemplatesMatched => {
                write!(f, "the response has no matched templates")
            }
            Error::InvalidValue { ref key, ref value } => {
                write!(f, "'{}' is not a valid value for '{}'", value, key)
            }
            Error::UnknownProperty(ref key) => {
                write!(f, "'{}' is not an editable property", key)
            }
            Error::Export(ref e) => write!(f, "{}", e),
            Error::Json(ref e) => write!(f, "invalid JSON: {}", e),
            Error::Io(ref e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self {
            Error::Parse(ref e) => Some(e),
            Error::Export(ref e) => Some(e),
            Error::Json(ref e) => Some(e),
            Error::Io(ref e) => Some(e),
            _ => None,
        }
    }
}
