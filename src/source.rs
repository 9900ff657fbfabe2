// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::Path;

use serde::Deserialize;

use crate::Error;

/// A diagram template.
#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct Template {
    /// Template's ID.
    pub id: String,

    /// A short description.
    #[serde(default)]
    pub summary: String,

    /// A category this template belongs to.
    #[serde(rename = "categoryId", default)]
    pub category_id: u32,

    /// SVG content.
    pub content: String,
}

/// A source of templates.
pub trait TemplateStore {
    /// Returns a template by ID.
    fn template(&self, id: &str) -> Option<&Template>;
}

/// A template store loaded from JSON.
///
/// Expects an object like:
///
/// ```json
/// { "templates": [ { "id": "t1", "summary": "", "categoryId": 1, "content": "<svg/>" } ] }
/// ```
#[derive(Clone, Default, Debug, Deserialize)]
pub struct JsonTemplateStore {
    templates: Vec<Template>,
}

impl JsonTemplateStore {
    /// Parses a store from a string.
    pub fn from_json(text: &str) -> Result<Self, Error> {
        let store: JsonTemplateStore = serde_json::from_str(text)?;
        log::debug!("Loaded {} templates.", store.templates.len());
        Ok(store)
    }

    /// Loads a store from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Returns all templates.
    pub fn templates(&self) -> &[Template] {
        &self.templates
    }
}

impl TemplateStore for JsonTemplateStore {
    fn template(&self, id: &str) -> Option<&Template> {
        self.templates.iter().find(|t| t.id == id)
    }
}

/// A response of the diagram matching service.
#[derive(Clone, PartialEq, Debug, Deserialize)]
#[serde(untagged)]
pub enum MatchResponse {
    /// Existing templates that match a request, best first.
    MatchedTemplates {
        #[allow(missing_docs)]
        #[serde(rename = "templateIds")]
        template_ids: Vec<String>,
    },

    /// A freshly generated SVG.
    GeneratedSvg {
        #[allow(missing_docs)]
        svg: String,
    },
}

impl MatchResponse {
    /// Parses a response from a string.
    pub fn from_json(text: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(text)?)
    }

    /// Picks a document to edit.
    ///
    /// The first matched template wins.
    pub fn into_source(self) -> Result<DocumentSource, Error> {
        match self {
            MatchResponse::MatchedTemplates { template_ids } => template_ids
                .into_iter()
                .next()
                .map(DocumentSource::Template)
                .ok_or(Error::NoTemplatesMatched),
            MatchResponse::GeneratedSvg { svg } => Ok(DocumentSource::Svg(svg)),
        }
    }
}

/// A document to edit.
#[derive(Clone, PartialEq, Debug)]
pub enum DocumentSource {
    /// A template ID.
    Template(String),
    /// An SVG string.
    Svg(String),
}

impl DocumentSource {
    /// Returns the SVG text.
    pub fn resolve<'a>(&'a self, store: &'a dyn TemplateStore) -> Result<&'a str, Error> {
        match self {
            DocumentSource::Template(ref id) => store
                .template(id)
                .map(|t| t.content.as_str())
                .ok_or_else(|| Error::TemplateNotFound(id.clone())),
            DocumentSource::Svg(ref svg) => Ok(svg),
        }
    }
}
