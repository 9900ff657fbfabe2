// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::time::Instant;

use rwsvgtree::{Document, NodeId, XLINK_NS};

use crate::export::{self, Blob, DownloadSink, ExportError, ExportFormat, ExportRequest};
use crate::panel::{Edit, PropertyPanel};
use crate::selection::{ElementSnapshot, TEXT_CONTENT};
use crate::source::{DocumentSource, TemplateStore};
use crate::{EditorOptions, Error, History};

/// The smallest zoom level in percents.
pub const ZOOM_MIN: u32 = 25;
/// The largest zoom level in percents.
pub const ZOOM_MAX: u32 = 200;
/// A zoom level change per step.
pub const ZOOM_STEP: u32 = 25;

const DEFAULT_ZOOM: u32 = 100;

/// The last committed edit. Used for history coalescing.
#[derive(Clone, Debug)]
struct Commit {
    id: String,
    key: String,
    time: Instant,
}

/// An editing session of a single SVG document.
///
/// Owns the document, its history and the current selection.
#[derive(Clone, Debug)]
pub struct Editor {
    doc: Document,
    history: History,
    selection: Option<ElementSnapshot>,
    opt: EditorOptions,
    last_commit: Option<Commit>,
    zoom: u32,
    show_grid: bool,
}

impl Editor {
    /// Starts a session from an SVG string.
    pub fn new(svg: &str, opt: EditorOptions) -> Result<Self, Error> {
        let doc = Document::parse_str(svg)?;
        let snapshot = doc.to_string(&opt.write);

        Ok(Editor {
            doc,
            history: History::new(snapshot),
            selection: None,
            opt,
            last_commit: None,
            zoom: DEFAULT_ZOOM,
            show_grid: false,
        })
    }

    /// Starts a session from a template or a generated SVG.
    pub fn from_source(
        source: &DocumentSource,
        store: &dyn TemplateStore,
        opt: EditorOptions,
    ) -> Result<Self, Error> {
        Self::new(source.resolve(store)?, opt)
    }

    /// Replaces the edited document.
    ///
    /// Resets history, selection and view. On error, the current session stays intact.
    pub fn load(&mut self, svg: &str) -> Result<(), Error> {
        *self = Self::new(svg, self.opt)?;
        Ok(())
    }

    /// Replaces the edited document with one from a source.
    pub fn load_source(
        &mut self,
        source: &DocumentSource,
        store: &dyn TemplateStore,
    ) -> Result<(), Error> {
        self.load(source.resolve(store)?)
    }

    /// Returns the edited document.
    #[inline]
    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Returns the current document snapshot.
    #[inline]
    pub fn snapshot(&self) -> &str {
        self.history.current()
    }

    /// Returns the edit history.
    #[inline]
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Returns editor options.
    #[inline]
    pub fn options(&self) -> &EditorOptions {
        &self.opt
    }

    /// Returns the current document prepared for interactive display.
    pub fn interactive_svg(&self) -> String {
        self.doc.to_interactive_string(&self.opt.write)
    }

    /// Returns the selected element.
    #[inline]
    pub fn selection(&self) -> Option<&ElementSnapshot> {
        self.selection.as_ref()
    }

    /// Selects an element by ID.
    ///
    /// On error, the selection is not changed.
    pub fn select_element(&mut self, id: &str) -> Result<&ElementSnapshot, Error> {
        let node = self
            .doc
            .element_by_id(id)
            .ok_or_else(|| Error::ElementNotFound(id.to_string()))?;

        Ok(&*self.selection.insert(ElementSnapshot::capture(node)))
    }

    /// Selects the topmost element under a point in document units.
    ///
    /// Clears the selection when there is nothing under the point.
    pub fn select_at(&mut self, x: f32, y: f32) -> Result<Option<&ElementSnapshot>, Error> {
        match export::hit_test(&self.doc, x, y)? {
            Some(id) => self.select_element(&id).map(Some),
            None => {
                self.selection = None;
                Ok(None)
            }
        }
    }

    /// Clears the selection.
    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Returns a property panel for the selected element.
    pub fn property_panel(&self) -> Option<PropertyPanel> {
        self.selection.as_ref().map(PropertyPanel::from_selection)
    }

    /// Sets an element property and records the result in history.
    ///
    /// `key` is an attribute name or `textContent`. Text content can be set only
    /// on `text` elements and is ignored otherwise.
    ///
    /// A key must be a qualified name with a bound prefix and cannot declare a namespace.
    /// The `xlink` prefix is declared on the root element when needed.
    /// A value must contain only characters allowed in XML.
    /// Rejected edits leave the document and history untouched.
    ///
    /// Returns the new snapshot.
    pub fn apply_mutation(&mut self, id: &str, key: &str, value: &str) -> Result<&str, Error> {
        let node_id = match self.doc.element_by_id(id) {
            Some(node) => node.node_id(),
            None => {
                log::warn!("Cannot edit '{}'. No such element.", id);
                return Err(Error::ElementNotFound(id.to_string()));
            }
        };

        let declare_xlink = self.check_mutation(node_id, key, value)?;

        if !self.mutate(node_id, key, value, declare_xlink) {
            log::warn!("'{}' is not a text element. Text content is not set.", id);
            return Ok(self.history.current());
        }

        if let Some(ref mut sel) = self.selection {
            if sel.id == id {
                sel.update(key, value);
            }
        }

        let snapshot = self.doc.to_string(&self.opt.write);
        // A changed ID is what the next edit of the same element will use.
        let new_id = if key == "id" { value } else { id };
        self.commit(snapshot, new_id, key);

        Ok(self.history.current())
    }

    /// Applies a validated property edit.
    pub fn apply_edit(&mut self, edit: &Edit) -> Result<&str, Error> {
        self.apply_mutation(&edit.id, &edit.key, &edit.value)
    }

    /// Checks that an edit keeps the document well-formed.
    ///
    /// Returns `true` when the `xlink` prefix is used, but not declared yet.
    fn check_mutation(&self, node_id: NodeId, key: &str, value: &str) -> Result<bool, Error> {
        if !rwsvgtree::is_xml_chars(value) {
            log::warn!("'{}' contains characters not allowed in XML. Skipped.", key);
            return Err(Error::InvalidValue {
                key: key.to_string(),
                value: value.to_string(),
            });
        }

        if key == TEXT_CONTENT {
            return Ok(false);
        }

        if !is_qname(key) || key == "xmlns" || key.starts_with("xmlns:") {
            log::warn!("'{}' is not an editable attribute.", key);
            return Err(Error::UnknownProperty(key.to_string()));
        }

        let prefix = match key.split_once(':') {
            Some((prefix, _)) => prefix,
            None => return Ok(false),
        };

        if self.doc.get(node_id).namespace_uri(Some(prefix)).is_some() {
            Ok(false)
        } else if prefix == "xlink" {
            Ok(true)
        } else {
            log::warn!("'{}' uses an undeclared namespace prefix.", key);
            Err(Error::UnknownProperty(key.to_string()))
        }
    }

    fn mutate(&mut self, node_id: NodeId, key: &str, value: &str, declare_xlink: bool) -> bool {
        if key == TEXT_CONTENT {
            if self.doc.get(node_id).kind() != "text" {
                return false;
            }

            self.doc.set_text(node_id, value);
        } else {
            if declare_xlink {
                let root = self.doc.root_element().node_id();
                self.doc.declare_namespace(root, Some("xlink"), XLINK_NS);
            }

            self.doc.set_attribute(node_id, key, value);
        }

        true
    }

    fn commit(&mut self, snapshot: String, id: &str, key: &str) {
        let now = Instant::now();
        let coalesce = match (self.opt.coalesce_window, &self.last_commit) {
            (Some(window), Some(last)) => {
                last.id == id && last.key == key && now.duration_since(last.time) <= window
            }
            _ => false,
        };

        if coalesce {
            self.history.replace_current(snapshot);
        } else {
            self.history.push(snapshot);
        }

        self.last_commit = Some(Commit {
            id: id.to_string(),
            key: key.to_string(),
            time: now,
        });
    }

    /// Checks that [`Editor::undo`] would change the document.
    #[inline]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Checks that [`Editor::redo`] would change the document.
    #[inline]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Restores the previous snapshot.
    ///
    /// Returns `None` when there is nothing to undo.
    pub fn undo(&mut self) -> Result<Option<&str>, Error> {
        self.last_commit = None;

        let doc = match self.history.undo() {
            Some(snapshot) => Document::parse_str(snapshot),
            None => return Ok(None),
        };

        match doc {
            Ok(doc) => self.restore(doc),
            Err(e) => {
                self.history.redo();
                return Err(e.into());
            }
        }

        Ok(Some(self.history.current()))
    }

    /// Restores the next snapshot.
    ///
    /// Returns `None` when there is nothing to redo.
    pub fn redo(&mut self) -> Result<Option<&str>, Error> {
        self.last_commit = None;

        let doc = match self.history.redo() {
            Some(snapshot) => Document::parse_str(snapshot),
            None => return Ok(None),
        };

        match doc {
            Ok(doc) => self.restore(doc),
            Err(e) => {
                self.history.undo();
                return Err(e.into());
            }
        }

        Ok(Some(self.history.current()))
    }

    fn restore(&mut self, doc: Document) {
        self.doc = doc;

        if let Some(sel) = self.selection.take() {
            self.selection = self.doc.element_by_id(&sel.id).map(ElementSnapshot::capture);
        }
    }

    /// Exports the current document.
    pub fn export(&self, request: &ExportRequest) -> Result<Blob, ExportError> {
        export::export(&self.doc, request, &self.opt.write)
    }

    /// Exports the current document with the default quality
    /// and hands it to a sink as `diagram.<ext>`.
    pub fn download(&self, format: ExportFormat, sink: &mut dyn DownloadSink) -> Result<(), Error> {
        let request = ExportRequest::new(format);
        export::download(&self.doc, &request, "diagram", &self.opt.write, sink)?;
        Ok(())
    }

    /// Returns the zoom level in percents.
    #[inline]
    pub fn zoom(&self) -> u32 {
        self.zoom
    }

    /// Increases the zoom level by one step.
    pub fn zoom_in(&mut self) -> u32 {
        self.zoom = (self.zoom + ZOOM_STEP).min(ZOOM_MAX);
        self.zoom
    }

    /// Decreases the zoom level by one step.
    pub fn zoom_out(&mut self) -> u32 {
        self.zoom = self.zoom.saturating_sub(ZOOM_STEP).max(ZOOM_MIN);
        self.zoom
    }

    /// Checks that the grid is shown.
    #[inline]
    pub fn show_grid(&self) -> bool {
        self.show_grid
    }

    /// Shows or hides the grid.
    pub fn toggle_grid(&mut self) -> bool {
        self.show_grid = !self.show_grid;
        self.show_grid
    }
}

/// Checks that a key is an XML name with at most one colon
/// and non-empty prefix and local parts.
fn is_qname(key: &str) -> bool {
    rwsvgtree::is_xml_name(key)
        && key.matches(':').count() <= 1
        && key.split(':').all(|part| !part.is_empty())
}
