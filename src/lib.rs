// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
`svgedit` is an SVG live-editing library.

It loads an SVG document, assigns a stable ID to every element,
lets you select and edit elements, keeps an undo/redo history of serialized
snapshots and exports the result as SVG, PNG, WebP or JPEG.

```no_run
use svgedit::{Editor, EditorOptions, ExportFormat, ExportRequest};

let svg = "<svg viewBox='0 0 100 50'><rect id='r1' width='10' height='10' fill='red'/></svg>";
let mut editor = Editor::new(svg, EditorOptions::default()).unwrap();
editor.apply_mutation("r1", "fill", "#0000ff").unwrap();
let png = editor.export(&ExportRequest::new(ExportFormat::Png)).unwrap();
```
*/

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::uninlined_format_args)]

pub use rwsvgtree;

mod editor;
mod error;
pub mod export;
mod history;
mod options;
mod panel;
mod selection;
mod source;

pub use editor::{Editor, ZOOM_MAX, ZOOM_MIN, ZOOM_STEP};
pub use error::Error;
pub use export::{
    export_template, Blob, DirectorySink, DownloadSink, ExportError, ExportFormat,
    ExportRequest,
};
pub use history::History;
pub use options::EditorOptions;
pub use panel::{Edit, Field, FieldKind, PropertyPanel, FILL_PALETTE, STROKE_PALETTE, TEXT_ANCHORS};
pub use selection::{ElementSnapshot, TEXT_CONTENT};
pub use source::{DocumentSource, JsonTemplateStore, MatchResponse, Template, TemplateStore};
