// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::time::Duration;

use rwsvgtree::WriteOptions;

/// Editor options.
#[derive(Clone, Copy, Debug)]
pub struct EditorOptions {
    /// Merges repeated edits into a single history entry.
    ///
    /// When set, an edit of the same element property as the previous edit,
    /// made within this duration, replaces the top history snapshot instead of
    /// adding a new one. Undo, redo and load start a new run.
    ///
    /// `None` records every edit.
    ///
    /// Default: `None`
    pub coalesce_window: Option<Duration>,

    /// Snapshot serialization options.
    ///
    /// Also used for SVG export.
    pub write: WriteOptions,
}

impl Default for EditorOptions {
    fn default() -> EditorOptions {
        EditorOptions {
            coalesce_window: None,
            write: WriteOptions::default(),
        }
    }
}
