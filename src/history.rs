// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/// A linear undo/redo history of serialized documents.
///
/// Always contains at least one snapshot. The snapshot at [`History::index`]
/// is the one being displayed.
#[derive(Clone, Debug)]
pub struct History {
    snapshots: Vec<String>,
    current: usize,
}

impl History {
    /// Creates a new history with a single snapshot.
    pub fn new(initial: String) -> Self {
        History {
            snapshots: vec![initial],
            current: 0,
        }
    }

    /// Appends a snapshot and makes it current.
    ///
    /// Everything after the current snapshot (the redo branch) is discarded.
    pub fn push(&mut self, snapshot: String) {
        self.snapshots.truncate(self.current + 1);
        self.snapshots.push(snapshot);
        self.current = self.snapshots.len() - 1;
    }

    /// Replaces the current snapshot in place.
    ///
    /// The redo branch is discarded, just like with [`History::push`].
    pub fn replace_current(&mut self, snapshot: String) {
        self.snapshots.truncate(self.current + 1);
        self.snapshots[self.current] = snapshot;
    }

    /// Moves one step back.
    ///
    /// Returns `None` when already at the first snapshot.
    pub fn undo(&mut self) -> Option<&str> {
        if !self.can_undo() {
            return None;
        }

        self.current -= 1;
        Some(self.current())
    }

    /// Moves one step forward.
    ///
    /// Returns `None` when already at the last snapshot.
    pub fn redo(&mut self) -> Option<&str> {
        if !self.can_redo() {
            return None;
        }

        self.current += 1;
        Some(self.current())
    }

    /// Checks that [`History::undo`] would move.
    #[inline]
    pub fn can_undo(&self) -> bool {
        self.current > 0
    }

    /// Checks that [`History::redo`] would move.
    #[inline]
    pub fn can_redo(&self) -> bool {
        self.current + 1 < self.snapshots.len()
    }

    /// Returns the current snapshot.
    #[inline]
    pub fn current(&self) -> &str {
        &self.snapshots[self.current]
    }

    /// Returns the current snapshot index.
    #[inline]
    pub fn index(&self) -> usize {
        self.current
    }

    /// Returns the number of snapshots, including the redo branch.
    #[allow(clippy::len_without_is_empty)]
    #[inline]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Returns all snapshots, oldest first.
    pub fn snapshots(&self) -> &[String] {
        &self.snapshots
    }
}
