//! Bounded undo/redo history of canvas snapshots.
//!
//! Each committed edit pushes a [`CanvaState`] holding the input and/or
//! output canvas after the edit. The [`StateManager`] keeps at most
//! `capacity` entries plus a cursor naming the live state:
//!
//! ```text
//!   entries:  [s0] [s1] [s2] [s3]
//!                        ^cursor
//!   prev() -> s1        next() -> s3
//! ```
//!
//! Adding while the cursor is not at the tail discards the redo branch.
//! When full, the oldest entry is evicted.

use std::collections::VecDeque;

use tracing::{debug, trace};

use crate::buffer::PixelBuffer;

/// Default number of retained snapshots.
pub const DEFAULT_CAPACITY: usize = 64;

/// Snapshot of both canvases after an edit.
///
/// Either side may be absent when it did not change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanvaState {
    pub input: Option<PixelBuffer>,
    pub output: Option<PixelBuffer>,
}

impl CanvaState {
    pub fn new(input: Option<PixelBuffer>, output: Option<PixelBuffer>) -> Self {
        Self { input, output }
    }

    /// Snapshot after loading an image into the input canvas.
    pub fn with_input(input: PixelBuffer) -> Self {
        Self {
            input: Some(input),
            output: None,
        }
    }

    /// Snapshot after a filter rendered into the output canvas.
    pub fn with_output(output: PixelBuffer) -> Self {
        Self {
            input: None,
            output: Some(output),
        }
    }
}

/// Bounded linear history with a cursor.
#[derive(Debug, Clone)]
pub struct StateManager {
    capacity: usize,
    entries: VecDeque<CanvaState>,
    cursor: Option<usize>,
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl StateManager {
    /// Create an empty history. A capacity of 0 is raised to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity.min(DEFAULT_CAPACITY)),
            cursor: None,
        }
    }

    /// Push a snapshot and make it current.
    ///
    /// Entries after the cursor are dropped first; the oldest entry is
    /// evicted when the history is full.
    pub fn add(&mut self, state: CanvaState) {
        if let Some(cursor) = self.cursor {
            let discarded = self.entries.len() - (cursor + 1);
            if discarded > 0 {
                trace!(discarded, "dropping redo branch");
                self.entries.truncate(cursor + 1);
            }
        }

        self.entries.push_back(state);
        if self.entries.len() > self.capacity {
            self.entries.pop_front();
            debug!(capacity = self.capacity, "history full, evicted oldest state");
        }

        self.cursor = Some(self.entries.len() - 1);
        trace!(len = self.entries.len(), "state added");
    }

    /// Step back one state. `None` when there is nothing to undo.
    pub fn prev(&mut self) -> Option<&CanvaState> {
        let cursor = self.cursor.filter(|&c| c > 0)? - 1;
        self.cursor = Some(cursor);
        trace!(cursor, "undo");
        self.entries.get(cursor)
    }

    /// Step forward one state. `None` when there is nothing to redo.
    pub fn next(&mut self) -> Option<&CanvaState> {
        let cursor = self.cursor.filter(|&c| c + 1 < self.entries.len())? + 1;
        self.cursor = Some(cursor);
        trace!(cursor, "redo");
        self.entries.get(cursor)
    }

    pub fn current(&self) -> Option<&CanvaState> {
        self.cursor.and_then(|c| self.entries.get(c))
    }

    #[inline]
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn can_undo(&self) -> bool {
        matches!(self.cursor, Some(c) if c > 0)
    }

    pub fn can_redo(&self) -> bool {
        matches!(self.cursor, Some(c) if c + 1 < self.entries.len())
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = None;
    }

    /// Snapshots from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &CanvaState> {
        self.entries.iter()
    }
}
