//! Reversible mutation records and the linear undo/redo log.
//!
//! An [`Action`] captures just enough to run a mutation in either direction
//! — old/new cell values, or the removed row itself — never a snapshot of
//! the whole dataset. Actions are keyed by row identity, not position, so
//! undo works no matter which view was active when the mutation happened.

use crate::ident::RowId;
use crate::store::Row;
use crate::value::CellValue;

/// A row removed from the master collection, with the index it occupied.
/// The index is best-effort (later mutations may have shifted neighbors);
/// the row itself is exact.
#[derive(Debug, Clone, PartialEq)]
pub struct DeletedRow {
    pub row: Row,
    pub master_index: usize,
}

/// One reversible mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    CellEdit {
        row_id: RowId,
        column: String,
        old_value: CellValue,
        new_value: CellValue,
    },
    RowDeleted(DeletedRow),
    RowsDeleted { items: Vec<DeletedRow> },
}

/// Default bound on the action log.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Linear, bounded action log with a cursor.
///
/// `cursor` counts applied actions: everything before it can be undone,
/// everything from it onward can be redone. Recording truncates the redo
/// tail — the log never branches.
#[derive(Debug)]
pub struct History {
    entries: Vec<Action>,
    cursor: usize,
    limit: usize,
}

impl History {
    pub fn new(limit: usize) -> Self {
        History {
            entries: Vec::new(),
            cursor: 0,
            limit: limit.max(1),
        }
    }

    pub fn record(&mut self, action: Action) {
        self.entries.truncate(self.cursor);
        self.entries.push(action);
        self.cursor += 1;
        if self.entries.len() > self.limit {
            self.entries.remove(0);
            self.cursor -= 1;
        }
    }

    /// Step the cursor back and hand out the action to invert, if any.
    pub fn undo(&mut self) -> Option<Action> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(self.entries[self.cursor].clone())
    }

    /// Step the cursor forward and hand out the action to reapply, if any.
    pub fn redo(&mut self) -> Option<Action> {
        if self.cursor >= self.entries.len() {
            return None;
        }
        let action = self.entries[self.cursor].clone();
        self.cursor += 1;
        Some(action)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }
}

impl Default for History {
    fn default() -> Self {
        History::new(DEFAULT_HISTORY_LIMIT)
    }
}
