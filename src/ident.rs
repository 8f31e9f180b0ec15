//! Row identity.
//!
//! Every ingested row is stamped with a `RowId` that stays stable across
//! filtering, sorting, deletion and restoration. Ids are never positional
//! and never reused within a session.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque, unique, immutable handle of a row.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RowId(u64);

impl RowId {
    pub fn from_raw(raw: u64) -> Self {
        RowId(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out fresh row ids from a monotonically increasing counter.
///
/// Restored rows keep the ids they were snapshotted with; [`IdAssigner::adopt`]
/// advances the counter past them so rows ingested later in the same session
/// cannot collide.
#[derive(Debug)]
pub struct IdAssigner {
    next: u64,
}

impl IdAssigner {
    pub fn new() -> Self {
        IdAssigner { next: 1 }
    }

    /// Mint a fresh id.
    pub fn mint(&mut self) -> RowId {
        let id = RowId(self.next);
        self.next += 1;
        id
    }

    /// Pass-through mode: observe pre-assigned ids and make sure future
    /// mints land beyond all of them.
    pub fn adopt<I: IntoIterator<Item = RowId>>(&mut self, ids: I) {
        for id in ids {
            if id.0 >= self.next {
                self.next = id.0 + 1;
            }
        }
    }
}

impl Default for IdAssigner {
    fn default() -> Self {
        Self::new()
    }
}
