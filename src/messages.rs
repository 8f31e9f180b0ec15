//! Request/response message types for host ↔ engine communication.
//!
//! Mirrors the engine's external surface one-to-one: a request may yield
//! several responses (data, persist signal, history state), emitted in
//! order. All types serialize with a `type` tag so hosts can speak JSON
//! directly to the worker.

use crate::ident::RowId;
use crate::store::Row;
use crate::value::CellValue;
use crate::view::ColumnStats;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Which collection a command runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum QueryScope {
    #[default]
    CurrentView,
    Master,
}

/// Messages sent from the host to the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    /// Ingest freshly decoded rows; replaces any prior dataset.
    LoadFile {
        columns: Vec<String>,
        rows: Vec<HashMap<String, CellValue>>,
    },

    /// Adopt previously snapshotted rows that already carry ids.
    LoadExisting { columns: Vec<String>, rows: Vec<Row> },

    /// Run a textual command against the chosen source collection.
    RunCommand {
        text: String,
        #[serde(default)]
        scope: QueryScope,
    },

    /// Assign one cell through the current view.
    EditCell {
        view_index: usize,
        column: String,
        value: CellValue,
    },

    /// Delete one row through the current view.
    DeleteRow { view_index: usize },

    /// Delete several rows through the current view.
    DeleteRows { view_indices: Vec<usize> },

    Undo,
    Redo,

    /// Reset the current view to mirror the master collection.
    Reset,

    /// Request a snapshot of the master collection for persistence.
    ExportSnapshot,
}

/// Messages sent from the engine back to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Response {
    /// A dataset was ingested or adopted; carries the fresh view.
    DataLoaded { columns: Vec<String>, rows: Vec<Row> },

    /// The current view changed (or a mutation ran against it).
    DataUpdated { columns: Vec<String>, rows: Vec<Row> },

    /// Aggregate answer to a STATS command.
    CommandResult { stats: ColumnStats },

    /// Rendered EXPORT payload.
    ExportReady {
        content: String,
        format: String,
        mime_type: String,
    },

    /// Undo/redo availability after a history operation.
    HistoryState { can_undo: bool, can_redo: bool },

    /// The master collection changed; the persistence collaborator should
    /// snapshot.
    PersistNeeded,

    /// Full master collection, including identifiers.
    Snapshot { columns: Vec<String>, rows: Vec<Row> },

    /// A caught failure; engine state is unchanged.
    Error { message: String },
}

impl Response {
    /// Row identities of a data-bearing response, in view order.
    pub fn row_ids(&self) -> Option<Vec<RowId>> {
        match self {
            Response::DataLoaded { rows, .. }
            | Response::DataUpdated { rows, .. }
            | Response::Snapshot { rows, .. } => Some(rows.iter().map(|r| r.id).collect()),
            _ => None,
        }
    }
}
