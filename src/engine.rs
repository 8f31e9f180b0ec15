//! The engine context: owns the dataset, the current view, the history and
//! the identity assigner, and dispatches request messages.
//!
//! All state lives in this one explicit context with a defined construction
//! (ingestion) and reset lifecycle — nothing ambient, nothing global. Each
//! request is handled synchronously and answers with an ordered batch of
//! responses.

use crate::command::{self, Command};
use crate::error::EngineError;
use crate::export::{self, ExportFormat};
use crate::history::{Action, DeletedRow, History, DEFAULT_HISTORY_LIMIT};
use crate::ident::{IdAssigner, RowId};
use crate::messages::{QueryScope, Request, Response};
use crate::store::{Dataset, Row, ViewRows};
use crate::value::CellValue;
use crate::view;
use log::{debug, info, warn};
use std::collections::HashMap;

/// Construction-time engine options.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Bound on the undo/redo log.
    pub history_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

pub struct Engine {
    dataset: Dataset,
    view: ViewRows,
    history: History,
    ids: IdAssigner,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Engine {
            dataset: Dataset::new(Vec::new()),
            view: ViewRows::Linked(Vec::new()),
            history: History::new(config.history_limit),
            ids: IdAssigner::new(),
        }
    }

    /// Handle one request; responses come back in emission order.
    pub fn handle(&mut self, request: Request) -> Vec<Response> {
        match request {
            Request::LoadFile { columns, rows } => self.load_file(columns, rows),
            Request::LoadExisting { columns, rows } => self.load_existing(columns, rows),
            Request::RunCommand { text, scope } => {
                self.run_command(&text, scope).unwrap_or_else(|e| {
                    vec![Response::Error {
                        message: e.to_string(),
                    }]
                })
            }
            Request::EditCell {
                view_index,
                column,
                value,
            } => self.edit_cell(view_index, &column, value),
            Request::DeleteRow { view_index } => self.delete_rows(&[view_index]),
            Request::DeleteRows { view_indices } => self.delete_rows(&view_indices),
            Request::Undo => self.undo(),
            Request::Redo => self.redo(),
            Request::Reset => {
                self.view = ViewRows::Linked(self.dataset.master_ids());
                vec![self.data_updated()]
            }
            Request::ExportSnapshot => vec![Response::Snapshot {
                columns: self.dataset.columns().to_vec(),
                rows: self.dataset.rows_in_order().cloned().collect(),
            }],
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn view(&self) -> &ViewRows {
        &self.view
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ==================== ingestion ====================

    fn load_file(&mut self, columns: Vec<String>, rows: Vec<HashMap<String, CellValue>>) -> Vec<Response> {
        let mut dataset = Dataset::new(columns);
        for cells in rows {
            dataset.append(Row::new(self.ids.mint(), cells));
        }
        info!("loaded {} rows, {} columns", dataset.len(), dataset.columns().len());
        self.dataset = dataset;
        self.view = ViewRows::Linked(self.dataset.master_ids());
        self.history.clear();
        vec![self.data_loaded(), Response::PersistNeeded]
    }

    fn load_existing(&mut self, columns: Vec<String>, rows: Vec<Row>) -> Vec<Response> {
        self.ids.adopt(rows.iter().map(|r| r.id));
        self.dataset = Dataset::from_rows(columns, rows);
        info!("adopted {} pre-identified rows", self.dataset.len());
        self.view = ViewRows::Linked(self.dataset.master_ids());
        self.history.clear();
        vec![self.data_loaded()]
    }

    // ==================== commands ====================

    fn run_command(&mut self, text: &str, scope: QueryScope) -> Result<Vec<Response>, EngineError> {
        let command = command::parse(text)?;
        debug!("command {:?} against {:?}", command, scope);
        let source = self.source(scope);

        match command {
            Command::Filter(spec) => {
                self.view = view::filter(&self.dataset, &source, |row| spec.matches(row));
                Ok(vec![self.data_updated()])
            }
            Command::Sort { column, direction } => {
                self.view = view::sort(&self.dataset, &source, &column, direction);
                Ok(vec![self.data_updated()])
            }
            Command::Select(columns) => {
                self.view = view::project(&self.dataset, &source, &columns);
                Ok(vec![self.data_updated()])
            }
            Command::Stats { column } => Ok(vec![Response::CommandResult {
                stats: view::stats(&self.dataset, &source, &column),
            }]),
            Command::Trim { column } => {
                self.trim(&column, scope);
                Ok(vec![self.data_updated()])
            }
            Command::Export { format } => {
                let format = ExportFormat::parse(&format)?;
                let (columns, rows) = self.view_payload();
                let refs: Vec<&Row> = rows.iter().collect();
                let content = export::render(&columns, &refs, format)?;
                Ok(vec![Response::ExportReady {
                    content,
                    format: format.name().to_string(),
                    mime_type: format.mime_type().to_string(),
                }])
            }
            Command::Unrecognized { verb } => {
                warn!("unrecognized command verb '{verb}', source left unchanged");
                Ok(vec![self.data_updated()])
            }
        }
    }

    fn source(&self, scope: QueryScope) -> ViewRows {
        match scope {
            QueryScope::Master => ViewRows::Linked(self.dataset.master_ids()),
            QueryScope::CurrentView => self.view.clone(),
        }
    }

    fn trim(&mut self, column: &str, scope: QueryScope) {
        match scope {
            QueryScope::Master => {
                for id in self.dataset.master_ids() {
                    if let Some(row) = self.dataset.row_mut(id) {
                        row.trim_column(column);
                    }
                }
            }
            QueryScope::CurrentView => match &mut self.view {
                ViewRows::Linked(ids) => {
                    for id in ids.iter() {
                        if let Some(row) = self.dataset.row_mut(*id) {
                            row.trim_column(column);
                        }
                    }
                }
                ViewRows::Projected { rows, .. } => {
                    for row in rows {
                        row.trim_column(column);
                    }
                }
            },
        }
    }

    // ==================== mutations ====================

    fn edit_cell(&mut self, view_index: usize, column: &str, value: CellValue) -> Vec<Response> {
        let mut action = None;
        match &mut self.view {
            ViewRows::Linked(ids) => {
                // In-place assignment on the arena row is what makes the
                // edit visible from the master with no sync step.
                if let Some(id) = ids.get(view_index).copied() {
                    if let Some(row) = self.dataset.row_mut(id) {
                        let old = row.set(column, value.clone());
                        if old != value {
                            action = Some(Action::CellEdit {
                                row_id: id,
                                column: column.to_string(),
                                old_value: old,
                                new_value: value,
                            });
                        }
                    }
                }
            }
            ViewRows::Projected { rows, .. } => {
                // Projected rows are detached: the copy changes, the master
                // does not.
                if let Some(row) = rows.get_mut(view_index) {
                    let old = row.set(column, value.clone());
                    if old != value {
                        action = Some(Action::CellEdit {
                            row_id: row.id,
                            column: column.to_string(),
                            old_value: old,
                            new_value: value,
                        });
                    }
                }
            }
        }
        if let Some(action) = action {
            self.history.record(action);
        }
        vec![self.data_updated(), Response::PersistNeeded]
    }

    fn delete_rows(&mut self, view_indices: &[usize]) -> Vec<Response> {
        let mut targets: Vec<RowId> = Vec::new();
        for &index in view_indices {
            if let Some(id) = self.view.id_at(index) {
                if !targets.contains(&id) {
                    targets.push(id);
                }
            }
        }

        let mut items = Vec::new();
        for id in targets {
            // Removal is by identity: view and master may have diverged in
            // order and length. An id already gone is a no-op.
            if let Some((row, master_index)) = self.dataset.remove(id) {
                self.view.remove_id(id);
                items.push(DeletedRow { row, master_index });
            }
        }

        debug!("deleted {} rows", items.len());
        match items.len() {
            0 => {}
            1 => self.history.record(Action::RowDeleted(items.remove(0))),
            _ => self.history.record(Action::RowsDeleted { items }),
        }
        vec![self.data_updated(), Response::PersistNeeded]
    }

    // ==================== history ====================

    fn undo(&mut self) -> Vec<Response> {
        let applied = match self.history.undo() {
            Some(action) => {
                self.apply_inverse(action);
                true
            }
            None => false,
        };
        self.history_responses(applied)
    }

    fn redo(&mut self) -> Vec<Response> {
        let applied = match self.history.redo() {
            Some(action) => {
                self.apply_forward(action);
                true
            }
            None => false,
        };
        self.history_responses(applied)
    }

    fn history_responses(&self, applied: bool) -> Vec<Response> {
        let mut responses = vec![self.data_updated()];
        if applied {
            responses.push(Response::PersistNeeded);
        }
        responses.push(Response::HistoryState {
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
        });
        responses
    }

    fn apply_inverse(&mut self, action: Action) {
        match action {
            Action::CellEdit {
                row_id,
                column,
                old_value,
                ..
            } => {
                if let Some(row) = self.dataset.row_mut(row_id) {
                    row.set(&column, old_value);
                }
            }
            Action::RowDeleted(item) => self.restore_deleted(item),
            Action::RowsDeleted { mut items } => {
                // Ascending by captured index so each clamped reinsertion
                // lands near its original slot.
                items.sort_by_key(|d| d.master_index);
                for item in items {
                    self.restore_deleted(item);
                }
            }
        }
    }

    fn apply_forward(&mut self, action: Action) {
        match action {
            Action::CellEdit {
                row_id,
                column,
                new_value,
                ..
            } => {
                if let Some(row) = self.dataset.row_mut(row_id) {
                    row.set(&column, new_value);
                }
            }
            Action::RowDeleted(item) => {
                self.dataset.remove(item.row.id);
                self.view.remove_id(item.row.id);
            }
            Action::RowsDeleted { items } => {
                for item in items {
                    self.dataset.remove(item.row.id);
                    self.view.remove_id(item.row.id);
                }
            }
        }
    }

    /// Reinsert the exact removed row and append it to the current view.
    fn restore_deleted(&mut self, item: DeletedRow) {
        let DeletedRow { row, master_index } = item;
        let id = row.id;
        match &mut self.view {
            ViewRows::Linked(ids) => {
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
            ViewRows::Projected { columns, rows } => {
                if rows.iter().all(|r| r.id != id) {
                    let cells = columns
                        .iter()
                        .filter_map(|c| row.get(c).map(|v| (c.clone(), v.clone())))
                        .collect();
                    rows.push(Row::new(id, cells));
                }
            }
        }
        self.dataset.restore(row, master_index);
    }

    // ==================== payloads ====================

    fn view_payload(&self) -> (Vec<String>, Vec<Row>) {
        match &self.view {
            ViewRows::Linked(ids) => (
                self.dataset.columns().to_vec(),
                ids.iter()
                    .filter_map(|id| self.dataset.row(*id).cloned())
                    .collect(),
            ),
            ViewRows::Projected { columns, rows } => (columns.clone(), rows.clone()),
        }
    }

    fn data_updated(&self) -> Response {
        let (columns, rows) = self.view_payload();
        Response::DataUpdated { columns, rows }
    }

    fn data_loaded(&self) -> Response {
        let (columns, rows) = self.view_payload();
        Response::DataLoaded { columns, rows }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new(EngineConfig::default())
    }
}
