//! Worktable — in-memory tabular data engine
//!
//! An engine that runs off the interactive thread: it ingests decoded rows,
//! answers a small command language (FILTER, SORT, SELECT, STATS, TRIM,
//! EXPORT), keeps a materialized current view over a master row set, and
//! records every mutation as a reversible action so edits can be undone and
//! redone regardless of which view was active when they happened.

pub mod command;
pub mod engine;
pub mod error;
pub mod export;
pub mod history;
pub mod ident;
pub mod messages;
pub mod seq;
pub mod store;
pub mod value;
pub mod view;
pub mod worker;

pub use command::{Command, FilterOp, FilterSpec};
pub use engine::{Engine, EngineConfig};
pub use error::EngineError;
pub use export::ExportFormat;
pub use history::{Action, DeletedRow, History};
pub use ident::{IdAssigner, RowId};
pub use messages::{QueryScope, Request, Response};
pub use seq::BlockList;
pub use store::{Dataset, Row, ViewRows};
pub use value::{CellValue, Coerced};
pub use view::{ColumnStats, SortDirection};
pub use worker::{spawn, WorkerHandle};
