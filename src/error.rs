//! Engine error taxonomy.
//!
//! Every variant maps to an `Error` response at the message boundary; none
//! of them terminate the engine. Out-of-range mutation indices and repeated
//! deletes are deliberately NOT errors — they degrade to no-ops.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// A recognized verb with arguments that do not fit its grammar.
    #[error("malformed command: {0}")]
    Malformed(String),

    /// EXPORT with a format outside json/csv/sql/md.
    #[error("unsupported export format '{0}'")]
    UnknownFormat(String),

    /// Serialization failure while rendering an export.
    #[error("export failed: {0}")]
    Export(String),
}
