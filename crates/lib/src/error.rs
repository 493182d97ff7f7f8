//! Error types for the database core.
//!
//! A single flat `Error` enum covers AST construction, interpretation,
//! mutation, and storage failures, mirroring the taxonomy in the design
//! spec rather than splitting into one enum per module: the core is small
//! enough that a single enum stays readable, and callers that need to
//! distinguish "did this fail before or after any mutation" can match on
//! the variant directly.

use thiserror::Error;

use crate::path::PathBuf;

/// Result type used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Structured error types produced by the query engine and store.
#[derive(Debug, Error)]
pub enum Error {
    /// A path traversal hit a missing map key, an out-of-range index, or
    /// tried to index through a scalar.
    #[error("path not found: {path}")]
    PathNotFound { path: PathBuf },

    /// `Get` was applied to a scalar, which has no children to enumerate.
    #[error("value at {path} is not iterable")]
    NotIterable { path: PathBuf },

    /// An `Op` was applied to operands of the wrong type, or a division
    /// by zero was attempted.
    #[error("operation '{op}' failed: {reason}")]
    OpError { op: &'static str, reason: String },

    /// `Op::new` was constructed with a name outside the whitelist.
    #[error("unknown operation: {0}")]
    UnknownOp(String),

    /// `insert` was given a value containing a type outside the whitelist.
    #[error("value contains a type not allowed in the database")]
    TypeRejected,

    /// `insert` without `overwrite` targeted an already-occupied key.
    #[error("path {path} is already occupied")]
    PathConflict { path: PathBuf },

    /// `Append` targeted something that is not a list and cannot become one.
    #[error("path {path} is not a list")]
    NotAList { path: PathBuf },

    /// `remove` was asked to delete a result whose path is not `Some`,
    /// i.e. a value that was not sourced directly from the tree.
    #[error("cannot remove a value that did not come directly from the database")]
    RemovalOfNonTreeValue,

    /// `Do::build` was called with a trailing `let`/`foreach` step.
    #[error("the last step of a Do chain must not bind a variable")]
    MalformedDo,

    /// Interpretation exceeded its fuel budget.
    #[error("query ran out of fuel")]
    OutOfFuel,

    /// The apply phase of `remove`/`update` found the tree's shape did not
    /// match what `select` observed; the store has rolled back to the last
    /// committed snapshot.
    #[error("tree was mutated inconsistently with the query results: {reason}")]
    InconsistentData { reason: String },

    /// A filesystem operation on the backing file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The on-disk JSON did not decode into a `Value`.
    #[error("malformed JSON in backing file: {0}")]
    Json(#[from] serde_json::Error),

    /// The RPC peer replied with a typed error instead of a result, or sent
    /// a request this server couldn't dispatch.
    #[error("RPC error ({kind}): {message}")]
    Rpc { kind: String, message: String },
}

impl Error {
    /// Returns `true` for errors that the store reacts to by rolling back
    /// the in-memory tree before re-raising (see `store::Store::remove`).
    pub fn triggers_rollback(&self) -> bool {
        matches!(self, Error::InconsistentData { .. })
    }
}
