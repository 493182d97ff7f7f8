//! `minidb`: an embedded document database with a composable, path-aware
//! query language.
//!
//! The document tree (`value::Value`) is addressed by immutable
//! `path::PathBuf`s; queries are first-class `ast::Query`/`ast::Expr`
//! values interpreted by `interp::{execute, eval}`; `mutator::{select,
//! remove, update}` use the path each result carries to perform safe
//! structural edits; `store::Store` owns the in-memory tree, the
//! reentrant-writer lock, and atomic on-disk commit/rollback.

pub mod ast;
pub mod bindings;
pub mod builder;
pub mod error;
pub mod fuel;
pub mod interp;
pub mod mutator;
pub mod ops;
pub mod path;
#[cfg(feature = "rpc")]
pub mod rpc;
pub mod store;
pub mod value;

pub use ast::{Expr, Query, QueryFunc, ValueFunc};
pub use bindings::{Binding, Bindings};
pub use builder::Do;
pub use error::{Error, Result};
pub use fuel::Fuel;
pub use mutator::{Change, UpdateMode};
pub use path::{PathBuf, Step};
pub use store::{Store, StoreConfig};
pub use value::{Map, Value};
