//! CLI argument definitions for the minidb binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// minidb: an embedded document database with a composable query language.
#[derive(Parser, Debug)]
#[command(name = "minidb")]
#[command(about = "Query and mutate a JSON-like document store")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format instead of human-readable text
    #[arg(long, global = true)]
    pub json: bool,
}

/// Shared options for any command that opens a `Store`.
#[derive(clap::Args, Debug)]
pub struct StoreOpenArgs {
    /// Path to the backing JSON file
    #[arg(short, long, env = "MINIDB_FILE")]
    pub db: PathBuf,

    /// Per-query fuel budget
    #[arg(long, env = "MINIDB_FUEL")]
    pub fuel: Option<u64>,

    /// Write the backing file with pretty-printed JSON
    #[arg(long)]
    pub pretty: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a query and print its results
    Select(SelectArgs),
    /// Insert a value at a path
    Insert(InsertArgs),
    /// Delete every tree-sourced result of a query
    Remove(RemoveArgs),
    /// Apply one or more changes to every result of a query
    Update(UpdateArgs),
    /// Flush the in-memory tree to disk
    Commit(StoreOpenArgs),
    /// Reload the in-memory tree from disk, discarding uncommitted changes
    Rollback(StoreOpenArgs),
    /// Serve the store over the length-prefixed JSON RPC protocol
    #[cfg(feature = "rpc")]
    Serve(ServeArgs),
}

/// A query is a `QueryFunc`, given as JSON on the command line; this binary
/// is a thin wrapper over the library's AST, not a surface query language of
/// its own (see `SPEC_FULL.md`'s Open Questions).
#[derive(clap::Args, Debug)]
pub struct SelectArgs {
    #[command(flatten)]
    pub store: StoreOpenArgs,

    /// `QueryFunc`, as JSON
    #[arg(short, long)]
    pub query: String,

    /// Narrows the bound query root to this path, as a JSON step array
    #[arg(long)]
    pub subpath: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct InsertArgs {
    #[command(flatten)]
    pub store: StoreOpenArgs,

    /// Target path, as a JSON step array, e.g. `[{"MapKey":"users"},{"ArrayIndex":0}]`
    #[arg(short, long)]
    pub path: String,

    /// The value to insert, as JSON
    #[arg(short, long)]
    pub value: String,

    /// Append to the array at `path` instead of overwriting it
    #[arg(long)]
    pub append: bool,

    /// Allow overwriting an already-occupied path
    #[arg(long)]
    pub overwrite: bool,
}

#[derive(clap::Args, Debug)]
pub struct RemoveArgs {
    #[command(flatten)]
    pub store: StoreOpenArgs,

    /// `QueryFunc`, as JSON
    #[arg(short, long)]
    pub query: String,

    #[arg(long)]
    pub subpath: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct UpdateArgs {
    #[command(flatten)]
    pub store: StoreOpenArgs,

    /// `QueryFunc`, as JSON
    #[arg(short, long)]
    pub query: String,

    /// One or more `Change`s, as a JSON array
    #[arg(short, long)]
    pub changes: String,

    #[arg(long)]
    pub subpath: Option<String>,
}

#[cfg(feature = "rpc")]
#[derive(clap::Args, Debug)]
pub struct ServeArgs {
    #[command(flatten)]
    pub store: StoreOpenArgs,

    /// Bind address
    #[arg(long, default_value = "127.0.0.1", env = "MINIDB_HOST")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = 22322, env = "MINIDB_PORT")]
    pub port: u16,
}
