//! The `insert` subcommand: write a value at a path.

use std::error::Error;

use minidb::{PathBuf, Value};

use crate::{cli::InsertArgs, commands::common::open_store};

pub fn run(args: &InsertArgs) -> Result<(), Box<dyn Error>> {
    let store = open_store(&args.store)?;
    let path: PathBuf = serde_json::from_str(&args.path)?;
    let value: Value = serde_json::from_str(&args.value)?;
    store.insert(&path, value, args.append, args.overwrite)?;
    println!("inserted at {path}");
    Ok(())
}
