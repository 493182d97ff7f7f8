//! The `remove` subcommand: delete every tree-sourced result of a query.

use std::error::Error;

use minidb::QueryFunc;

use crate::{
    cli::RemoveArgs,
    commands::common::{open_store, parse_subpath},
};

pub fn run(args: &RemoveArgs) -> Result<(), Box<dyn Error>> {
    let store = open_store(&args.store)?;
    let qf: QueryFunc = serde_json::from_str(&args.query)?;
    let subpath = parse_subpath(&args.subpath)?;
    store.remove(&qf, subpath.as_ref())?;
    println!("removed");
    Ok(())
}
