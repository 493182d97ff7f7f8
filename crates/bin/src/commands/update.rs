//! The `update` subcommand: apply one or more changes to every result of a query.

use std::error::Error;

use minidb::{Change, QueryFunc};

use crate::{
    cli::UpdateArgs,
    commands::common::{open_store, parse_subpath},
};

pub fn run(args: &UpdateArgs) -> Result<(), Box<dyn Error>> {
    let store = open_store(&args.store)?;
    let qf: QueryFunc = serde_json::from_str(&args.query)?;
    let changes: Vec<Change> = serde_json::from_str(&args.changes)?;
    let subpath = parse_subpath(&args.subpath)?;
    store.update(&qf, &changes, subpath.as_ref())?;
    println!("updated");
    Ok(())
}
