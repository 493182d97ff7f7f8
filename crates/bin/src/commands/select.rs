//! The `select` subcommand: run a query and print its results.

use std::error::Error;

use minidb::QueryFunc;

use crate::{
    cli::SelectArgs,
    commands::common::{open_store, parse_subpath},
    output::OutputFormat,
};

pub fn run(args: &SelectArgs, format: OutputFormat) -> Result<(), Box<dyn Error>> {
    let store = open_store(&args.store)?;
    let qf: QueryFunc = serde_json::from_str(&args.query)?;
    let subpath = parse_subpath(&args.subpath)?;

    let results = store.select(&qf, subpath.as_ref())?;

    match format {
        OutputFormat::Human => {
            for value in &results {
                println!("{value}");
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string(&results)?),
    }
    Ok(())
}
