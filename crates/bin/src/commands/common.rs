//! Shared helpers for opening a `Store` and parsing path arguments.

use std::error::Error;

use minidb::{PathBuf, Store, StoreConfig};

use crate::cli::StoreOpenArgs;

pub fn open_store(args: &StoreOpenArgs) -> Result<Store, Box<dyn Error>> {
    let mut config = StoreConfig::new(args.db.clone()).with_pretty_json(args.pretty);
    if let Some(fuel) = args.fuel {
        config = config.with_fuel_budget(fuel);
    }
    Ok(Store::open(config)?)
}

pub fn parse_subpath(raw: &Option<String>) -> Result<Option<PathBuf>, Box<dyn Error>> {
    match raw {
        Some(s) => Ok(Some(serde_json::from_str(s)?)),
        None => Ok(None),
    }
}
