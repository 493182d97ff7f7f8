//! The `commit` and `rollback` subcommands.

use std::error::Error;

use crate::{cli::StoreOpenArgs, commands::common::open_store};

pub fn commit(args: &StoreOpenArgs) -> Result<(), Box<dyn Error>> {
    let store = open_store(args)?;
    store.commit()?;
    println!("committed");
    Ok(())
}

pub fn rollback(args: &StoreOpenArgs) -> Result<(), Box<dyn Error>> {
    let store = open_store(args)?;
    store.rollback()?;
    println!("rolled back");
    Ok(())
}
