//! The `serve` subcommand: host the store over the length-prefixed JSON RPC
//! protocol instead of exiting after a single operation.

use std::{error::Error, sync::Arc};

use minidb::rpc::RpcServer;

use crate::{cli::ServeArgs, commands::common::open_store};

pub fn run(args: &ServeArgs) -> Result<(), Box<dyn Error>> {
    let store = Arc::new(open_store(&args.store)?);
    let addr = format!("{}:{}", args.host, args.port);
    let server = RpcServer::bind(&addr, store)?;
    println!("listening on {}", server.local_addr()?);
    server.serve_forever()?;
    Ok(())
}
