//! `minidb`: a command-line interface over the document store and query engine.

mod cli;
mod commands;
mod output;

use clap::Parser;

use cli::{Cli, Commands};
use output::OutputFormat;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let format = if cli.json { OutputFormat::Json } else { OutputFormat::Human };

    match cli.command {
        Commands::Select(args) => commands::select::run(&args, format),
        Commands::Insert(args) => commands::insert::run(&args),
        Commands::Remove(args) => commands::remove::run(&args),
        Commands::Update(args) => commands::update::run(&args),
        Commands::Commit(args) => commands::commit::commit(&args),
        Commands::Rollback(args) => commands::commit::rollback(&args),
        #[cfg(feature = "rpc")]
        Commands::Serve(args) => commands::serve::run(&args),
    }
}
