mod app;
mod commands;
mod output;

use clap::Parser;

use crate::app::{Cli, Command};

fn main() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        eprintln!("\nCancelled.");
        std::process::exit(130);
    })
    .expect("failed to set Ctrl+C handler");

    let cli = Cli::parse();

    // Show tdbscope info+ on stderr unless --json; --verbose enables debug; RUST_LOG overrides
    if !cli.global.json {
        let level = if cli.global.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        };
        env_logger::Builder::new()
            .filter_module("tdbscope", level)
            .parse_default_env()
            .target(env_logger::Target::Stderr)
            .format_timestamp(None)
            .format_module_path(false)
            .format_target(false)
            .init();
    }

    match &cli.command {
        Command::Import { tdb, memory } => {
            commands::import::run(tdb, memory.as_deref(), &cli.global)
        }
        Command::Layout { tdb, name } => commands::layout::run(tdb, name, &cli.global),
        Command::Methods { tdb, name } => commands::methods::run(tdb, name, &cli.global),
        Command::Header { tdb, output } => {
            commands::header::run(tdb, output.as_deref(), &cli.global)
        }
    }
}
