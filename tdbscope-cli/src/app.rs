use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// tdbscope - rebuild type layouts and method signatures from a runtime type database dump
#[derive(Debug, Parser)]
#[command(name = "tdbscope", version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOptions,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared across all subcommands.
#[derive(Debug, Parser)]
pub struct GlobalOptions {
    /// Emit output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose (debug-level) logging output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Read the import configuration from a JSON file.
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the full import and print a summary of every stage.
    Import {
        /// Directory holding the numbered TDB chunk files.
        #[arg(value_name = "TDB_DIR")]
        tdb: PathBuf,

        /// Directory of raw memory chunks to map before importing.
        #[arg(short, long, value_name = "DIR")]
        memory: Option<PathBuf>,
    },

    /// Show the reconstructed member layout of a type.
    Layout {
        /// Directory holding the numbered TDB chunk files.
        #[arg(value_name = "TDB_DIR")]
        tdb: PathBuf,

        /// Full name of the type (e.g., app.Player).
        #[arg(value_name = "TYPE")]
        name: String,
    },

    /// List the methods of a type with their addresses and signatures.
    Methods {
        /// Directory holding the numbered TDB chunk files.
        #[arg(value_name = "TDB_DIR")]
        tdb: PathBuf,

        /// Full name of the type (e.g., app.Player).
        #[arg(value_name = "TYPE")]
        name: String,
    },

    /// Render every structure and function as a C header.
    Header {
        /// Directory holding the numbered TDB chunk files.
        #[arg(value_name = "TDB_DIR")]
        tdb: PathBuf,

        /// Write the header to a file instead of stdout.
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}
