use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Options-screener backend — filter compilation, chain aggregation, and
/// trade lifecycle reconciliation.
#[derive(Parser)]
#[command(name = "wheelhouse", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP API server
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        #[arg(long, default_value = "8787")]
        port: u16,

        /// Directory holding the sqlite database
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,
    },

    /// Run the expiry sweep once against the local store
    Sweep {
        /// Directory holding the sqlite database
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,

        /// Scan and report without writing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Compile a FilterSpec JSON file and print the canonical request
    Screen {
        /// Path to the FilterSpec JSON file
        file: PathBuf,

        /// Execute the compiled request against the provider and print
        /// ranked per-symbol summaries
        #[arg(long)]
        execute: bool,
    },

    /// Mint a bearer token for a user id (operator convenience)
    Token {
        /// User id to embed in the token
        user_id: String,

        /// Directory holding the sqlite database (source of the signing secret)
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,
    },
}
