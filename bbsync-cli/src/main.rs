//! bbsync CLI - Banco do Brasil statements in your terminal

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use bbsync_core::DateParam;
use commands::{balance, certs, statement, ConnectionArgs};

/// bbsync - fetch Banco do Brasil statements over mutual TLS
#[derive(Parser)]
#[command(name = "bbsync", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch and classify a full account statement
    Statement {
        #[command(flatten)]
        connection: ConnectionArgs,
        /// Start date (YYYY-MM-DD, or wire-encoded DMMYYYY)
        #[arg(long)]
        from: Option<DateParam>,
        /// End date (YYYY-MM-DD, or wire-encoded DMMYYYY)
        #[arg(long)]
        to: Option<DateParam>,
        /// Lines per page (50-200)
        #[arg(long)]
        page_size: Option<u32>,
        /// Give up after this many seconds for the whole statement
        #[arg(long)]
        deadline_secs: Option<u64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the current balance from the latest statement
    Balance {
        #[command(flatten)]
        connection: ConnectionArgs,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Resolve (and materialize) a wallet's certificates
    Certs {
        /// Wallet id
        #[arg(long, env = "BB_WALLET")]
        wallet: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let result = run(cli);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr, filtered by RUST_LOG (default: warn)
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Statement { connection, from, to, page_size, deadline_secs, json } => {
            statement::run(connection, from, to, page_size, deadline_secs, json)
        }
        Commands::Balance { connection, json } => balance::run(connection, json),
        Commands::Certs { wallet, json } => certs::run(&wallet, json),
    }
}
