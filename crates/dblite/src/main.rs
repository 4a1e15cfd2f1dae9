//! dblite CLI - query and edit record tables from the command line.
//!
//! Records are read and printed as JSON objects, one per line. Filters use
//! the same JSON syntax as the library, e.g. `{"age": {"greater-or-equal": 18}}`.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;
use dblite::AutoCommit;
use tracing_subscriber::EnvFilter;

mod cli;

/// dblite: plain records in `SQLite`.
#[derive(Parser)]
#[command(name = "dblite")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Storage URI, sqlite://<database>:<table> (overrides the config file)
    #[arg(short, long, global = true)]
    uri: Option<String>,

    /// Configuration file (defaults to ./dblite.yaml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print records matching a filter
    Get {
        /// Filter as a JSON object
        #[arg(short = 'w', long = "where")]
        filter: Option<String>,
    },

    /// Store records given as JSON objects (or JSON lines on stdin)
    Put {
        /// Comma-separated field list used to create the table
        #[arg(short, long)]
        fields: Option<String>,

        /// Commit after every N puts (true, false, or a count)
        #[arg(short, long, value_parser = parse_autocommit)]
        autocommit: Option<AutoCommit>,

        /// Records to store; read from stdin when omitted
        records: Vec<String>,
    },

    /// Delete records matching a filter
    Delete {
        /// Filter as a JSON object
        #[arg(short = 'w', long = "where", required_unless_present = "all")]
        filter: Option<String>,

        /// Delete every record
        #[arg(long, conflicts_with = "filter")]
        all: bool,
    },

    /// Count records matching a filter
    Count {
        /// Filter as a JSON object
        #[arg(short = 'w', long = "where")]
        filter: Option<String>,
    },

    /// Show the SQL a filter translates to, without running it
    Sql {
        /// Filter as a JSON object
        #[arg(short = 'w', long = "where")]
        filter: Option<String>,

        /// Show the DELETE statement instead of the SELECT
        #[arg(long)]
        delete: bool,
    },
}

fn parse_autocommit(s: &str) -> Result<AutoCommit, String> {
    s.parse().map_err(|e: dblite::Error| e.to_string())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let ctx = match cli::Context::new(cli.uri, cli.config.as_deref()) {
        Ok(ctx) => ctx,
        Err(e) => return report(&e),
    };

    let result = match cli.command {
        Commands::Get { filter } => cli::get::run(&ctx, filter.as_deref()),
        Commands::Put {
            fields,
            autocommit,
            records,
        } => cli::put::run(&ctx, fields.as_deref(), autocommit, &records),
        Commands::Delete { filter, all } => cli::delete::run(&ctx, filter.as_deref(), all),
        Commands::Count { filter } => cli::count::run(&ctx, filter.as_deref()),
        Commands::Sql { filter, delete } => cli::sql::run(&ctx, filter.as_deref(), delete),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report(&e),
    }
}

fn report(e: &dblite::Error) -> ExitCode {
    eprintln!("{}: {e}", "error".red().bold());
    // Show cause chain for nested errors
    let mut source = std::error::Error::source(e);
    while let Some(cause) = source {
        eprintln!("  {}: {cause}", "caused by".dimmed());
        source = std::error::Error::source(cause);
    }
    ExitCode::FAILURE
}
