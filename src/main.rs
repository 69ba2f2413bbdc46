mod commands;
mod info;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use vaultbridge::diagnostics;
use vaultbridge::pipeline::Format;

/// Environment variable holding the log filter, e.g. `debug` or `vaultbridge=trace`.
const LOG_ENV: &str = "VAULTBRIDGE_LOG";

#[derive(Parser)]
#[command(name = "vaultbridge", about = "Resolve links and assets between a markdown vault and a document store", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a store batch for the vault: identifiers become note paths
    Export {
        /// Batch JSON file with store content
        batch: PathBuf,
        /// Write the resolved batch here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// List the references found in one file
    Extract {
        /// File to read
        file: String,
        /// Syntax family of the file's content
        #[arg(long, value_enum, default_value = "markup")]
        format: Format,
        /// Output as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Resolve a vault batch for the store: names become identifiers
    Import {
        /// Batch JSON file with vault content, identifiers, and uploaded assets
        batch: PathBuf,
        /// Write the resolved batch here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print syntax reference, workflow, and current configuration
    Info {
        /// Output as JSON instead of markdown
        #[arg(long)]
        json: bool,
    },
    /// List the references in every vault note under the working directory
    Scan {
        /// Output as JSON instead of markdown
        #[arg(long)]
        json: bool,
    },
}

/// Install the stderr log subscriber. Defaults to warnings only.
fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_err| return EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Run the CLI. Exit 0 on success, 1 with unresolved references, 3 on error.
fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Export { batch, out } => commands::export(&batch, out.as_deref()),
        Commands::Extract { file, format, json } => commands::extract(&file, format, json).map(|()| return ExitCode::SUCCESS),
        Commands::Import { batch, out } => commands::import(&batch, out.as_deref()),
        Commands::Info { json } => {
            commands::info(json);
            Ok(ExitCode::SUCCESS)
        },
        Commands::Scan { json } => commands::scan(json).map(|()| return ExitCode::SUCCESS),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::from(3)
        },
    }
}
