//! jsvalue CLI
//!
//! Main entry point for static value resolution of JavaScript files

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;

mod check;
mod diagnostics;
mod logging;
mod resolve;

#[derive(Parser)]
#[command(name = "jsvalue")]
#[command(about = "Static value resolution for JavaScript", long_about = None)]
#[command(version)]
struct Cli {
    /// Log debug output to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Output format of `resolve`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Generated program followed by `name = value` lines
    Text,
    /// One JSON document
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a file and print the known value of every global
    Resolve {
        /// Entry file
        file: PathBuf,

        /// Do not follow `require('./...')` calls into other files
        #[arg(long)]
        no_follow_requires: bool,

        /// Config file (defaults to the nearest jsvalue.toml)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: Format,
    },

    /// Parse files and report syntax errors
    Check {
        /// Files to check
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);

    let success = match cli.command {
        Commands::Resolve {
            file,
            no_follow_requires,
            config,
            format,
        } => resolve::resolve(&file, config.as_deref(), no_follow_requires, format)?,
        Commands::Check { files } => check::check(&files)?,
    };

    Ok(if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
