//! deck-legality CLI tool.
//!
//! Usage:
//! ```bash
//! deck-legality check [OPTIONS] --catalog <CARDS> <DECKLIST>
//! deck-legality recalc [OPTIONS] --catalog <CARDS> <DECKS>
//! deck-legality list-formats
//! deck-legality banned --catalog <CARDS> [--format-name <NAME>]
//! deck-legality init
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

/// Checks trading card game decks against competitive formats
#[derive(Parser)]
#[command(name = "deck-legality")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check one decklist against every format
    Check {
        /// Decklist file, one `<count> <reference>` per line
        decklist: PathBuf,

        /// Card catalog (JSON array of cards)
        #[arg(long, env = "DECK_LEGALITY_CATALOG")]
        catalog: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Recalculate the stored legality of many decks
    Recalc {
        /// Deck records (JSON array or one JSON object per line)
        decks: PathBuf,

        /// Card catalog (JSON array of cards)
        #[arg(long, env = "DECK_LEGALITY_CATALOG")]
        catalog: PathBuf,

        /// Only recalculate decks not stored as legal
        #[arg(long)]
        only_illegal: bool,

        /// Decks written at once (default: from config)
        #[arg(long)]
        chunk_size: Option<usize>,

        /// Where to write updated decks (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List configured formats
    ListFormats,

    /// List catalog cards banned per format
    Banned {
        /// Card catalog (JSON array of cards)
        #[arg(long, env = "DECK_LEGALITY_CATALOG")]
        catalog: PathBuf,

        /// Only this format
        #[arg(long)]
        format_name: Option<String>,
    },

    /// Initialize configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

/// Output format for legality results.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output.
    Json,
    /// One line per format.
    Compact,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    // stdout carries command output
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = || {
        let source = config_resolver::resolve(Path::new("."), cli.config.as_deref());
        config_resolver::load(&source)
    };

    match cli.command {
        Commands::Check {
            decklist,
            catalog,
            format,
        } => commands::check::run(&decklist, &catalog, format, &config()?),
        Commands::Recalc {
            decks,
            catalog,
            only_illegal,
            chunk_size,
            output,
        } => commands::recalc::run(
            &decks,
            &catalog,
            commands::recalc::Overrides {
                only_illegal,
                chunk_size,
            },
            output.as_deref(),
            &config()?,
        ),
        Commands::ListFormats => {
            commands::list_formats::run(&config()?);
            Ok(())
        }
        Commands::Banned {
            catalog,
            format_name,
        } => commands::banned::run(&catalog, format_name.as_deref(), &config()?),
        Commands::Init { force } => commands::init::run(force),
    }
}
