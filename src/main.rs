//! # NCM Lookup CLI (`ncm`)
//!
//! ## Usage
//!
//! ```bash
//! ncm --config ./config/ncm.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `ncm init` | Create the SQLite database and its schema |
//! | `ncm hydrate [--file <json>]` | Build or restore the context snapshot |
//! | `ncm describe <code>...` | Print chapter/position descriptions |
//! | `ncm info` | Show size and age of the stored snapshot |
//! | `ncm clear` | Delete the stored snapshot |
//! | `ncm format <code>...` | Print codes with dot grouping |
//! | `ncm terms <input>...` | Print the search variants of a code |
//! | `ncm date <value>...` | Print dates as `DD/MM/YYYY` |
//! | `ncm normalize <text>...` | Print accent-insensitive search keys |
//! | `ncm decode <text>...` | Decode HTML entities |
//! | `ncm completions <shell>` | Generate shell completions |
//!
//! Set `RUST_LOG=debug` to see cache hydration and storage details.

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use ncm_lookup::cache_cmd::{self, DatasetSource, HydrateMode};
use ncm_lookup::codes::CodePattern;
use ncm_lookup::text_cmd::{self, TextOp};
use ncm_lookup::{config, migrate};

/// NCM Lookup CLI — chapter and position descriptions for NCM codes,
/// cached in a local snapshot.
#[derive(Parser)]
#[command(
    name = "ncm",
    about = "NCM Lookup — chapter and position descriptions for NCM codes",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/ncm.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema. Idempotent.
    Init,

    /// Build the context snapshot from the dataset.
    ///
    /// By default a fresh snapshot of the current format is adopted as is
    /// and the dataset is used only when none exists.
    Hydrate {
        /// Read the dataset from a JSON array instead of the backend.
        #[arg(long)]
        file: Option<PathBuf>,

        /// Drop the stored snapshot and rebuild from the dataset.
        #[arg(long, conflicts_with = "add")]
        rebuild: bool,

        /// Keep stored descriptions; only add chapters and positions not yet known.
        #[arg(long)]
        add: bool,
    },

    /// Describe codes using the stored snapshot.
    ///
    /// Two-digit codes are described by their chapter, everything else by
    /// its position.
    Describe {
        #[arg(required = true)]
        codes: Vec<String>,
    },

    /// Show size and age of the stored snapshot.
    Info,

    /// Delete the stored snapshot.
    Clear,

    /// Format codes with dot grouping.
    Format {
        #[arg(required = true)]
        codes: Vec<String>,

        /// Grouping: `4-2-2` or `2-2-2-2`.
        #[arg(long, default_value = "4-2-2")]
        pattern: CodePattern,
    },

    /// Print the search variants of a typed code.
    Terms {
        #[arg(required = true)]
        inputs: Vec<String>,
    },

    /// Format dates as DD/MM/YYYY.
    Date {
        #[arg(required = true)]
        values: Vec<String>,
    },

    /// Lowercase and strip accents.
    Normalize {
        #[arg(required = true)]
        values: Vec<String>,
    },

    /// Decode HTML entities.
    Decode {
        #[arg(required = true)]
        values: Vec<String>,
    },

    /// Generate shell completions on stdout.
    Completions { shell: Shell },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    // Commands that don't require config
    match cli.command {
        Commands::Format { codes, pattern } => {
            return text_cmd::run_text(&TextOp::Format { pattern }, &codes);
        }
        Commands::Terms { inputs } => return text_cmd::run_text(&TextOp::Terms, &inputs),
        Commands::Date { values } => return text_cmd::run_text(&TextOp::Date, &values),
        Commands::Normalize { values } => {
            return text_cmd::run_text(&TextOp::Normalize, &values);
        }
        Commands::Decode { values } => return text_cmd::run_text(&TextOp::Decode, &values),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "ncm", &mut std::io::stdout());
            return Ok(());
        }
        command => {
            let cfg = config::load_config(&cli.config)?;
            match command {
                Commands::Init => {
                    migrate::run_migrations(&cfg).await?;
                    println!("Database initialized successfully.");
                }
                Commands::Hydrate { file, rebuild, add } => {
                    let source = match &file {
                        Some(path) => DatasetSource::File(path),
                        None => DatasetSource::Backend,
                    };
                    let mode = if rebuild {
                        HydrateMode::Rebuild
                    } else if add {
                        HydrateMode::Add
                    } else {
                        HydrateMode::Initialize
                    };
                    cache_cmd::run_hydrate(&cfg, source, mode).await?;
                }
                Commands::Describe { codes } => cache_cmd::run_describe(&cfg, &codes).await?,
                Commands::Info => cache_cmd::run_info(&cfg).await?,
                Commands::Clear => cache_cmd::run_clear(&cfg).await?,
                _ => unreachable!("handled before config loading"),
            }
        }
    }

    Ok(())
}
