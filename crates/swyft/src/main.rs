//! SwyftNav CLI - browse a learning portal from the terminal.
//!
//! Provides commands for:
//! - `search`: Full-text search over every page
//! - `open`: Open a tab by id or URL
//! - `tree`: Show sections or one section's navigation tree
//! - `next` / `prev`: Step through pages from the last opened one
//! - `prefs`: Show or change persisted preferences

mod commands;
mod context;
mod error;
mod output;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use swyft_site::Direction;
use tracing_subscriber::EnvFilter;

use commands::{OpenArgs, PrefsArgs, SearchArgs, TreeArgs};
use output::Output;

/// SwyftNav - learning portal navigator.
#[derive(Parser)]
#[command(name = "swyft", version, about)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every command.
#[derive(Args)]
pub(crate) struct GlobalArgs {
    /// Path to configuration file (default: auto-discover swyft.toml).
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Site directory or URL (overrides config).
    #[arg(short, long, global = true, env = "SWYFT_SOURCE")]
    pub source: Option<String>,

    /// Hosting base path such as `/docs/` (overrides config).
    #[arg(long, global = true)]
    pub base_path: Option<String>,

    /// Directory for persisted state (overrides config).
    #[arg(long, global = true)]
    pub state_dir: Option<PathBuf>,

    /// Disable the cache-busting query parameter on remote fetches.
    #[arg(long, global = true)]
    pub no_cache_bust: bool,

    /// Enable verbose output (load and navigation logs).
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Search every page.
    Search(SearchArgs),
    /// Open a tab by id, section id or URL.
    Open(OpenArgs),
    /// Show the section list, or one section's navigation tree.
    Tree(TreeArgs),
    /// Open the page after the last opened one.
    Next,
    /// Open the page before the last opened one.
    Prev,
    /// Show or change preferences.
    Prefs(PrefsArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.global.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
    let global = cli.global;
    let result = rt.block_on(async move {
        match cli.command {
            Commands::Search(args) => args.execute(&global).await,
            Commands::Open(args) => args.execute(&global).await,
            Commands::Tree(args) => args.execute(&global).await,
            Commands::Next => commands::step(&global, Direction::Next).await,
            Commands::Prev => commands::step(&global, Direction::Previous).await,
            Commands::Prefs(args) => args.execute(&global),
        }
    });

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
