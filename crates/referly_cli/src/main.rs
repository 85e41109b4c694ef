//! Referly CLI
//!
//! Terminal front end over the referral stores:
//! - Query the referral history with service-side paging and filtering
//! - Browse the first fetched page with the store's client-side filters
//! - Add referrals, show points and profile
//! - Read and persist the light/dark/system theme choice
//!
//! The referral service is the in-process mock; every run starts from a
//! freshly seeded history.

use anyhow::Result;
use clap::{Parser, Subcommand};
use referly_api::MockApi;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use commands::{AddArgs, BrowseArgs, Context, HistoryArgs, ThemeCommand};
use config::ReferlyConfig;

#[derive(Parser)]
#[command(name = "referly")]
#[command(about = "Referly - referral history, points and theme preference", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path (defaults to ./referly.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Query referral history from the service
    History(HistoryArgs),

    /// Add a manual referral
    Add(AddArgs),

    /// Show the points balance
    Points,

    /// Show the current user's profile
    Profile,

    /// Browse the first fetched page with client-side filters
    Browse(BrowseArgs),

    /// Show or change the theme preference
    Theme {
        #[command(subcommand)]
        command: Option<ThemeCommand>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = ReferlyConfig::load(cli.config.as_deref())?;
    debug!(?config, "configuration loaded");

    let ctx = Context {
        api: Arc::new(MockApi::seeded(config.api)),
        storage_dir: config.theme.storage_dir,
        json: cli.json,
    };

    let output = match cli.command {
        Commands::History(args) => commands::history(&ctx, args).await?,
        Commands::Add(args) => commands::add(&ctx, args).await?,
        Commands::Points => commands::points(&ctx).await?,
        Commands::Profile => commands::profile(&ctx).await?,
        Commands::Browse(args) => commands::browse(&ctx, args).await?,
        Commands::Theme { command } => {
            commands::theme(&ctx, command.unwrap_or(ThemeCommand::Get))?
        }
    };

    print!("{output}");
    if ctx.json {
        println!();
    }
    Ok(())
}
