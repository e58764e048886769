use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "cartsync")]
#[command(about = "cartsync CLI - drive the local cart against a storefront cart", long_about = None)]
struct Cli {
    /// Path to config.toml (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the persisted cart and its totals
    Show,
    /// Add a product (plus optional bundle lines) to the cart
    Add(commands::cart::AddArgs),
    /// Set the quantity of a cart item
    Update {
        /// Primary line id of the item
        line_id: String,
        quantity: u32,
    },
    /// Remove a cart item and its bundled lines
    Remove {
        /// Primary line id of the item
        line_id: String,
    },
    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cartsync=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Show => commands::cart::show(config_path)?,
        Commands::Add(args) => commands::cart::add(config_path, args).await?,
        Commands::Update { line_id, quantity } => {
            commands::cart::update(config_path, &line_id, quantity).await?
        }
        Commands::Remove { line_id } => commands::cart::remove(config_path, &line_id).await?,
        Commands::Config => commands::config::print(config_path)?,
    }

    Ok(())
}
