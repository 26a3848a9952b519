use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;

use sharedstore::cli::{Cli, Command};
use sharedstore::config::Config;
use sharedstore::{FileStore, SharedStore};

fn setup_logging() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Warn)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging().context("Failed to setup logging")?;

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    let store_path = cli.store.unwrap_or(config.store_path);

    info!("sharedstore opening {}", store_path.display());
    let store = FileStore::open(&store_path).context("Failed to open store")?;

    match cli.command {
        Command::Get { key } => {
            let value = store.get(&key).await?;
            println!("{}", value);
        }
        Command::Set { key, value } => {
            store.set(&key, &value).await?;
            println!("{} {} = {}", "✓".green(), key.cyan(), value);
        }
        Command::Clear => {
            store.clear().await?;
            println!("{} Cleared store: {}", "✓".green(), store_path.display());
        }
        Command::Dump => {
            let snapshot = store.snapshot().await?;
            if snapshot.is_empty() {
                println!("Store is empty");
            } else {
                for (key, value) in snapshot {
                    println!("{} = {}", key.yellow(), value);
                }
            }
        }
    }

    Ok(())
}
