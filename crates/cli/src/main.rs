//! Pocket Cart CLI - drive a file-backed cart from the shell.
//!
//! # Usage
//!
//! ```bash
//! # Show the cart
//! cart list
//!
//! # Add a product (adding it again increments it)
//! cart add --id sku-1 --title "Pineapple" --image-url https://img.example/p.png --price 4.99
//!
//! # Change quantities
//! cart increment sku-1
//! cart decrement sku-1
//!
//! # Empty the cart
//! cart clear
//! ```
//!
//! # Commands
//!
//! - `list` - Print the cart
//! - `add` - Add one unit of a product
//! - `increment` / `decrement` - Change a product's quantity by one
//! - `count` - Print the total number of units
//! - `clear` - Empty the cart
//!
//! Configuration comes from the environment (see
//! [`CartConfig`](pocket_cart_store::CartConfig)); `--storage-path` overrides
//! `CART_STORAGE_PATH`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use pocket_cart_core::ProductId;
use rust_decimal::Decimal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "cart")]
#[command(author, version, about = "Pocket Cart command-line tools")]
struct Cli {
    /// Cart file (overrides `CART_STORAGE_PATH`)
    #[arg(long, global = true)]
    storage_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the cart
    List,
    /// Add one unit of a product
    Add {
        /// Product ID
        #[arg(long)]
        id: ProductId,

        /// Product title
        #[arg(long)]
        title: String,

        /// Product image URL
        #[arg(long, default_value = "")]
        image_url: String,

        /// Unit price
        #[arg(long)]
        price: Decimal,
    },
    /// Increase a product's quantity by one
    Increment {
        /// Product ID
        id: ProductId,
    },
    /// Decrease a product's quantity by one, removing it at zero
    Decrement {
        /// Product ID
        id: ProductId,
    },
    /// Print the total number of units in the cart
    Count,
    /// Empty the cart
    Clear,
}

#[tokio::main]
async fn main() {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "pocket_cart_store=info,pocket_cart_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = pocket_cart_store::CartConfig::from_env()?;
    if let Some(path) = cli.storage_path {
        config.storage_path = path;
    }

    let store = commands::cart::open(&config).await?;

    let output = match cli.command {
        Commands::List => commands::cart::render(&store.products()),
        Commands::Add {
            id,
            title,
            image_url,
            price,
        } => commands::cart::add(&store, id, title, image_url, price).await?,
        Commands::Increment { id } => commands::cart::increment(&store, id.as_str()).await?,
        Commands::Decrement { id } => commands::cart::decrement(&store, id.as_str()).await?,
        Commands::Count => store.item_count().to_string(),
        Commands::Clear => {
            store.clear_cart().await?;
            commands::cart::render(&store.products())
        }
    };

    #[allow(clippy::print_stdout)]
    {
        println!("{output}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_product_id_rejected_by_every_command() {
        assert!(Cli::try_parse_from(["cart", "increment", ""]).is_err());
        assert!(Cli::try_parse_from(["cart", "decrement", ""]).is_err());
        assert!(
            Cli::try_parse_from(["cart", "add", "--id", "", "--title", "t", "--price", "1"])
                .is_err()
        );
    }

    #[test]
    fn test_product_id_parsed() {
        let cli = Cli::try_parse_from(["cart", "decrement", "sku-1"]).unwrap();
        assert!(matches!(cli.command, Commands::Decrement { id } if id == "sku-1"));
    }
}
