//! Bosa Noga CLI - browse the catalog, manage the cart, and place orders.
//!
//! # Usage
//!
//! ```bash
//! # Catalog
//! bn-cli categories
//! bn-cli items --category 12 --query красный --all
//! bn-cli item 20
//!
//! # Cart (persisted in BOSANOGA_CART_DIR)
//! bn-cli cart add 20 38 --count 2
//! bn-cli cart set 20 38 5
//! bn-cli cart show
//!
//! # Checkout
//! bn-cli order --phone "+7 999 123-45-67" --address "Москва, ул. Тверская, д. 1"
//! ```
//!
//! The storefront address and retry behaviour come from the `BOSANOGA_API_*`
//! environment variables.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::Context;

#[derive(Parser)]
#[command(name = "bn-cli")]
#[command(author, version, about = "Bosa Noga storefront CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the storefront is up
    Health,
    /// List categories
    Categories,
    /// List featured products
    TopSales,
    /// List products
    Items {
        /// Category id (0 for every category)
        #[arg(short, long, default_value_t = 0)]
        category: i32,

        /// Search text
        #[arg(short, long)]
        query: Option<String>,

        /// Keep loading pages until the listing is exhausted
        #[arg(short, long)]
        all: bool,
    },
    /// Show one product
    Item {
        /// Product id
        id: i32,
    },
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Submit the cart as an order
    Order {
        /// Contact phone
        #[arg(short, long)]
        phone: String,

        /// Delivery address
        #[arg(short, long)]
        address: String,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart contents
    Show,
    /// Add a product in a size
    Add {
        id: i32,
        size: String,

        #[arg(short, long, default_value_t = 1)]
        count: i64,
    },
    /// Remove a line
    Remove { id: i32, size: String },
    /// Set a line's quantity (0 removes it)
    Set { id: i32, size: String, count: i64 },
    /// Empty the cart
    Clear,
}

#[tokio::main]
async fn main() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "bn_cli=info,bosanoga_client=warn".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().without_time().with_target(false))
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Context::from_env()?;

    match cli.command {
        Commands::Health => commands::catalog::health(&ctx).await?,
        Commands::Categories => commands::catalog::categories(&ctx).await?,
        Commands::TopSales => commands::catalog::top_sales(&ctx).await?,
        Commands::Items {
            category,
            query,
            all,
        } => commands::catalog::items(&ctx, category, query.as_deref(), all).await?,
        Commands::Item { id } => commands::catalog::item(&ctx, id).await?,
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&ctx),
            CartAction::Add { id, size, count } => commands::cart::add(&ctx, id, &size, count).await?,
            CartAction::Remove { id, size } => commands::cart::remove(&ctx, id, &size)?,
            CartAction::Set { id, size, count } => commands::cart::set(&ctx, id, &size, count)?,
            CartAction::Clear => commands::cart::clear(&ctx),
        },
        Commands::Order { phone, address } => commands::order::submit(&ctx, phone, address).await?,
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_cart_add() {
        let cli = Cli::try_parse_from(["bn-cli", "cart", "add", "20", "38", "--count", "2"]).unwrap();
        match cli.command {
            Commands::Cart {
                action: CartAction::Add { id, size, count },
            } => {
                assert_eq!(id, 20);
                assert_eq!(size, "38");
                assert_eq!(count, 2);
            }
            _ => panic!("expected cart add"),
        }
    }

    #[test]
    fn test_parse_items_defaults() {
        let cli = Cli::try_parse_from(["bn-cli", "items"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Items {
                category: 0,
                query: None,
                all: false
            }
        ));
    }
}
