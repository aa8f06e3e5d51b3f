//! Ekocart CLI - local cart and catalog tools.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! ekocart catalog list --category jewelery
//! ekocart catalog categories
//!
//! # Work with a cart kept in a local file
//! ekocart cart add --catalog-id 1
//! ekocart cart show
//! ```
//!
//! # Commands
//!
//! - `cart` - Add, remove, decrease and show a file-backed cart
//! - `catalog` - List catalog products and categories

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ekocart_core::CurrencyCode;
use ekocart_storefront::catalog::CatalogClient;
use ekocart_storefront::config::CatalogConfig;
use ekocart_storefront::listing::CatalogFilter;

mod commands;
mod file_storage;

use commands::cart::{AddArgs, TargetArgs};
use file_storage::{DEFAULT_CART_FILE, FileStorage};

#[derive(Parser)]
#[command(name = "ekocart")]
#[command(author, version, about = "Ekocart CLI tools")]
struct Cli {
    /// Cart file
    #[arg(long, global = true, env = "EKOCART_CART_FILE", default_value = DEFAULT_CART_FILE)]
    cart_file: PathBuf,

    /// Catalog API base URL
    #[arg(long, global = true, env = "CATALOG_API_URL", default_value = "https://fakestoreapi.com")]
    catalog_url: String,

    /// Currency prices are shown in
    #[arg(long, global = true, env = "STOREFRONT_CURRENCY", default_value = "USD")]
    currency: CurrencyCode,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the local cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Browse the product catalog
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Add one unit of a product
    Add(AddArgs),
    /// Remove a line entirely
    Remove(TargetArgs),
    /// Take one unit off a line
    Decrease(TargetArgs),
    /// Show the cart with line totals and subtotal
    Show,
}

#[derive(Subcommand)]
enum CatalogAction {
    /// List products
    List {
        /// Exact category name
        #[arg(short, long)]
        category: Option<String>,

        /// Case-insensitive title search
        #[arg(short, long)]
        query: Option<String>,

        /// Page number
        #[arg(short, long, default_value_t = 1)]
        page: usize,
    },
    /// List categories
    Categories,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Logs go to stderr; stdout carries command output
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = CatalogClient::new(&CatalogConfig {
        api_url: cli.catalog_url,
        ..CatalogConfig::default()
    })?;
    let storage = FileStorage::new(cli.cart_file);
    let mut out = std::io::stdout().lock();

    match cli.command {
        Commands::Cart { action } => match action {
            CartAction::Add(args) => commands::cart::add(storage, &catalog, args, &mut out).await?,
            CartAction::Remove(args) => commands::cart::remove(storage, args, &mut out)?,
            CartAction::Decrease(args) => commands::cart::decrease(storage, args, &mut out)?,
            CartAction::Show => commands::cart::show(storage, cli.currency, &mut out)?,
        },
        Commands::Catalog { action } => match action {
            CatalogAction::List {
                category,
                query,
                page,
            } => {
                let filter = CatalogFilter { category, query };
                commands::catalog::list(&catalog, &filter, page, cli.currency, &mut out).await?;
            }
            CatalogAction::Categories => commands::catalog::categories(&catalog, &mut out).await?,
        },
    }

    out.flush()?;
    Ok(())
}
