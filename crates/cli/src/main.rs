//! Shopfront CLI - drive the cart store from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Add one unit of product 1
//! shopfront add 1
//!
//! # Set product 1's amount to 3
//! shopfront update 1 3
//!
//! # Remove product 1
//! shopfront remove 1
//!
//! # Print the current cart
//! shopfront show
//! ```
//!
//! Configuration comes from the environment (a `.env` file is honored):
//! `CATALOG_BASE_URL` is required, `CART_STORAGE_DIR` optional. The cart
//! snapshot persists across invocations.

#![cfg_attr(not(test), forbid(unsafe_code))]
// The CLI reports to the terminal directly
#![allow(clippy::print_stdout, clippy::print_stderr)]

use clap::{Parser, Subcommand};

use shopfront_cart::{CartConfig, CartStore, HttpCatalog, JsonFileStorage, TracingSink};
use shopfront_core::{Cart, ProductId};

#[derive(Parser)]
#[command(name = "shopfront")]
#[command(author, version, about = "Shopfront cart CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add one unit of a product to the cart
    Add {
        /// Product id
        id: i64,
    },
    /// Remove a product line from the cart
    Remove {
        /// Product id
        id: i64,
    },
    /// Set a product line's amount
    Update {
        /// Product id
        id: i64,
        /// Target amount (non-positive values are ignored)
        amount: i64,
    },
    /// Print the current cart
    Show,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = CartConfig::from_env()?;
    let catalog = HttpCatalog::new(&config.catalog)?;
    let storage = JsonFileStorage::new(&config.storage_dir);
    let store = CartStore::new(catalog, storage, TracingSink);

    match cli.command {
        Commands::Add { id } => {
            store.add_product(ProductId::new(id)).await?;
        }
        Commands::Remove { id } => {
            store.remove_product(ProductId::new(id)).await?;
        }
        Commands::Update { id, amount } => {
            store.update_product_amount(ProductId::new(id), amount).await?;
        }
        Commands::Show => {}
    }

    print_cart(&store.cart());
    Ok(())
}

fn print_cart(cart: &Cart) {
    if cart.is_empty() {
        println!("cart is empty");
        return;
    }

    for item in cart.items() {
        println!(
            "{:>6}  {:<40} {:>3} x {:>8}  = {:>9}",
            item.id.to_string(),
            item.title,
            item.amount,
            format!("${}", item.price),
            format!("${}", item.line_total()),
        );
    }
    println!(
        "total: {} item(s), ${}",
        cart.total_quantity(),
        cart.subtotal()
    );
}
