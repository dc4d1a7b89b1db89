//! Fabric CLI - Catalog inspection tools over the fabric backend.
//!
//! # Usage
//!
//! ```bash
//! # List products in a category
//! fab-cli products list --category "Cotton Fabric"
//!
//! # Delete a product
//! fab-cli products delete 17
//!
//! # List shipped orders
//! fab-cli orders list --status shipped
//!
//! # List offline customers
//! fab-cli customers list --status offline
//! ```
//!
//! # Environment Variables
//!
//! - `BACKEND_URL` - Base URL of the fabric backend (required)
//! - `BACKEND_TIMEOUT_SECS` - Request timeout (default: 30)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

use commands::CommandError;

#[derive(Parser)]
#[command(name = "fab-cli")]
#[command(author, version, about = "Fabric admin CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage catalog products
    Products {
        #[command(subcommand)]
        action: ProductAction,
    },
    /// Inspect orders
    Orders {
        #[command(subcommand)]
        action: OrderAction,
    },
    /// Inspect storefront customers
    Customers {
        #[command(subcommand)]
        action: CustomerAction,
    },
}

#[derive(Subcommand)]
enum ProductAction {
    /// List products
    List {
        /// Exact category name (e.g. "Silk Fabric")
        #[arg(short, long)]
        category: Option<String>,

        /// Substring of name, category or sub-category
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Delete a product by ID
    Delete {
        /// Product ID
        id: String,
    },
}

#[derive(Subcommand)]
enum OrderAction {
    /// List orders
    List {
        /// Order status (pending, confirmed, processing, shipped, delivered, cancelled)
        #[arg(short, long)]
        status: Option<String>,
    },
}

#[derive(Subcommand)]
enum CustomerAction {
    /// List customers
    List {
        /// Account status (`active`, `offline`)
        #[arg(short, long)]
        status: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    // Logs go to stderr so listings on stdout stay clean
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CommandError> {
    match cli.command {
        Commands::Products { action } => match action {
            ProductAction::List { category, search } => {
                commands::products::list(category, search).await?;
            }
            ProductAction::Delete { id } => commands::products::delete(&id).await?,
        },
        Commands::Orders { action } => match action {
            OrderAction::List { status } => commands::orders::list(status).await?,
        },
        Commands::Customers { action } => match action {
            CustomerAction::List { status } => commands::customers::list(status).await?,
        },
    }
    Ok(())
}
