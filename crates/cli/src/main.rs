//! Kiyoh Sync CLI - sync runs and diagnostics.
//!
//! # Usage
//!
//! ```bash
//! # Bulk sync the catalog file to the review platform
//! kiyoh-cli sync --scope 1 --catalog catalog.json
//!
//! # See what would be synced without sending anything
//! kiyoh-cli sync --scope 1 --dry-run
//!
//! # Sync a single product as a smoke test
//! kiyoh-cli sync-product --sku SKU-1 --scope 1
//!
//! # Inspect the effective configuration for a scope
//! kiyoh-cli check-config --scope 1
//!
//! # Read shop or product review statistics
//! kiyoh-cli stats --scope 1
//! kiyoh-cli stats --scope 1 --product-code SKU-1
//!
//! # Validate product data without syncing
//! kiyoh-cli validate-products --scope 1
//!
//! # Validate credentials before saving them
//! kiyoh-cli validate-credentials --server kiyoh.com --location-id 1054321
//! kiyoh-cli validate-credentials --legacy --server kiyoh.nl --connector abc --company-id 77
//! ```
//!
//! # Configuration
//!
//! Settings come from `KIYOH_*` environment variables (a `.env` file is
//! loaded when present); `KIYOH_STORE_<scope>_*` variables override per
//! scope. The catalog is read from a JSON file of product records.

#![cfg_attr(not(test), forbid(unsafe_code))]
// A CLI talks to its operator on stdout.
#![allow(clippy::print_stdout)]

use clap::{Parser, Subcommand};

mod catalog_file;
mod commands;
mod env_config;

#[derive(Parser)]
#[command(name = "kiyoh-cli")]
#[command(author, version, about = "Kiyoh review-sync CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bulk sync all products to the review platform
    Sync {
        /// Store scope to sync (0 = all stores)
        #[arg(short, long, default_value_t = 0)]
        scope: u32,

        /// Path to the JSON catalog file
        #[arg(short, long, default_value = "catalog.json")]
        catalog: String,

        /// Products per batch
        #[arg(long, default_value_t = 200)]
        batch_size: usize,

        /// Show what would be synced without actually syncing
        #[arg(short, long)]
        dry_run: bool,
    },
    /// Sync a single product as a smoke test
    SyncProduct {
        /// SKU of the product to sync
        #[arg(long)]
        sku: String,

        /// Store scope
        #[arg(short, long, default_value_t = 0)]
        scope: u32,

        /// Path to the JSON catalog file
        #[arg(short, long, default_value = "catalog.json")]
        catalog: String,
    },
    /// Print the effective configuration for a scope
    CheckConfig {
        /// Store scope to check
        #[arg(short, long, default_value_t = 0)]
        scope: u32,
    },
    /// Read shop or product review statistics
    Stats {
        /// Store scope
        #[arg(short, long, default_value_t = 0)]
        scope: u32,

        /// Read statistics for one product instead of the shop
        #[arg(long)]
        product_code: Option<String>,
    },
    /// Run the payload builder across the catalog and report failures
    ValidateProducts {
        /// Store scope
        #[arg(short, long, default_value_t = 0)]
        scope: u32,

        /// Path to the JSON catalog file
        #[arg(short, long, default_value = "catalog.json")]
        catalog: String,
    },
    /// Validate API credentials against the live platform
    ValidateCredentials {
        /// Server selector (e.g. kiyoh.com, klantenvertellen.nl)
        #[arg(long, default_value = "kiyoh.com")]
        server: String,

        /// Location id for the publication API
        #[arg(long)]
        location_id: Option<String>,

        /// Validate legacy connector credentials instead
        #[arg(long)]
        legacy: bool,

        /// Legacy connector code
        #[arg(long)]
        connector: Option<String>,

        /// Legacy company id
        #[arg(long)]
        company_id: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    // Load .env if present before anything reads configuration
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Sync {
            scope,
            catalog,
            batch_size,
            dry_run,
        } => commands::sync::bulk(scope, &catalog, batch_size, dry_run).await?,
        Commands::SyncProduct {
            sku,
            scope,
            catalog,
        } => commands::sync::single(&sku, scope, &catalog).await?,
        Commands::CheckConfig { scope } => commands::config::check(scope),
        Commands::Stats {
            scope,
            product_code,
        } => commands::stats::show(scope, product_code.as_deref()).await?,
        Commands::ValidateProducts { scope, catalog } => {
            commands::validate::products(scope, &catalog)?;
        }
        Commands::ValidateCredentials {
            server,
            location_id,
            legacy,
            connector,
            company_id,
        } => {
            commands::validate::credentials(
                &server,
                location_id.as_deref(),
                legacy,
                connector.as_deref(),
                company_id.as_deref(),
            )
            .await?;
        }
    }
    Ok(())
}
