//! RocketCart CLI - Inspect and change the saved shopper cart.
//!
//! # Usage
//!
//! ```bash
//! # Show the cart
//! rocketcart show
//!
//! # Add one unit of product 42
//! rocketcart add 42
//!
//! # Set product 42 to three units
//! rocketcart update 42 3
//!
//! # Remove product 42
//! rocketcart remove 42
//! ```
//!
//! Configuration is read from the environment (and `.env`); see
//! `rocketcart_storefront::config` for the variables.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use rocketcart_core::ProductId;
use rocketcart_storefront::CartConfig;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "rocketcart")]
#[command(author, version, about = "RocketCart shopper cart")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the cart with totals
    Show,
    /// Add one unit of a product
    Add {
        /// Product ID
        product_id: ProductId,
    },
    /// Remove a product from the cart
    Remove {
        /// Product ID
        product_id: ProductId,
    },
    /// Set a product's quantity (values below 1 are ignored)
    Update {
        /// Product ID
        product_id: ProductId,

        /// New quantity
        #[arg(allow_negative_numbers = true)]
        amount: i64,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &CartConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load configuration from environment (needed for Sentry init)
    let config = match CartConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing_subscriber::fmt::init();
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(2);
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Defaults to warn so command output stays readable; RUST_LOG overrides
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "rocketcart_storefront=warn,rocketcart_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    if let Err(e) = run(cli, &config).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &CartConfig) -> Result<(), commands::CommandError> {
    let cart = commands::open_cart(config).await?;

    match cli.command {
        Commands::Show => commands::cart::show(&cart)?,
        Commands::Add { product_id } => commands::cart::add(&cart, product_id).await?,
        Commands::Remove { product_id } => commands::cart::remove(&cart, product_id).await?,
        Commands::Update { product_id, amount } => {
            commands::cart::update(&cart, product_id, amount).await?;
        }
    }
    Ok(())
}
