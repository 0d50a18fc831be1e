//! Orderdesk CLI - quantity policy and cart sync tools.
//!
//! # Usage
//!
//! ```bash
//! # Evaluate the quantity policy for a pack-restricted product
//! od-cli quantity blur --stock 5 --pack 3 --indicator 0 --value 7
//!
//! # Show the cart a user would get on sign-in (no writes)
//! od-cli cart show --user 42
//!
//! # Reconcile a user's cart and push it to the remote now
//! od-cli cart sync --user 42
//!
//! # Forget this device's snapshot for a user
//! od-cli cart clear-local --user 42
//! ```
//!
//! # Commands
//!
//! - `quantity` - Run one quantity policy operation
//! - `cart` - Inspect and synchronise carts (needs `CART_REMOTE_URL`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Args, Parser, Subcommand, ValueEnum};
use orderdesk_cart::config::TelemetryConfig;

mod commands;

#[derive(Parser)]
#[command(name = "od-cli")]
#[command(author, version, about = "Orderdesk CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a quantity policy operation
    Quantity {
        /// Operation to run
        #[arg(value_enum)]
        operation: QuantityOperation,

        #[command(flatten)]
        product: ProductArgs,

        /// Quantity currently shown (increment, decrement, typed)
        #[arg(short, long)]
        current: Option<i64>,

        /// Typed value (typed, blur)
        #[arg(short, long)]
        value: Option<String>,
    },
    /// Inspect and synchronise carts
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum QuantityOperation {
    /// Quantity a new line starts with
    Initial,
    /// Press "+"
    Increment,
    /// Press "-"
    Decrement,
    /// Type a value into the field
    Typed,
    /// Leave the field
    Blur,
}

/// Packaging attributes as the catalog supplies them.
#[derive(Args)]
struct ProductArgs {
    /// Free stock
    #[arg(short, long, default_value_t = 0)]
    stock: i64,

    /// Pack quantity
    #[arg(short, long)]
    pack: Option<i64>,

    /// Raw restriction indicator (`0` or `"0"` means restricted)
    #[arg(short, long)]
    indicator: Option<String>,
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the reconciled cart without writing anything
    Show {
        /// User ID
        #[arg(short, long)]
        user: i64,
    },
    /// Reconcile, mirror locally and push to the remote
    Sync {
        /// User ID
        #[arg(short, long)]
        user: i64,
    },
    /// Delete this device's snapshot for a user
    ClearLocal {
        /// User ID
        #[arg(short, long)]
        user: i64,
    },
}

#[tokio::main]
async fn main() {
    let _telemetry = orderdesk_cart::telemetry::init(
        &TelemetryConfig::from_env_or_default(),
        "od_cli=info,orderdesk_cart=info",
    );

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Quantity {
            operation,
            product,
            current,
            value,
        } => {
            let packaging = commands::quantity::packaging(
                product.stock,
                product.pack,
                product.indicator.as_deref(),
            );
            let operation = match operation {
                QuantityOperation::Initial => commands::quantity::Operation::Initial,
                QuantityOperation::Increment => commands::quantity::Operation::Increment,
                QuantityOperation::Decrement => commands::quantity::Operation::Decrement,
                QuantityOperation::Typed => commands::quantity::Operation::Typed,
                QuantityOperation::Blur => commands::quantity::Operation::Blur,
            };
            commands::quantity::run(packaging, operation, current, value.as_deref())?;
        }
        Commands::Cart { action } => match action {
            CartAction::Show { user } => commands::cart::show(user.into()).await?,
            CartAction::Sync { user } => commands::cart::sync(user.into()).await?,
            CartAction::ClearLocal { user } => commands::cart::clear_local(user.into())?,
        },
    }
    Ok(())
}
