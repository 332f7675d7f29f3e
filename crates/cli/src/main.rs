//! Marketplace CLI - cart and wishlist from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Act as a signed-in user (persists an identity hint)
//! mp-cli login u1
//!
//! # Show who collection commands act as
//! mp-cli whoami
//!
//! # Manage collections
//! mp-cli wishlist add --id p1 --name "Pineapple" --price 500
//! mp-cli cart add --id p2 --name "Mango" --price 3.5 --quantity 2
//! mp-cli cart list
//! mp-cli cart remove p2
//!
//! # Back to the guest collections stored in the data directory
//! mp-cli logout
//! ```
//!
//! Output is JSON on stdout; logs go to stderr. A failed command exits with
//! status 1.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use marketplace_core::{CartItem, WishlistItem};
use marketplace_storefront::storage::{FileStorage, KeyValueStorage};
use marketplace_storefront::{AppContext, StorefrontConfig};

mod commands;

use commands::CliError;
use commands::collection::{self, ProductArgs};

#[derive(Parser)]
#[command(name = "mp-cli")]
#[command(author, version, about = "Marketplace cart and wishlist CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in as a user
    Login {
        /// User ID
        user_id: String,
    },
    /// Sign out and return to the guest collections
    Logout,
    /// Show the identity collection commands act as
    Whoami,
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CollectionAction,
    },
    /// Manage the wishlist
    Wishlist {
        #[command(subcommand)]
        action: CollectionAction,
    },
}

#[derive(Subcommand)]
enum CollectionAction {
    /// List items
    List,
    /// Add an item, merging with an existing entry for the same product
    Add(AddArgs),
    /// Remove an item by product ID
    Remove {
        /// Product ID
        id: String,
    },
}

#[derive(Args)]
struct AddArgs {
    /// Product ID
    #[arg(long)]
    id: String,

    /// Product name
    #[arg(long)]
    name: String,

    /// Unit price
    #[arg(long)]
    price: f64,

    /// Image URL
    #[arg(long)]
    image: Option<String>,

    /// Category label
    #[arg(long)]
    category: Option<String>,

    /// Quantity (cart only)
    #[arg(short, long, default_value_t = 1)]
    quantity: u32,
}

impl AddArgs {
    fn product(self) -> ProductArgs {
        ProductArgs {
            id: self.id,
            name: self.name,
            price: self.price,
            image: self.image,
            category: self.category,
        }
    }
}

#[tokio::main]
async fn main() {
    // Logs go to stderr so stdout stays machine-readable
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "marketplace_cli=info,marketplace_storefront=warn".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = StorefrontConfig::from_env()?;
    let storage: Arc<dyn KeyValueStorage> = Arc::new(FileStorage::new(config.data_dir.clone()));
    let ctx = AppContext::new(config, storage)?;
    let mut out = std::io::stdout().lock();

    match cli.command {
        Commands::Login { user_id } => commands::session::login(&ctx, &user_id, &mut out).await,
        Commands::Logout => commands::session::logout(&ctx, &mut out).await,
        Commands::Whoami => commands::session::whoami(&ctx, &mut out).await,
        Commands::Cart { action } => match action {
            CollectionAction::List => collection::list(ctx.cart(), &mut out).await,
            CollectionAction::Add(args) => {
                let quantity = args.quantity;
                let item = CartItem::with_quantity(args.product().into_product()?, quantity);
                collection::add(ctx.cart(), item, &mut out).await
            }
            CollectionAction::Remove { id } => collection::remove(ctx.cart(), &id, &mut out).await,
        },
        Commands::Wishlist { action } => match action {
            CollectionAction::List => collection::list(ctx.wishlist(), &mut out).await,
            CollectionAction::Add(args) => {
                let item = WishlistItem::new(args.product().into_product()?);
                collection::add(ctx.wishlist(), item, &mut out).await
            }
            CollectionAction::Remove { id } => {
                collection::remove(ctx.wishlist(), &id, &mut out).await
            }
        },
    }
}
