//! Mercado CLI - Command-line storefront client.
//!
//! # Usage
//!
//! ```bash
//! # Browse as a guest: the cart lives in a local state file
//! mercado cart add 42 -q 2
//! mercado cart show
//!
//! # Log in: the guest cart is replayed into the backend cart
//! mercado login -e ana@example.com -p 'secret-password'
//!
//! # File a PQRS ticket (stored locally when offline or logged out)
//! mercado tickets create -t complaint -s "Late delivery" -d "Order #1881 is a week late"
//! ```
//!
//! # Environment Variables
//!
//! - `MERCADO_API_BASE_URL` - Base URL of the Mercado REST backend (required)
//! - `MERCADO_API_TIMEOUT_SECS` - Per-request timeout in seconds
//! - `MERCADO_STORAGE_PATH` - Local state file (default: per-user data dir)

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::print_stdout)]

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use mercado_client::config::ClientConfig;
use mercado_client::context::StoreContext;
use mercado_client::storage::JsonFileStore;

mod commands;

#[derive(Parser)]
#[command(name = "mercado")]
#[command(author, version, about = "Mercado storefront CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account and log in
    Register {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// Password (min 8 characters)
        #[arg(short, long)]
        password: String,
    },
    /// Log in with email and password
    Login {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password
        #[arg(short, long)]
        password: String,
    },
    /// Log out and clear the local session
    Logout,
    /// Show the current session
    Whoami,
    /// Shopping cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Favorite products
    Favorites {
        #[command(subcommand)]
        action: FavoritesAction,
    },
    /// PQRS tickets (petitions, complaints, claims, suggestions)
    Tickets {
        #[command(subcommand)]
        action: TicketsAction,
    },
    /// Product reviews
    Reviews {
        #[command(subcommand)]
        action: ReviewsAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart contents and total
    Show,
    /// Add a product to the cart
    Add {
        /// Product ID
        product_id: i64,

        /// Quantity to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Set the quantity of a cart line (0 removes it)
    Set {
        /// Product ID
        product_id: i64,

        /// New quantity
        quantity: u32,
    },
    /// Remove a product from the cart
    Remove {
        /// Product ID
        product_id: i64,
    },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum FavoritesAction {
    /// List favorite products
    List,
    /// Add a product to favorites (parked until login when logged out)
    Add {
        /// Product ID
        product_id: i64,
    },
    /// Remove a product from favorites
    Remove {
        /// Product ID
        product_id: i64,
    },
}

#[derive(Subcommand)]
enum TicketsAction {
    /// File a new ticket
    Create {
        /// Ticket type (`petition`, `complaint`, `claim`, `suggestion`)
        #[arg(short = 't', long = "type")]
        ticket_type: String,

        /// Short subject line
        #[arg(short, long)]
        subject: String,

        /// Full description
        #[arg(short, long)]
        description: String,
    },
    /// List tickets
    List,
    /// Push locally held tickets to the backend
    Migrate,
}

#[derive(Subcommand)]
enum ReviewsAction {
    /// List reviews for a product
    List {
        /// Product ID
        product_id: i64,
    },
    /// Submit a review for a product
    Submit {
        /// Product ID
        product_id: i64,

        /// Star rating, 1-5
        #[arg(short, long)]
        rating: u8,

        /// Review comment
        #[arg(short, long)]
        comment: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::debug!("command failed: {e:?}");
        eprintln!("{}", e.user_message());
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> mercado_client::error::Result<()> {
    let config = ClientConfig::from_env().map_err(|e| {
        mercado_client::ClientError::Validation(e.to_string())
    })?;

    let store = JsonFileStore::open(state_file_path(&config)).map_err(|e| {
        mercado_client::ClientError::Validation(format!("could not open local state file: {e}"))
    })?;
    let ctx = StoreContext::from_config(&config, Arc::new(store));

    match cli.command {
        Commands::Register {
            email,
            name,
            password,
        } => commands::auth::register(&ctx, &email, &name, &password).await,
        Commands::Login { email, password } => {
            commands::auth::login(&ctx, &email, &password).await
        }
        Commands::Logout => commands::auth::logout(&ctx).await,
        Commands::Whoami => commands::auth::whoami(&ctx),
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&ctx).await,
            CartAction::Add {
                product_id,
                quantity,
            } => commands::cart::add(&ctx, product_id.into(), quantity).await,
            CartAction::Set {
                product_id,
                quantity,
            } => commands::cart::set_quantity(&ctx, product_id.into(), quantity).await,
            CartAction::Remove { product_id } => {
                commands::cart::remove(&ctx, product_id.into()).await
            }
            CartAction::Clear => commands::cart::clear(&ctx).await,
        },
        Commands::Favorites { action } => match action {
            FavoritesAction::List => commands::favorites::list(&ctx),
            FavoritesAction::Add { product_id } => {
                commands::favorites::add(&ctx, product_id.into()).await
            }
            FavoritesAction::Remove { product_id } => {
                commands::favorites::remove(&ctx, product_id.into()).await
            }
        },
        Commands::Tickets { action } => match action {
            TicketsAction::Create {
                ticket_type,
                subject,
                description,
            } => commands::tickets::create(&ctx, &ticket_type, subject, description).await,
            TicketsAction::List => commands::tickets::list(&ctx).await,
            TicketsAction::Migrate => commands::tickets::migrate(&ctx).await,
        },
        Commands::Reviews { action } => match action {
            ReviewsAction::List { product_id } => {
                commands::reviews::list(&ctx, product_id.into()).await
            }
            ReviewsAction::Submit {
                product_id,
                rating,
                comment,
            } => commands::reviews::submit(&ctx, product_id.into(), rating, &comment).await,
        },
    }
}

/// Local state file: configured path, or a per-user data directory.
fn state_file_path(config: &ClientConfig) -> PathBuf {
    config.storage_path.clone().unwrap_or_else(|| {
        dirs::data_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("mercado")
            .join("state.json")
    })
}
