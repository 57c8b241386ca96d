//! Bistro CLI - Browse the menu, fill the cart, and place orders.
//!
//! # Usage
//!
//! ```bash
//! # Browse the menu
//! bistro menu categories
//! bistro menu list --category 2 --vegetarian
//! bistro menu show 4
//!
//! # Fill the cart
//! bistro cart add 4 -q 2 --note "extra chili"
//! bistro cart set 1 3
//! bistro cart show
//!
//! # Check out and follow the order
//! bistro checkout --name "Ada Lovelace" --email ada@example.com \
//!     --phone "+44 20 7946 0000" --address "12 Analytical Row, London"
//! bistro orders status 1 confirmed
//! bistro orders cancel 1
//! ```
//!
//! # Commands
//!
//! - `menu` - Categories, filtered item lists, item details
//! - `cart` - Show and change the cart
//! - `checkout` - Place an order for the cart
//! - `orders` - List orders and change their status

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use bistro_core::{CategoryId, MenuItemId, OrderId, OrderStatus, PaymentMethod};
use bistro_store::AppState;
use bistro_store::config::StoreConfig;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::CliError;
use commands::checkout::CheckoutForm;

#[derive(Parser)]
#[command(name = "bistro")]
#[command(author, version, about = "Bistro menu, cart, and order tool")]
struct Cli {
    /// Override the data directory (`BISTRO_DATA_DIR`)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Override the catalog document (`BISTRO_CATALOG_PATH`)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the menu
    Menu {
        #[command(subcommand)]
        action: MenuAction,
    },
    /// Show or change the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Place an order for everything in the cart
    Checkout {
        /// Customer name
        #[arg(short, long)]
        name: String,

        /// Customer email address
        #[arg(short, long)]
        email: String,

        /// Customer phone number
        #[arg(short, long)]
        phone: String,

        /// Delivery address
        #[arg(short, long)]
        address: String,

        /// Payment method (`cash`, `card`, `online`)
        #[arg(long, default_value = "card")]
        payment: PaymentMethod,

        /// Anything the kitchen should know
        #[arg(long)]
        requests: Option<String>,
    },
    /// List orders or change their status
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },
}

#[derive(Subcommand)]
enum MenuAction {
    /// List categories
    Categories,
    /// List available items
    List {
        /// Only items in this category
        #[arg(short, long)]
        category: Option<CategoryId>,

        /// Search name, description, and ingredients
        #[arg(short, long)]
        search: Option<String>,

        /// Only vegetarian items
        #[arg(long)]
        vegetarian: bool,

        /// Only spicy items
        #[arg(long)]
        spicy: bool,

        /// Highest price to show
        #[arg(long)]
        max_price: Option<Decimal>,
    },
    /// Show one item
    Show {
        /// Menu item ID
        id: MenuItemId,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart and its totals
    Show,
    /// Add an item
    Add {
        /// Menu item ID
        item: MenuItemId,

        /// Quantity (1-99)
        #[arg(short, long, default_value_t = 1, allow_negative_numbers = true)]
        quantity: i64,

        /// Special instructions for this line
        #[arg(short, long)]
        note: Option<String>,
    },
    /// Change the quantity of a line (0 removes it)
    Set {
        /// Line number from `cart show`, or line ID
        line: String,

        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a line
    Remove {
        /// Line number from `cart show`, or line ID
        line: String,
    },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum OrdersAction {
    /// List all orders
    List,
    /// Show one order
    Show {
        /// Order ID
        id: OrderId,
    },
    /// Set the status of an order
    Status {
        /// Order ID
        id: OrderId,

        /// New status (`pending`, `confirmed`, `preparing`, `ready`, `delivered`, `cancelled`)
        status: OrderStatus,
    },
    /// Cancel an order
    Cancel {
        /// Order ID
        id: OrderId,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StoreConfig) -> Option<sentry::ClientInitGuard> {
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

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    // Load configuration from environment (needed for Sentry init)
    let mut config = StoreConfig::from_env().expect("Failed to load configuration");
    if let Some(data_dir) = &cli.data_dir {
        config.data_dir.clone_from(data_dir);
    }
    if let Some(catalog) = &cli.catalog {
        config.catalog_path.clone_from(catalog);
    }

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "bistro_cli=info,bistro_store=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let state = AppState::open(config).await;

    if let Err(e) = run(&state, cli.command).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(state: &AppState, command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Menu { action } => match action {
            MenuAction::Categories => commands::menu::categories(state),
            MenuAction::List {
                category,
                search,
                vegetarian,
                spicy,
                max_price,
            } => commands::menu::list(
                state,
                commands::menu::ListArgs {
                    category,
                    search,
                    vegetarian,
                    spicy,
                    max_price,
                },
            )?,
            MenuAction::Show { id } => commands::menu::show(state, id)?,
        },
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(state),
            CartAction::Add {
                item,
                quantity,
                note,
            } => commands::cart::add(state, item, quantity, note)?,
            CartAction::Set { line, quantity } => commands::cart::set(state, &line, quantity)?,
            CartAction::Remove { line } => commands::cart::remove(state, &line)?,
            CartAction::Clear => commands::cart::clear(state),
        },
        Commands::Checkout {
            name,
            email,
            phone,
            address,
            payment,
            requests,
        } => {
            let form = CheckoutForm {
                name,
                email,
                phone,
                address,
                payment,
                requests,
            };
            commands::checkout::place(state, form).await?;
        }
        Commands::Orders { action } => match action {
            OrdersAction::List => commands::orders::list(state),
            OrdersAction::Show { id } => commands::orders::show(state, id)?,
            OrdersAction::Status { id, status } => {
                commands::orders::set_status(state, id, status).await?;
            }
            OrdersAction::Cancel { id } => commands::orders::cancel(state, id).await?,
        },
    }
    Ok(())
}
