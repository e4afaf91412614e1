//! Brimline CLI - the storefront from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Log in (the session persists in BRIMLINE_STATE_DIR)
//! brim auth login -e kim@brimline.shop -p hunter2
//!
//! # Browse and shop
//! brim products list --brand Brimline --sort price-low
//! brim cart add cap-1 --size M --color Olive
//! brim checkout --phone 555-0100 --address "1 Brim St"
//!
//! # Admin
//! brim orders status o-1 shipped
//! brim orders stats
//! ```
//!
//! # Commands
//!
//! - `products` - Browse the catalog; admins may add, update and delete
//! - `cart` - Local cart with background sync to the backend
//! - `auth` - Login session
//! - `orders` - Order history and admin order management
//! - `checkout` - Pay for the cart and place an order

#![cfg_attr(not(test), forbid(unsafe_code))]

use brimline_core::{CartLineKey, OrderId, OrderStatus, ProductId, ProductPatch, ProfilePatch};
use brimline_storefront::Storefront;
use brimline_storefront::catalog::{ProductFilter, SortOrder};
use brimline_storefront::checkout::CheckoutForm;
use brimline_storefront::config::StorefrontConfig;
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use secrecy::SecretString;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::CommandError;

#[derive(Parser)]
#[command(name = "brim")]
#[command(author, version, about = "Brimline storefront CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse and manage products
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
    /// Manage the shopping cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Log in, register and inspect the session
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },
    /// View and manage orders
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },
    /// Pay for the cart and place an order
    Checkout(CheckoutArgs),
}

#[derive(Subcommand)]
enum ProductsAction {
    /// List products
    List(ListArgs),
    /// Show one product
    Show { id: String },
    /// List the brands and tags in the catalog
    Facets,
    /// Add a product (admin)
    Add {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        brand: String,
        #[arg(short, long)]
        price: Decimal,
        /// Variant as COLOR:SIZE:STOCK; repeatable
        #[arg(short, long = "variant")]
        variants: Vec<String>,
    },
    /// Update a product (admin)
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        price: Option<Decimal>,
        #[arg(long)]
        available: Option<bool>,
    },
    /// Delete a product (admin)
    Delete { id: String },
}

#[derive(Args)]
struct ListArgs {
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    brand: Option<String>,
    /// Require this tag; repeatable
    #[arg(long = "tag")]
    tags: Vec<String>,
    /// Only products with stock left
    #[arg(long)]
    in_stock: bool,
    #[arg(long)]
    min_price: Option<Decimal>,
    #[arg(long)]
    max_price: Option<Decimal>,
    /// Case-insensitive name search
    #[arg(short, long)]
    search: Option<String>,
    /// newest, price-low, price-high, name or popular
    #[arg(long, default_value = "newest")]
    sort: SortOrder,
}

#[derive(Args)]
struct LineArgs {
    product_id: String,
    #[arg(short, long)]
    size: String,
    #[arg(short, long)]
    color: String,
}

impl LineArgs {
    fn key(&self) -> CartLineKey {
        CartLineKey::new(self.product_id.as_str(), &self.size, &self.color)
    }
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart lines and totals
    Show,
    /// Add a product variant
    Add {
        #[command(flatten)]
        line: LineArgs,
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Remove a line
    Remove {
        #[command(flatten)]
        line: LineArgs,
    },
    /// Set a line's quantity (0 removes it)
    Set {
        #[command(flatten)]
        line: LineArgs,
        #[arg(short, long)]
        quantity: u32,
    },
    /// Empty the cart
    Clear,
    /// Replace the local cart with the server's
    Sync,
}

#[derive(Subcommand)]
enum AuthAction {
    /// Log in with email and password
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
    /// Create an account and log in
    Register {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
    /// Forget the local session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Update profile details kept with the session
    Profile {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        address: Option<String>,
    },
}

#[derive(Subcommand)]
enum OrdersAction {
    /// List your orders
    List {
        /// Every customer's orders (admin)
        #[arg(long)]
        all: bool,
    },
    /// Show one order
    Show { id: String },
    /// Change an order's status (admin)
    Status {
        id: String,
        status: OrderStatus,
        /// Reopen a delivered or cancelled order
        #[arg(long)]
        force: bool,
    },
    /// Order totals (admin)
    Stats,
}

#[derive(Args)]
struct CheckoutArgs {
    /// Defaults to the profile name
    #[arg(long, default_value = "")]
    name: String,
    /// Defaults to the profile email
    #[arg(long, default_value = "")]
    email: String,
    #[arg(long, default_value = "")]
    phone: String,
    #[arg(long, default_value = "")]
    address: String,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
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
    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing_subscriber::fmt().with_writer(std::io::stderr).init();
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(2);
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);

    // Logs go to stderr; stdout carries command output
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "brimline_storefront=info,brimline_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli, config).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: StorefrontConfig) -> Result<(), CommandError> {
    let mut storefront = Storefront::open(config)?;
    let sf = &mut storefront;

    match cli.command {
        Commands::Products { action } => match action {
            ProductsAction::List(args) => {
                commands::products::list(sf, &list_options(args)).await?;
            }
            ProductsAction::Show { id } => {
                commands::products::show(sf, &ProductId::new(id)).await?;
            }
            ProductsAction::Facets => commands::products::facets(sf).await?,
            ProductsAction::Add {
                name,
                brand,
                price,
                variants,
            } => {
                let variants = variants
                    .iter()
                    .map(String::as_str)
                    .map(commands::products::parse_variant)
                    .collect::<Result<Vec<_>, _>>()?;
                commands::products::add(sf, &name, &brand, price, variants).await?;
            }
            ProductsAction::Update {
                id,
                name,
                price,
                available,
            } => {
                let patch = ProductPatch {
                    name,
                    price,
                    is_available: available,
                    ..ProductPatch::default()
                };
                commands::products::update(sf, &ProductId::new(id), &patch).await?;
            }
            ProductsAction::Delete { id } => {
                commands::products::delete(sf, &ProductId::new(id)).await?;
            }
        },
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(sf)?,
            CartAction::Add { line, quantity } => {
                let id = ProductId::new(line.product_id.as_str());
                commands::cart::add(sf, &id, &line.size, &line.color, quantity).await?;
            }
            CartAction::Remove { line } => commands::cart::remove(sf, &line.key()).await?,
            CartAction::Set { line, quantity } => {
                commands::cart::set(sf, &line.key(), quantity).await?;
            }
            CartAction::Clear => commands::cart::clear(sf).await?,
            CartAction::Sync => commands::cart::sync(sf).await?,
        },
        Commands::Auth { action } => match action {
            AuthAction::Login { email, password } => {
                let password = SecretString::from(password);
                commands::auth::login(sf, &email, &password).await?;
            }
            AuthAction::Register {
                name,
                email,
                password,
            } => {
                let password = SecretString::from(password);
                commands::auth::register(sf, &name, &email, &password).await?;
            }
            AuthAction::Logout => commands::auth::logout(sf),
            AuthAction::Whoami => commands::auth::whoami(sf),
            AuthAction::Profile {
                name,
                phone,
                address,
            } => {
                let patch = ProfilePatch {
                    name,
                    phone,
                    address,
                    ..ProfilePatch::default()
                };
                commands::auth::update_profile(sf, patch)?;
            }
        },
        Commands::Orders { action } => match action {
            OrdersAction::List { all } => commands::orders::list(sf, all).await?,
            OrdersAction::Show { id } => commands::orders::show(sf, &OrderId::new(id)).await?,
            OrdersAction::Status { id, status, force } => {
                commands::orders::set_status(sf, &OrderId::new(id), status, force).await?;
            }
            OrdersAction::Stats => commands::orders::stats(sf).await?,
        },
        Commands::Checkout(args) => {
            let form = CheckoutForm {
                name: args.name,
                email: args.email,
                phone: args.phone,
                address: args.address,
            };
            commands::checkout::run(sf, form).await?;
        }
    }
    Ok(())
}

fn list_options(args: ListArgs) -> commands::products::ListOptions {
    let mut filter = ProductFilter::default()
        .price_range(args.min_price, args.max_price)
        .search(args.search.unwrap_or_default());
    if let Some(category) = args.category {
        filter = filter.category(category);
    }
    if let Some(brand) = args.brand {
        filter = filter.brand(brand);
    }
    for tag in args.tags {
        filter = filter.tag(tag);
    }
    if args.in_stock {
        filter = filter.in_stock();
    }
    commands::products::ListOptions {
        filter,
        sort: args.sort,
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_list_args_build_filter() {
        let cli = Cli::parse_from([
            "brim", "products", "list", "--brand", "Brimline", "--tag", "wool", "--in-stock",
            "--sort", "price-low",
        ]);
        let Commands::Products {
            action: ProductsAction::List(args),
        } = cli.command
        else {
            panic!("expected products list");
        };
        let options = list_options(args);
        assert_eq!(options.filter.brand.as_deref(), Some("Brimline"));
        assert_eq!(options.filter.tags, vec!["wool".to_owned()]);
        assert!(options.filter.in_stock);
        assert_eq!(options.sort, SortOrder::PriceLowToHigh);
    }

    #[test]
    fn test_cart_line_key() {
        let cli = Cli::parse_from(["brim", "cart", "remove", "cap-1", "-s", "M", "-c", "Olive"]);
        let Commands::Cart {
            action: CartAction::Remove { line },
        } = cli.command
        else {
            panic!("expected cart remove");
        };
        assert_eq!(line.key(), CartLineKey::new("cap-1", "M", "Olive"));
    }
}
