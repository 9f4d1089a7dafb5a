//! Gian Hàng Storefront Server
//!
//! A digital-goods storefront backend: public catalog, wallet-debited
//! purchases fulfilled through the TapHoaMMO reseller, and order status
//! polling.

mod api;
mod config;
mod server;
mod shutdown;
mod state;

use clap::Parser;
use gianhang_core::entities::now_utc;
use gianhang_core::entities::product::Product;
use gianhang_core::entities::user::{User, UserStatus};
use gianhang_core::store::{AccountLedger, CatalogStore, MemoryStore, OrderStore, PgStore};
use gianhang_core::supplier::TapHoaMmoClient;
use gianhang_core::workflow::PurchaseWorkflow;
use server::{build_router, run_server};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use state::AppState;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

/// Gian Hàng - digital goods storefront backend
#[derive(Parser, Debug)]
#[command(name = "gianhang-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "./gianhang-config.toml")]
    config: PathBuf,

    /// Override the listen address (e.g., 0.0.0.0:3000)
    #[arg(short, long)]
    listen: Option<SocketAddr>,

    /// Run database migrations on startup
    #[arg(long, default_value = "false")]
    migrate: bool,

    /// Run against an in-memory store seeded with demo data (no database)
    #[arg(long, default_value = "false")]
    memory: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    init_tracing();

    // Parse command line arguments
    let args = Args::parse();

    tracing::info!("Starting gianhang-server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = config::load(&args.config).map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;
    let listen_addr = args.listen.unwrap_or(config.server.listen);
    tracing::info!("Configuration loaded from {:?}", args.config);

    // Supplier gateway shared by every purchase request
    let supplier = Arc::new(TapHoaMmoClient::new(
        config.supplier.base_url.clone(),
        config.supplier.user_token.clone(),
    ));
    let poll = config.supplier.poll_policy();

    // Pick the store backend
    let (catalog, ledger, orders, pool): (
        Arc<dyn CatalogStore>,
        Arc<dyn AccountLedger>,
        Arc<dyn OrderStore>,
        Option<PgPool>,
    ) = if args.memory {
        tracing::info!("Running with the in-memory store (demo mode)");
        let store = Arc::new(MemoryStore::new());
        seed_demo(&store).await;
        (store.clone(), store.clone(), store, None)
    } else {
        // Get database URL from environment
        let database_url = config::database_url().map_err(|e| {
            tracing::error!("DATABASE_URL environment variable not set");
            e
        })?;

        // Create database connection pool
        tracing::info!("Connecting to database...");
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(&database_url)
            .await
            .map_err(|e| {
                tracing::error!("Failed to connect to database: {}", e);
                e
            })?;
        tracing::info!("Database connection established");

        // Run migrations if requested
        if args.migrate {
            tracing::info!("Running database migrations...");
            sqlx::migrate!("../migrations")
                .run(&pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to run migrations: {}", e);
                    e
                })?;
            tracing::info!("Migrations completed successfully");
        }

        let store = Arc::new(PgStore::new(pool.clone()));
        (store.clone(), store.clone(), store, Some(pool))
    };

    // Create application state
    let workflow = Arc::new(
        PurchaseWorkflow::new(catalog.clone(), ledger, orders.clone(), supplier)
            .with_poll_policy(poll),
    );
    let state = AppState {
        workflow,
        catalog,
        orders,
    };

    // Build the router
    let router = build_router(state);

    // Run the server
    tracing::info!("Starting HTTP server on {}", listen_addr);
    let result = run_server(router, listen_addr).await;

    // Close database connections gracefully
    if let Some(pool) = pool {
        tracing::info!("Closing database connections...");
        pool.close().await;
    }
    tracing::info!("Server shutdown complete");

    result.map_err(Into::into)
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Seed one product and one funded buyer so demo mode is usable out of the
/// box. Their ids are logged; pass the user id in the `X-User-Id` header.
async fn seed_demo(store: &MemoryStore) {
    let now = now_utc();
    let product = Product {
        id: Uuid::new_v4(),
        title: "Premium Pack".to_owned(),
        description: "Tài khoản premium 1 tháng".to_owned(),
        price: Some(50_000),
        currency: "VND".to_owned(),
        stock: Some(20),
        sold: 0,
        kiosk_token: Some("DEMO-KIOSK".to_owned()),
        is_active: true,
        options: Json(Vec::new()),
        created_at: now,
        updated_at: now,
    };
    let user = User {
        id: Uuid::new_v4(),
        email: "demo@gianhang.local".to_owned(),
        balance: 500_000,
        total_orders: 0,
        total_spent: 0,
        status: UserStatus::Active,
        created_at: now,
    };
    tracing::info!(
        product_id = %product.id,
        user_id = %user.id,
        "Demo data seeded; send the user id in the X-User-Id header"
    );
    store.insert_product(product).await;
    store.insert_user(user).await;
}
