//! taskboard server - kanban-board backend
//!
//! Starts the Axum REST server over the Sled entity store.
//!
//! Usage:
//!   cargo run --bin seed_data     # populate a demo board
//!   cargo run --bin taskboard     # start the server
//!   # Then drive it with taskboard-cli or curl (routes under /api)
//!
//! Configuration (environment, .env honored):
//!   TASKBOARD_ADDR        bind address, default 0.0.0.0:3000
//!   TASKBOARD_DATA        Sled path, default taskboard_data
//!   TASKBOARD_JWT_SECRET  token signing secret
//!   TASKBOARD_PUSH_URL    push gateway for invitation notifications

use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use taskboard::notify;
use taskboard::rest::create_router;
use taskboard::storage::Store;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("taskboard=info")),
        )
        .init();

    let addr: SocketAddr = std::env::var("TASKBOARD_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
        .parse()?;
    let data_path = std::env::var("TASKBOARD_DATA").unwrap_or_else(|_| "taskboard_data".to_string());

    let store = Store::open(&data_path)?;
    let notifier = notify::from_env();
    let app = create_router(store, notifier);

    tracing::info!(%addr, data = %data_path, "taskboard API starting");

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
