// region:    --- Imports
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};
use vehicle_auction_service::database::DatabaseManager;
use vehicle_auction_service::handlers;
use vehicle_auction_service::scheduler::AuctionSweeper;
use vehicle_auction_service::store::{DynAuctionStore, PostgresAuctionStore};

// endregion: --- Imports

// region:    --- Main
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .without_time()
        .with_target(false)
        .init();

    let db_manager = Arc::new(DatabaseManager::new().await?);

    if let Err(e) = db_manager.initialize_database().await {
        error!("{:<12} --> database initialization failed: {:?}", "Main", e);
        return Err(e.into());
    }
    info!("{:<12} --> database initialized", "Main");

    let store: DynAuctionStore = Arc::new(PostgresAuctionStore::new(Arc::clone(&db_manager)));

    // Time-driven status transitions for auctions nobody polls.
    let sweeper = AuctionSweeper::new(Arc::clone(&store));
    sweeper.start();

    let routes_all = handlers::routes(store);

    let listener = TcpListener::bind("0.0.0.0:3000").await?;
    info!(
        "{:<12} --> Web Server: Listening on {}",
        "Main",
        listener.local_addr()?
    );

    if let Err(err) = axum::serve(listener, routes_all.into_make_service()).await {
        error!("{:<12} --> Server error: {}", "Main", err);
    }
    Ok(())
}
// endregion: --- Main
