/// Periodic status sweeper.
/// Lazy evaluation on read and at bid time already keeps polled auctions
/// correct; the sweep covers auctions nobody queries again.
// region:    --- Imports
use crate::store::DynAuctionStore;
use chrono::Utc;
use std::sync::Arc;
use tokio::time::{interval, Duration};
use tracing::{debug, error};

// endregion: --- Imports

// region:    --- Auction Sweeper

pub struct AuctionSweeper {
    store: DynAuctionStore,
}

impl AuctionSweeper {
    pub fn new(store: DynAuctionStore) -> Self {
        Self { store }
    }

    /// Spawn the sweep loop.
    pub fn start(&self) {
        let store = Arc::clone(&self.store);
        tokio::spawn(async move {
            let mut interval = interval(Duration::from_secs(1));
            loop {
                interval.tick().await;
                match store.sweep_due_transitions(Utc::now()).await {
                    Ok(moved) if moved > 0 => {
                        debug!("{:<12} --> {} auction(s) transitioned", "Sweeper", moved);
                    }
                    Ok(_) => {}
                    Err(e) => {
                        error!("{:<12} --> sweep failed: {:?}", "Sweeper", e);
                    }
                }
            }
        });
    }
}

// endregion: --- Auction Sweeper
