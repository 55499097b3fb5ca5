#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tokio::net::TcpListener;
use vehicle_auction_service::auction::model::{Auction, AuctionStatus, Bid, Bidder};
use vehicle_auction_service::bidding::commands::PlaceBidCommand;
use vehicle_auction_service::handlers;
use vehicle_auction_service::store::{
    AuctionStore, DynAuctionStore, MemoryAuctionStore, NewAuction, NewBid, StoreError,
};

pub const STARTING_PRICE: i64 = 10_000_000;
pub const MIN_INCREMENT: i64 = 100_000;

pub fn mem_store() -> DynAuctionStore {
    Arc::new(MemoryAuctionStore::new())
}

/// Seed an auction whose start/end are offsets in seconds from now.
pub async fn seed_auction(
    store: &DynAuctionStore,
    status: AuctionStatus,
    start_offset_secs: i64,
    end_offset_secs: i64,
) -> Auction {
    seed_auction_with(
        store,
        status,
        start_offset_secs,
        end_offset_secs,
        STARTING_PRICE,
        MIN_INCREMENT,
    )
    .await
}

pub async fn seed_auction_with(
    store: &DynAuctionStore,
    status: AuctionStatus,
    start_offset_secs: i64,
    end_offset_secs: i64,
    starting_price: i64,
    min_increment: i64,
) -> Auction {
    let now = Utc::now();
    store
        .insert_auction(NewAuction {
            vehicle_id: 1,
            starting_price,
            min_increment,
            deposit_amount: 50_000,
            start_time: now + Duration::seconds(start_offset_secs),
            end_time: now + Duration::seconds(end_offset_secs),
            status,
        })
        .await
        .unwrap()
}

pub fn bid_cmd(amount: i64) -> PlaceBidCommand {
    PlaceBidCommand {
        amount,
        user_id: Some(1),
        bidder_name: "Test Bidder".to_string(),
        bidder_phone: "+56912345678".to_string(),
        bidder_email: None,
    }
}

pub fn guest_bid_cmd(amount: i64) -> PlaceBidCommand {
    PlaceBidCommand {
        amount,
        user_id: None,
        bidder_name: "Guest Bidder".to_string(),
        bidder_phone: "+56987654321".to_string(),
        bidder_email: Some("guest@example.com".to_string()),
    }
}

/// Append a bid directly at the store level, bypassing validation.
/// Used to seed history on auctions whose window already passed.
pub async fn seed_bid(store: &DynAuctionStore, auction: &Auction, amount: i64) {
    let fresh = store.get_auction(auction.id).await.unwrap().unwrap();
    store
        .commit_bid(
            fresh.id,
            fresh.version,
            NewBid {
                bidder: Bidder::Registered { user_id: 1 },
                amount,
                created_at: Utc::now(),
            },
            None,
        )
        .await
        .unwrap();
}

/// Store whose bid commits always lose the version race, as if a rival
/// bidder landed between every read and write. Everything else delegates
/// to the in-memory store.
#[derive(Default)]
pub struct ContendedCommitStore {
    inner: MemoryAuctionStore,
}

impl ContendedCommitStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuctionStore for ContendedCommitStore {
    async fn insert_auction(&self, auction: NewAuction) -> Result<Auction, StoreError> {
        self.inner.insert_auction(auction).await
    }

    async fn get_auction(&self, id: i64) -> Result<Option<Auction>, StoreError> {
        self.inner.get_auction(id).await
    }

    async fn list_auctions(
        &self,
        status: Option<AuctionStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Auction>, StoreError> {
        self.inner.list_auctions(status, limit, offset).await
    }

    async fn count_auctions(&self, status: Option<AuctionStatus>) -> Result<i64, StoreError> {
        self.inner.count_auctions(status).await
    }

    async fn get_highest_bid(&self, auction_id: i64) -> Result<Option<Bid>, StoreError> {
        self.inner.get_highest_bid(auction_id).await
    }

    async fn bid_count(&self, auction_id: i64) -> Result<i64, StoreError> {
        self.inner.bid_count(auction_id).await
    }

    async fn bid_history(&self, auction_id: i64) -> Result<Vec<Bid>, StoreError> {
        self.inner.bid_history(auction_id).await
    }

    async fn commit_bid(
        &self,
        auction_id: i64,
        _expected_version: i64,
        _bid: NewBid,
        _new_end_time: Option<DateTime<Utc>>,
    ) -> Result<Bid, StoreError> {
        Err(StoreError::VersionConflict(auction_id))
    }

    async fn set_status(
        &self,
        auction_id: i64,
        from: AuctionStatus,
        to: AuctionStatus,
    ) -> Result<bool, StoreError> {
        self.inner.set_status(auction_id, from, to).await
    }

    async fn sweep_due_transitions(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        self.inner.sweep_due_transitions(now).await
    }
}

/// Serve the app on an ephemeral port and return its base URL.
pub async fn spawn_app(store: DynAuctionStore) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = handlers::routes(store);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}
