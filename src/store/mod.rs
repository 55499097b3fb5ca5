// region:    --- Imports
use crate::auction::model::{Auction, AuctionStatus, Bid, Bidder};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

// endregion: --- Imports

pub mod memory;
pub mod postgres;

pub use memory::MemoryAuctionStore;
pub use postgres::PostgresAuctionStore;

pub type DynAuctionStore = Arc<dyn AuctionStore>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The auction row moved under an optimistic write; retry from a fresh read.
    #[error("version conflict on auction {0}")]
    VersionConflict(i64),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Auction row as created by the external administrative collaborator.
#[derive(Debug, Clone)]
pub struct NewAuction {
    pub vehicle_id: i64,
    pub starting_price: i64,
    pub min_increment: i64,
    pub deposit_amount: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: AuctionStatus,
}

#[derive(Debug, Clone)]
pub struct NewBid {
    pub bidder: Bidder,
    pub amount: i64,
    pub created_at: DateTime<Utc>,
}

/// Persistence contract for the bidding engine. Injected everywhere the
/// engine runs so tests can substitute the in-memory implementation.
///
/// Writes that race concurrent bid placement (`commit_bid`, `set_status`)
/// bump the auction row version; `commit_bid` is the single atomic unit
/// "insert bid + extend deadline" guarded by a compare-and-swap on the
/// version the caller validated against.
#[async_trait]
pub trait AuctionStore: Send + Sync {
    async fn insert_auction(&self, auction: NewAuction) -> Result<Auction, StoreError>;

    async fn get_auction(&self, id: i64) -> Result<Option<Auction>, StoreError>;

    async fn list_auctions(
        &self,
        status: Option<AuctionStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Auction>, StoreError>;

    /// Number of auctions matching the listing filter.
    async fn count_auctions(&self, status: Option<AuctionStatus>) -> Result<i64, StoreError>;

    /// Highest committed bid; ties on amount break towards the earliest bid.
    async fn get_highest_bid(&self, auction_id: i64) -> Result<Option<Bid>, StoreError>;

    async fn bid_count(&self, auction_id: i64) -> Result<i64, StoreError>;

    /// Full append-only bid log, newest first.
    async fn bid_history(&self, auction_id: i64) -> Result<Vec<Bid>, StoreError>;

    /// Atomically append a bid and, when anti-sniping fired, move the
    /// deadline, iff the auction version still equals `expected_version`.
    /// Fails with [`StoreError::VersionConflict`] otherwise.
    async fn commit_bid(
        &self,
        auction_id: i64,
        expected_version: i64,
        bid: NewBid,
        new_end_time: Option<DateTime<Utc>>,
    ) -> Result<Bid, StoreError>;

    /// Guarded status transition. Returns false when the row was not in
    /// `from` anymore, which callers treat as a lost (benign) race.
    async fn set_status(
        &self,
        auction_id: i64,
        from: AuctionStatus,
        to: AuctionStatus,
    ) -> Result<bool, StoreError>;

    /// Apply every time-driven transition currently due. Idempotent; used by
    /// the periodic sweeper. Returns the number of rows moved.
    async fn sweep_due_transitions(&self, now: DateTime<Utc>) -> Result<u64, StoreError>;
}
