// region:    --- Imports
use crate::auction::lifecycle;
use crate::auction::model::{Auction, AuctionStatus, Bid};
use crate::store::{AuctionStore, NewAuction, NewBid, StoreError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::Mutex;

// endregion: --- Imports

/// In-memory implementation of the persistence contract, used by the test
/// suite. One mutex over the whole state makes every trait method atomic,
/// which mirrors the per-statement atomicity the Postgres store gets from
/// its transactions.
#[derive(Default)]
pub struct MemoryAuctionStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    auctions: HashMap<i64, Auction>,
    bids: HashMap<i64, Vec<Bid>>,
    next_auction_id: i64,
    next_bid_id: i64,
}

impl MemoryAuctionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuctionStore for MemoryAuctionStore {
    async fn insert_auction(&self, auction: NewAuction) -> Result<Auction, StoreError> {
        let mut inner = self.inner.lock().await;
        inner.next_auction_id += 1;
        let row = Auction {
            id: inner.next_auction_id,
            vehicle_id: auction.vehicle_id,
            starting_price: auction.starting_price,
            min_increment: auction.min_increment,
            deposit_amount: auction.deposit_amount,
            start_time: auction.start_time,
            end_time: auction.end_time,
            status: auction.status,
            version: 0,
            created_at: Utc::now(),
        };
        inner.auctions.insert(row.id, row.clone());
        Ok(row)
    }

    async fn get_auction(&self, id: i64) -> Result<Option<Auction>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.auctions.get(&id).cloned())
    }

    async fn list_auctions(
        &self,
        status: Option<AuctionStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Auction>, StoreError> {
        let inner = self.inner.lock().await;
        let mut rows: Vec<Auction> = inner
            .auctions
            .values()
            .filter(|a| status.map_or(true, |s| a.status == s))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn count_auctions(&self, status: Option<AuctionStatus>) -> Result<i64, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .auctions
            .values()
            .filter(|a| status.map_or(true, |s| a.status == s))
            .count() as i64)
    }

    async fn get_highest_bid(&self, auction_id: i64) -> Result<Option<Bid>, StoreError> {
        let inner = self.inner.lock().await;
        let highest = inner.bids.get(&auction_id).and_then(|bids| {
            bids.iter()
                .max_by(|a, b| {
                    a.amount
                        .cmp(&b.amount)
                        .then(b.created_at.cmp(&a.created_at))
                })
                .cloned()
        });
        Ok(highest)
    }

    async fn bid_count(&self, auction_id: i64) -> Result<i64, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.bids.get(&auction_id).map_or(0, |b| b.len() as i64))
    }

    async fn bid_history(&self, auction_id: i64) -> Result<Vec<Bid>, StoreError> {
        let inner = self.inner.lock().await;
        let mut rows = inner.bids.get(&auction_id).cloned().unwrap_or_default();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn commit_bid(
        &self,
        auction_id: i64,
        expected_version: i64,
        bid: NewBid,
        new_end_time: Option<DateTime<Utc>>,
    ) -> Result<Bid, StoreError> {
        let mut inner = self.inner.lock().await;
        inner.next_bid_id += 1;
        let bid_id = inner.next_bid_id;
        let auction = inner
            .auctions
            .get_mut(&auction_id)
            .ok_or(sqlx::Error::RowNotFound)
            .map_err(StoreError::Database)?;
        if auction.version != expected_version {
            return Err(StoreError::VersionConflict(auction_id));
        }
        auction.version += 1;
        if let Some(end_time) = new_end_time {
            auction.end_time = end_time;
        }
        let row = Bid {
            id: bid_id,
            auction_id,
            bidder: bid.bidder,
            amount: bid.amount,
            created_at: bid.created_at,
        };
        inner.bids.entry(auction_id).or_default().push(row.clone());
        Ok(row)
    }

    async fn set_status(
        &self,
        auction_id: i64,
        from: AuctionStatus,
        to: AuctionStatus,
    ) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().await;
        match inner.auctions.get_mut(&auction_id) {
            Some(auction) if auction.status == from => {
                auction.status = to;
                auction.version += 1;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn sweep_due_transitions(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut inner = self.inner.lock().await;
        let mut moved = 0;
        let ids: Vec<i64> = inner.auctions.keys().copied().collect();
        for id in ids {
            let has_bids = inner.bids.get(&id).map_or(false, |b| !b.is_empty());
            let auction = match inner.auctions.get_mut(&id) {
                Some(a) => a,
                None => continue,
            };
            if let Some(next) = lifecycle::due_transition(auction, has_bids, now) {
                auction.status = next;
                auction.version += 1;
                moved += 1;
            }
        }
        Ok(moved)
    }
}
