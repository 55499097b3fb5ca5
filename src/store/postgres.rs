// region:    --- Imports
use crate::auction::model::{Auction, AuctionStatus, Bid, Bidder};
use crate::database::DatabaseManager;
use crate::query::queries;
use crate::store::{AuctionStore, NewAuction, NewBid, StoreError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

// endregion: --- Imports

/// sqlx/Postgres implementation of the persistence contract.
pub struct PostgresAuctionStore {
    db: Arc<DatabaseManager>,
}

impl PostgresAuctionStore {
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }
}

fn bidder_columns(bidder: &Bidder) -> (Option<i64>, Option<&str>, Option<&str>, Option<&str>) {
    match bidder {
        Bidder::Registered { user_id } => (Some(*user_id), None, None, None),
        Bidder::Guest { name, phone, email } => {
            (None, Some(name.as_str()), Some(phone.as_str()), email.as_deref())
        }
    }
}

#[async_trait]
impl AuctionStore for PostgresAuctionStore {
    async fn insert_auction(&self, auction: NewAuction) -> Result<Auction, StoreError> {
        let row = sqlx::query_as::<_, Auction>(queries::INSERT_AUCTION)
            .bind(auction.vehicle_id)
            .bind(auction.starting_price)
            .bind(auction.min_increment)
            .bind(auction.deposit_amount)
            .bind(auction.start_time)
            .bind(auction.end_time)
            .bind(auction.status)
            .fetch_one(self.db.pool())
            .await?;
        Ok(row)
    }

    async fn get_auction(&self, id: i64) -> Result<Option<Auction>, StoreError> {
        let row = sqlx::query_as::<_, Auction>(queries::GET_AUCTION)
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(row)
    }

    async fn list_auctions(
        &self,
        status: Option<AuctionStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Auction>, StoreError> {
        let rows = sqlx::query_as::<_, Auction>(queries::LIST_AUCTIONS)
            .bind(status)
            .bind(limit)
            .bind(offset)
            .fetch_all(self.db.pool())
            .await?;
        Ok(rows)
    }

    async fn count_auctions(&self, status: Option<AuctionStatus>) -> Result<i64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>(queries::COUNT_AUCTIONS)
            .bind(status)
            .fetch_one(self.db.pool())
            .await?;
        Ok(count)
    }

    async fn get_highest_bid(&self, auction_id: i64) -> Result<Option<Bid>, StoreError> {
        let row = sqlx::query_as::<_, Bid>(queries::GET_HIGHEST_BID)
            .bind(auction_id)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(row)
    }

    async fn bid_count(&self, auction_id: i64) -> Result<i64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>(queries::COUNT_BIDS)
            .bind(auction_id)
            .fetch_one(self.db.pool())
            .await?;
        Ok(count)
    }

    async fn bid_history(&self, auction_id: i64) -> Result<Vec<Bid>, StoreError> {
        let rows = sqlx::query_as::<_, Bid>(queries::GET_BID_HISTORY)
            .bind(auction_id)
            .fetch_all(self.db.pool())
            .await?;
        Ok(rows)
    }

    async fn commit_bid(
        &self,
        auction_id: i64,
        expected_version: i64,
        bid: NewBid,
        new_end_time: Option<DateTime<Utc>>,
    ) -> Result<Bid, StoreError> {
        self.db
            .transaction(|tx| {
                Box::pin(async move {
                    let claimed = sqlx::query(queries::CLAIM_AUCTION_VERSION)
                        .bind(auction_id)
                        .bind(expected_version)
                        .bind(new_end_time)
                        .execute(&mut **tx)
                        .await?;
                    if claimed.rows_affected() == 0 {
                        return Err(StoreError::VersionConflict(auction_id));
                    }

                    let (user_id, name, phone, email) = bidder_columns(&bid.bidder);
                    let row = sqlx::query_as::<_, Bid>(queries::INSERT_BID)
                        .bind(auction_id)
                        .bind(user_id)
                        .bind(name)
                        .bind(phone)
                        .bind(email)
                        .bind(bid.amount)
                        .bind(bid.created_at)
                        .fetch_one(&mut **tx)
                        .await?;
                    Ok(row)
                })
            })
            .await
    }

    async fn set_status(
        &self,
        auction_id: i64,
        from: AuctionStatus,
        to: AuctionStatus,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(queries::SET_STATUS)
            .bind(auction_id)
            .bind(from)
            .bind(to)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn sweep_due_transitions(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut moved = 0;
        for sql in [
            queries::SWEEP_ACTIVATE,
            queries::SWEEP_END_WITH_BIDS,
            queries::SWEEP_END_WITHOUT_BIDS,
            queries::SWEEP_GRACE_ELAPSED,
        ] {
            moved += sqlx::query(sql)
                .bind(now)
                .execute(self.db.pool())
                .await?
                .rows_affected();
        }
        Ok(moved)
    }
}
