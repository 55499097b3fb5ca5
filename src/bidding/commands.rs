/// Bid placement: validation, minimum-bid enforcement, anti-sniping and the
/// optimistic concurrency loop around the auction row version.
// region:    --- Imports
use crate::auction::model::{self, Auction, AuctionStatus, Bid, Bidder};
use crate::error::ServiceError;
use crate::store::{AuctionStore, NewBid};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

// endregion: --- Imports

// region:    --- Commands

/// Bid request body. Contact details are always collected; a resolved
/// account id makes the bidder registered, otherwise it is a guest bid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceBidCommand {
    pub amount: i64,
    pub user_id: Option<i64>,
    pub bidder_name: String,
    pub bidder_phone: String,
    pub bidder_email: Option<String>,
}

impl PlaceBidCommand {
    fn bidder(&self) -> Bidder {
        match self.user_id {
            Some(user_id) => Bidder::Registered { user_id },
            None => Bidder::Guest {
                name: self.bidder_name.clone(),
                phone: self.bidder_phone.clone(),
                email: self.bidder_email.clone(),
            },
        }
    }
}

/// Result of an accepted bid, including whether the deadline moved.
#[derive(Debug, Clone, Serialize)]
pub struct BidOutcome {
    pub bid: Bid,
    pub new_end_time: Option<DateTime<Utc>>,
    pub anti_sniping_applied: bool,
}

// Retry budget for the optimistic concurrency loop.
const MAX_RETRIES: i32 = 100;

/// Place a bid against an auction.
///
/// Preconditions, each with its own error: the auction exists, is active
/// (applying a due scheduled->active transition first), the clock is inside
/// `[start_time, end_time)`, the amount is positive and meets the computed
/// minimum. On success the bid and any anti-sniping extension commit as one
/// atomic unit guarded by the auction row version; a version conflict means
/// a concurrent bid landed first, so validation restarts from a fresh read.
pub async fn place_bid(
    store: &dyn AuctionStore,
    auction_id: i64,
    cmd: PlaceBidCommand,
) -> Result<BidOutcome, ServiceError> {
    info!(
        "{:<12} --> bid of {} on auction {}",
        "Command", cmd.amount, auction_id
    );
    let mut retries = 0;

    while retries < MAX_RETRIES {
        let auction = store
            .get_auction(auction_id)
            .await?
            .ok_or(ServiceError::NotFound)?;
        let now = Utc::now();

        // Lazy scheduled -> active; revalidate from the bumped row.
        if auction.status == AuctionStatus::Scheduled && now >= auction.start_time {
            store
                .set_status(auction_id, AuctionStatus::Scheduled, AuctionStatus::Active)
                .await?;
            continue;
        }

        validate_window(&auction, now)?;

        if cmd.amount <= 0 {
            return Err(ServiceError::InvalidAmount);
        }

        let highest = store.get_highest_bid(auction_id).await?;
        let min_bid = model::minimum_acceptable_bid(&auction, highest.as_ref());
        if cmd.amount < min_bid {
            return Err(ServiceError::BidTooLow { min_bid });
        }

        // Evaluated with the acceptance timestamp; the reset deadline
        // commits together with the bid or not at all.
        let new_end_time = model::anti_sniping_extension(auction.end_time, now);

        let new_bid = NewBid {
            bidder: cmd.bidder(),
            amount: cmd.amount,
            created_at: now,
        };
        match store
            .commit_bid(auction_id, auction.version, new_bid, new_end_time)
            .await
        {
            Ok(bid) => {
                if let Some(end_time) = new_end_time {
                    info!(
                        "{:<12} --> anti-sniping on auction {}: deadline reset to {}",
                        "Command", auction_id, end_time
                    );
                }
                return Ok(BidOutcome {
                    bid,
                    new_end_time,
                    anti_sniping_applied: new_end_time.is_some(),
                });
            }
            Err(crate::store::StoreError::VersionConflict(_)) => {
                warn!(
                    "{:<12} --> version conflict on auction {}, retrying",
                    "Command", auction_id
                );
                retries += 1;
                continue;
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(ServiceError::ConcurrencyConflict)
}

/// Status and clock checks. The clock checks guard against a stale status
/// flag independently of the stored state.
fn validate_window(auction: &Auction, now: DateTime<Utc>) -> Result<(), ServiceError> {
    if auction.status != AuctionStatus::Active {
        return Err(ServiceError::NotActive);
    }
    if now < auction.start_time {
        return Err(ServiceError::NotStarted);
    }
    if now >= auction.end_time {
        return Err(ServiceError::AlreadyEnded);
    }
    Ok(())
}

// endregion: --- Commands
