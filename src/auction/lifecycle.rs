/// Auction status state machine.
/// Time-driven transitions are evaluated lazily on read and at bid time;
/// the periodic sweeper covers auctions nobody polls.
// region:    --- Imports
use crate::auction::model::{Auction, AuctionStatus, DEPOSIT_GRACE_HOURS};
use crate::error::ServiceError;
use crate::store::AuctionStore;
use chrono::{DateTime, Duration, Utc};
use tracing::info;

// endregion: --- Imports

// region:    --- Transitions

/// Time-driven transition due for an auction at `now`, if any.
///
/// `scheduled -> active` once the start time passes,
/// `active -> ended_pending_payment | closed_failed` once the end time
/// passes (depending on whether any bid arrived), and
/// `ended_pending_payment -> closed_failed` once the deposit grace window
/// elapses unpaid. Administrative transitions (cancellation, deposit
/// confirmation) are not time-driven and are not reported here.
pub fn due_transition(
    auction: &Auction,
    has_bids: bool,
    now: DateTime<Utc>,
) -> Option<AuctionStatus> {
    match auction.status {
        AuctionStatus::Scheduled if now >= auction.start_time => Some(AuctionStatus::Active),
        AuctionStatus::Active if now >= auction.end_time => Some(if has_bids {
            AuctionStatus::EndedPendingPayment
        } else {
            AuctionStatus::ClosedFailed
        }),
        AuctionStatus::EndedPendingPayment
            if now >= auction.end_time + Duration::hours(DEPOSIT_GRACE_HOURS) =>
        {
            Some(AuctionStatus::ClosedFailed)
        }
        _ => None,
    }
}

/// Apply every due time-driven transition for one auction and return its
/// settled row. Idempotent: a second call on a terminal auction is a no-op.
pub async fn settle(store: &dyn AuctionStore, auction_id: i64) -> Result<Auction, ServiceError> {
    loop {
        let auction = store
            .get_auction(auction_id)
            .await?
            .ok_or(ServiceError::NotFound)?;
        let has_bids = store.bid_count(auction_id).await? > 0;
        match due_transition(&auction, has_bids, Utc::now()) {
            Some(next) => {
                // Guarded CAS; on a lost race the fresh row is re-read.
                if store.set_status(auction_id, auction.status, next).await? {
                    info!(
                        "{:<12} --> auction {} {:?} -> {:?}",
                        "Lifecycle", auction_id, auction.status, next
                    );
                }
            }
            None => return Ok(auction),
        }
    }
}

/// Deposit confirmation from the external payment collaborator.
/// Wins the auction iff it is pending payment and still inside the grace
/// window; a lapsed grace window is settled to `closed_failed` first.
pub async fn confirm_deposit(
    store: &dyn AuctionStore,
    auction_id: i64,
) -> Result<Auction, ServiceError> {
    loop {
        let auction = settle(store, auction_id).await?;
        if auction.status != AuctionStatus::EndedPendingPayment {
            return Err(ServiceError::DepositNotPending);
        }
        if store
            .set_status(
                auction_id,
                AuctionStatus::EndedPendingPayment,
                AuctionStatus::ClosedWon,
            )
            .await?
        {
            info!(
                "{:<12} --> auction {} deposit paid, closed_won",
                "Lifecycle", auction_id
            );
            return store
                .get_auction(auction_id)
                .await?
                .ok_or(ServiceError::NotFound);
        }
        // Raced with the sweeper; re-evaluate from the fresh row.
    }
}

// endregion: --- Transitions

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auction::model::DEFAULT_DEPOSIT_AMOUNT;

    fn auction(status: AuctionStatus, start: DateTime<Utc>, end: DateTime<Utc>) -> Auction {
        Auction {
            id: 1,
            vehicle_id: 1,
            starting_price: 10_000_000,
            min_increment: 100_000,
            deposit_amount: DEFAULT_DEPOSIT_AMOUNT,
            start_time: start,
            end_time: end,
            status,
            version: 0,
            created_at: start,
        }
    }

    #[test]
    fn scheduled_activates_at_start_time() {
        let now = Utc::now();
        let a = auction(AuctionStatus::Scheduled, now, now + Duration::hours(1));
        assert_eq!(due_transition(&a, false, now), Some(AuctionStatus::Active));
        assert_eq!(
            due_transition(&a, false, now - Duration::seconds(1)),
            None
        );
    }

    #[test]
    fn active_past_end_splits_on_bids() {
        let now = Utc::now();
        let a = auction(
            AuctionStatus::Active,
            now - Duration::hours(2),
            now - Duration::minutes(1),
        );
        assert_eq!(
            due_transition(&a, true, now),
            Some(AuctionStatus::EndedPendingPayment)
        );
        assert_eq!(
            due_transition(&a, false, now),
            Some(AuctionStatus::ClosedFailed)
        );
    }

    #[test]
    fn pending_payment_fails_after_grace_window() {
        let now = Utc::now();
        let a = auction(
            AuctionStatus::EndedPendingPayment,
            now - Duration::hours(30),
            now - Duration::hours(25),
        );
        assert_eq!(
            due_transition(&a, true, now),
            Some(AuctionStatus::ClosedFailed)
        );
        let inside = auction(
            AuctionStatus::EndedPendingPayment,
            now - Duration::hours(3),
            now - Duration::hours(1),
        );
        assert_eq!(due_transition(&inside, true, now), None);
    }

    #[test]
    fn terminal_states_have_no_due_transition() {
        let now = Utc::now();
        for status in [
            AuctionStatus::ClosedWon,
            AuctionStatus::ClosedFailed,
            AuctionStatus::Cancelled,
        ] {
            let a = auction(status, now - Duration::hours(2), now - Duration::hours(1));
            assert_eq!(due_transition(&a, true, now), None);
        }
    }
}
