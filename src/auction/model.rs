use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};

/// Default bid increment when the administrative collaborator does not set one.
pub const DEFAULT_MIN_INCREMENT: i64 = 100_000;
/// Default deposit required from the winning bidder.
pub const DEFAULT_DEPOSIT_AMOUNT: i64 = 50_000;
/// A bid landing inside this window before `end_time` resets the deadline.
pub const ANTI_SNIPING_WINDOW_SECS: i64 = 5 * 60;
/// Grace period after `end_time` for the winner to pay the deposit.
pub const DEPOSIT_GRACE_HOURS: i64 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "auction_status", rename_all = "snake_case")]
pub enum AuctionStatus {
    Scheduled,
    Active,
    EndedPendingPayment,
    ClosedWon,
    ClosedFailed,
    Cancelled,
}

impl AuctionStatus {
    /// Terminal states accept no further bids or transitions.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            AuctionStatus::ClosedWon | AuctionStatus::ClosedFailed | AuctionStatus::Cancelled
        )
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Auction {
    pub id: i64,
    pub vehicle_id: i64,
    pub starting_price: i64,
    pub min_increment: i64,
    pub deposit_amount: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: AuctionStatus,
    pub version: i64,
    pub created_at: DateTime<Utc>,
}

/// Bidder identity: a resolved account or a walk-in guest with contact details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Bidder {
    Registered {
        user_id: i64,
    },
    Guest {
        name: String,
        phone: String,
        email: Option<String>,
    },
}

// Append-only: a bid is never updated or deleted once persisted.
#[derive(Debug, Clone, Serialize)]
pub struct Bid {
    pub id: i64,
    pub auction_id: i64,
    pub bidder: Bidder,
    pub amount: i64,
    pub created_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for Bid {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let user_id: Option<i64> = row.try_get("user_id")?;
        let bidder = match user_id {
            Some(user_id) => Bidder::Registered { user_id },
            None => Bidder::Guest {
                name: row.try_get("bidder_name")?,
                phone: row.try_get("bidder_phone")?,
                email: row.try_get("bidder_email")?,
            },
        };
        Ok(Bid {
            id: row.try_get("id")?,
            auction_id: row.try_get("auction_id")?,
            bidder,
            amount: row.try_get("amount")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

/// Smallest amount a new bid must reach: the current highest plus the
/// increment, or the starting price when no bid exists yet.
pub fn minimum_acceptable_bid(auction: &Auction, highest: Option<&Bid>) -> i64 {
    match highest {
        Some(bid) => bid.amount + auction.min_increment,
        None => auction.starting_price,
    }
}

/// Anti-sniping: a bid accepted with positive remaining time shorter than the
/// window resets the deadline to `now + window`. The reset is absolute, so
/// repeated late bids keep pushing the deadline forward.
pub fn anti_sniping_extension(end_time: DateTime<Utc>, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let window = Duration::seconds(ANTI_SNIPING_WINDOW_SECS);
    let remaining = end_time - now;
    if remaining > Duration::zero() && remaining < window {
        Some(now + window)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auction(starting_price: i64, min_increment: i64) -> Auction {
        let now = Utc::now();
        Auction {
            id: 1,
            vehicle_id: 1,
            starting_price,
            min_increment,
            deposit_amount: DEFAULT_DEPOSIT_AMOUNT,
            start_time: now,
            end_time: now + Duration::hours(2),
            status: AuctionStatus::Active,
            version: 0,
            created_at: now,
        }
    }

    fn bid(amount: i64) -> Bid {
        Bid {
            id: 1,
            auction_id: 1,
            bidder: Bidder::Registered { user_id: 7 },
            amount,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn minimum_is_starting_price_without_bids() {
        let auction = auction(10_000_000, 100_000);
        assert_eq!(minimum_acceptable_bid(&auction, None), 10_000_000);
    }

    #[test]
    fn minimum_is_highest_plus_increment() {
        let auction = auction(10_000_000, 100_000);
        let highest = bid(10_000_000);
        assert_eq!(minimum_acceptable_bid(&auction, Some(&highest)), 10_100_000);
    }

    #[test]
    fn extension_inside_window_resets_to_now_plus_window() {
        let now = Utc::now();
        let end = now + Duration::minutes(2);
        assert_eq!(
            anti_sniping_extension(end, now),
            Some(now + Duration::minutes(5))
        );
    }

    #[test]
    fn no_extension_outside_window() {
        let now = Utc::now();
        let end = now + Duration::minutes(10);
        assert_eq!(anti_sniping_extension(end, now), None);
    }

    #[test]
    fn no_extension_at_exact_window_boundary() {
        let now = Utc::now();
        let end = now + Duration::seconds(ANTI_SNIPING_WINDOW_SECS);
        assert_eq!(anti_sniping_extension(end, now), None);
    }

    #[test]
    fn no_extension_for_elapsed_deadline() {
        let now = Utc::now();
        assert_eq!(anti_sniping_extension(now, now), None);
        assert_eq!(anti_sniping_extension(now - Duration::seconds(1), now), None);
    }
}
