/// Auction creation (administrative collaborator / test fixtures)
pub const INSERT_AUCTION: &str = r#"
    INSERT INTO auctions (vehicle_id, starting_price, min_increment, deposit_amount, start_time, end_time, status)
    VALUES ($1, $2, $3, $4, $5, $6, $7)
    RETURNING *
"#;

/// Auction point lookup
pub const GET_AUCTION: &str = "SELECT * FROM auctions WHERE id = $1";

/// Auction listing with optional status filter, newest first
pub const LIST_AUCTIONS: &str = r#"
    SELECT * FROM auctions
    WHERE ($1 IS NULL OR status = $1)
    ORDER BY created_at DESC
    LIMIT $2 OFFSET $3
"#;

/// Auction count for the listing filter
pub const COUNT_AUCTIONS: &str =
    "SELECT COUNT(*) FROM auctions WHERE ($1 IS NULL OR status = $1)";

/// Highest committed bid; ties break towards the earliest bid
pub const GET_HIGHEST_BID: &str = r#"
    SELECT id, auction_id, user_id, bidder_name, bidder_phone, bidder_email, amount, created_at
    FROM bids
    WHERE auction_id = $1
    ORDER BY amount DESC, created_at ASC
    LIMIT 1
"#;

/// Bid count for one auction
pub const COUNT_BIDS: &str = "SELECT COUNT(*) FROM bids WHERE auction_id = $1";

/// Bid log, newest first
pub const GET_BID_HISTORY: &str = r#"
    SELECT id, auction_id, user_id, bidder_name, bidder_phone, bidder_email, amount, created_at
    FROM bids
    WHERE auction_id = $1
    ORDER BY created_at DESC, id DESC
"#;

/// Optimistic claim of the auction row: bumps the version and moves the
/// deadline in one statement, guarded by the version the bid was validated
/// against. Zero rows affected means a concurrent writer won.
pub const CLAIM_AUCTION_VERSION: &str = r#"
    UPDATE auctions
    SET version = version + 1, end_time = COALESCE($3, end_time)
    WHERE id = $1 AND version = $2
"#;

/// Append-only bid insert
pub const INSERT_BID: &str = r#"
    INSERT INTO bids (auction_id, user_id, bidder_name, bidder_phone, bidder_email, amount, created_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7)
    RETURNING id, auction_id, user_id, bidder_name, bidder_phone, bidder_email, amount, created_at
"#;

/// Guarded status transition
pub const SET_STATUS: &str = r#"
    UPDATE auctions
    SET status = $3, version = version + 1
    WHERE id = $1 AND status = $2
"#;

/// Periodic sweep: scheduled auctions whose start time passed
pub const SWEEP_ACTIVATE: &str = r#"
    UPDATE auctions
    SET status = 'active', version = version + 1
    WHERE status = 'scheduled' AND start_time <= $1
"#;

/// Periodic sweep: ended auctions that received at least one bid
pub const SWEEP_END_WITH_BIDS: &str = r#"
    UPDATE auctions
    SET status = 'ended_pending_payment', version = version + 1
    WHERE status = 'active' AND end_time <= $1
      AND EXISTS (SELECT 1 FROM bids b WHERE b.auction_id = auctions.id)
"#;

/// Periodic sweep: ended auctions without a single bid
pub const SWEEP_END_WITHOUT_BIDS: &str = r#"
    UPDATE auctions
    SET status = 'closed_failed', version = version + 1
    WHERE status = 'active' AND end_time <= $1
      AND NOT EXISTS (SELECT 1 FROM bids b WHERE b.auction_id = auctions.id)
"#;

/// Periodic sweep: deposit grace window elapsed unpaid
pub const SWEEP_GRACE_ELAPSED: &str = r#"
    UPDATE auctions
    SET status = 'closed_failed', version = version + 1
    WHERE status = 'ended_pending_payment' AND end_time + interval '24 hours' <= $1
"#;
