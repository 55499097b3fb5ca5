// region:    --- Imports
use crate::auction::lifecycle;
use crate::auction::model::{Auction, AuctionStatus, Bid};
use crate::error::ServiceError;
use crate::store::AuctionStore;
use serde::Serialize;
use tracing::info;

// endregion: --- Imports

// region:    --- Query Handlers

/// Auction with its derived read-side values.
#[derive(Debug, Serialize)]
pub struct AuctionView {
    #[serde(flatten)]
    pub auction: Auction,
    pub bid_count: i64,
    pub current_highest_bid: i64,
}

/// Fetch one auction, applying any due lazy transition first, with the
/// derived bid count and current highest bid (the starting price when no
/// bid exists).
pub async fn get_auction_view(
    store: &dyn AuctionStore,
    auction_id: i64,
) -> Result<AuctionView, ServiceError> {
    info!("{:<12} --> auction view id: {}", "Query", auction_id);
    let auction = lifecycle::settle(store, auction_id).await?;
    let bid_count = store.bid_count(auction_id).await?;
    let current_highest_bid = store
        .get_highest_bid(auction_id)
        .await?
        .map_or(auction.starting_price, |bid| bid.amount);
    Ok(AuctionView {
        auction,
        bid_count,
        current_highest_bid,
    })
}

/// Bid log for one auction, newest first.
pub async fn get_bid_history(
    store: &dyn AuctionStore,
    auction_id: i64,
) -> Result<Vec<Bid>, ServiceError> {
    info!("{:<12} --> bid history id: {}", "Query", auction_id);
    store
        .get_auction(auction_id)
        .await?
        .ok_or(ServiceError::NotFound)?;
    Ok(store.bid_history(auction_id).await?)
}

#[derive(Debug, Serialize)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

#[derive(Debug, Serialize)]
pub struct AuctionPage {
    pub data: Vec<AuctionView>,
    pub pagination: Pagination,
}

/// Paginated auction listing with an optional status filter. Each listed
/// row is settled first, so a just-expired auction never shows up as
/// `active` between sweeper ticks; a row a due transition moves out of the
/// requested status is dropped from the page.
pub async fn list_auctions(
    store: &dyn AuctionStore,
    status: Option<AuctionStatus>,
    page: i64,
    limit: i64,
) -> Result<AuctionPage, ServiceError> {
    info!(
        "{:<12} --> auction list page {} limit {}",
        "Query", page, limit
    );
    let page = page.max(1);
    let limit = limit.clamp(1, 100);
    let auctions = store
        .list_auctions(status, limit, (page - 1) * limit)
        .await?;
    let total = store.count_auctions(status).await?;

    let mut views = Vec::with_capacity(auctions.len());
    for auction in auctions {
        let auction = lifecycle::settle(store, auction.id).await?;
        if status.map_or(false, |s| auction.status != s) {
            continue;
        }
        let bid_count = store.bid_count(auction.id).await?;
        let current_highest_bid = store
            .get_highest_bid(auction.id)
            .await?
            .map_or(auction.starting_price, |bid| bid.amount);
        views.push(AuctionView {
            auction,
            bid_count,
            current_highest_bid,
        });
    }
    Ok(AuctionPage {
        data: views,
        pagination: Pagination {
            page,
            limit,
            total,
            total_pages: (total + limit - 1) / limit,
        },
    })
}

// endregion: --- Query Handlers
