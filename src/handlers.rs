// region:    --- Imports
use crate::auction::lifecycle;
use crate::auction::model::AuctionStatus;
use crate::bidding::commands::{self, PlaceBidCommand};
use crate::error::ServiceError;
use crate::query;
use crate::store::DynAuctionStore;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

// endregion: --- Imports

// region:    --- Router

/// Routes shared by the binary and the HTTP test suite.
pub fn routes(store: DynAuctionStore) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/auctions", get(handle_list_auctions))
        .route("/auctions/:id", get(handle_get_auction))
        .route("/auctions/:id/bid", post(handle_place_bid))
        .route("/auctions/:id/bids", get(handle_get_bid_history))
        .route("/auctions/:id/deposit-paid", post(handle_deposit_paid))
        .layer(cors)
        .with_state(store)
}

// endregion: --- Router

// region:    --- Command Handlers

/// Bid placement.
pub async fn handle_place_bid(
    State(store): State<DynAuctionStore>,
    Path(auction_id): Path<i64>,
    Json(cmd): Json<PlaceBidCommand>,
) -> Result<impl IntoResponse, ServiceError> {
    info!("{:<12} --> bid request on auction {}", "Handler", auction_id);
    let outcome = commands::place_bid(store.as_ref(), auction_id, cmd).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

/// Deposit confirmation signal from the payment collaborator.
pub async fn handle_deposit_paid(
    State(store): State<DynAuctionStore>,
    Path(auction_id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    info!(
        "{:<12} --> deposit paid for auction {}",
        "Handler", auction_id
    );
    let auction = lifecycle::confirm_deposit(store.as_ref(), auction_id).await?;
    Ok(Json(auction))
}

// endregion: --- Command Handlers

// region:    --- Query Handlers

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub status: Option<AuctionStatus>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Auction listing.
pub async fn handle_list_auctions(
    State(store): State<DynAuctionStore>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let page = query::handlers::list_auctions(
        store.as_ref(),
        params.status,
        params.page.unwrap_or(1),
        params.limit.unwrap_or(12),
    )
    .await?;
    Ok(Json(page))
}

/// Single auction with derived bid count and current highest bid.
pub async fn handle_get_auction(
    State(store): State<DynAuctionStore>,
    Path(auction_id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let view = query::handlers::get_auction_view(store.as_ref(), auction_id).await?;
    Ok(Json(view))
}

/// Bid history, newest first.
pub async fn handle_get_bid_history(
    State(store): State<DynAuctionStore>,
    Path(auction_id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let bids = query::handlers::get_bid_history(store.as_ref(), auction_id).await?;
    Ok(Json(bids))
}

// endregion: --- Query Handlers
