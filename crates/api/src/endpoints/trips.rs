//! Trip endpoints.

use axum::{Json, Router, extract::State, routing::post};
use serde::Deserialize;
use tripcrew_common::AppResult;
use tripcrew_core::CreateTripInput;
use tripcrew_db::entities::trip;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Create a trip.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateTripInput>,
) -> AppResult<ApiResponse<trip::Model>> {
    let trip = state.trip_service.create(&user.id, input).await?;
    Ok(ApiResponse::ok(trip))
}

/// Show trip request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowTripRequest {
    pub trip_id: String,
}

/// Get a trip.
async fn show(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ShowTripRequest>,
) -> AppResult<ApiResponse<trip::Model>> {
    let trip = state.trip_service.get(&user.id, &req.trip_id).await?;
    Ok(ApiResponse::ok(trip))
}

/// List trips request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTripsRequest {
    pub group_id: String,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

const fn default_limit() -> u64 {
    50
}

/// List a group's trips.
async fn list(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ListTripsRequest>,
) -> AppResult<ApiResponse<Vec<trip::Model>>> {
    let trips = state
        .trip_service
        .list(&user.id, &req.group_id, req.limit, req.offset)
        .await?;
    Ok(ApiResponse::ok(trips))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create))
        .route("/show", post(show))
        .route("/list", post(list))
}
