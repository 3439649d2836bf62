//! Activity endpoints.

use axum::{Json, Router, extract::State, routing::post};
use chrono::NaiveDate;
use serde::Deserialize;
use tripcrew_common::AppResult;
use tripcrew_core::{CreateActivityInput, UpdateActivityInput};
use tripcrew_db::entities::activity;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Create an activity.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateActivityInput>,
) -> AppResult<ApiResponse<activity::Model>> {
    let activity = state.activity_service.create(&user.id, input).await?;
    Ok(ApiResponse::ok(activity))
}

/// Update activity request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateActivityRequest {
    pub activity_id: String,
    #[serde(flatten)]
    pub input: UpdateActivityInput,
}

/// Update an activity's schedule fields.
async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UpdateActivityRequest>,
) -> AppResult<ApiResponse<activity::Model>> {
    let activity = state
        .activity_service
        .update(&user.id, &req.activity_id, req.input)
        .await?;
    Ok(ApiResponse::ok(activity))
}

/// Show activity request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowActivityRequest {
    pub activity_id: String,
}

/// Get an activity.
async fn show(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ShowActivityRequest>,
) -> AppResult<ApiResponse<activity::Model>> {
    let activity = state
        .activity_service
        .get(&user.id, &req.activity_id)
        .await?;
    Ok(ApiResponse::ok(activity))
}

/// List activities request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListActivitiesRequest {
    pub trip_id: String,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

const fn default_limit() -> u64 {
    100
}

/// List a trip's activities.
async fn list(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ListActivitiesRequest>,
) -> AppResult<ApiResponse<Vec<activity::Model>>> {
    let activities = state
        .activity_service
        .list(&user.id, &req.trip_id, req.limit, req.offset)
        .await?;
    Ok(ApiResponse::ok(activities))
}

/// Free day indexes request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreeDayIndexesRequest {
    pub trip_id: String,
    pub date: NaiveDate,
}

/// The day indexes still free on a trip day.
async fn free_day_indexes(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<FreeDayIndexesRequest>,
) -> AppResult<ApiResponse<Vec<i32>>> {
    let free = state
        .activity_service
        .free_day_indexes(&user.id, &req.trip_id, req.date)
        .await?;
    Ok(ApiResponse::ok(free))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create))
        .route("/update", post(update))
        .route("/show", post(show))
        .route("/list", post(list))
        .route("/free-day-indexes", post(free_day_indexes))
}
