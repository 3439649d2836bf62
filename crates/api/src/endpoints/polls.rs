//! Poll endpoints.

use axum::{Json, Router, extract::State, routing::post};
use serde::Deserialize;
use tripcrew_common::AppResult;
use tripcrew_core::{
    CreatePollInput, FinalizeOutcome, FinalizePollInput, PollDetail, PollOptionInput,
    UpdatePollInput,
};
use tripcrew_db::{
    entities::{poll, poll_option},
    repositories::PollScope,
};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Create a poll with its initial options.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreatePollInput>,
) -> AppResult<ApiResponse<poll::Model>> {
    let poll = state.poll_service.create(&user.id, input).await?;
    Ok(ApiResponse::ok(poll))
}

/// Update poll request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePollRequest {
    pub poll_id: String,
    #[serde(flatten)]
    pub input: UpdatePollInput,
}

/// Rename a poll.
async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UpdatePollRequest>,
) -> AppResult<ApiResponse<poll::Model>> {
    let poll = state
        .poll_service
        .update(&user.id, &req.poll_id, req.input)
        .await?;
    Ok(ApiResponse::ok(poll))
}

/// Poll id request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollIdRequest {
    pub poll_id: String,
}

/// Close a poll to further voting.
async fn close(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<PollIdRequest>,
) -> AppResult<ApiResponse<poll::Model>> {
    let poll = state.poll_service.close(&user.id, &req.poll_id).await?;
    Ok(ApiResponse::ok(poll))
}

/// Delete a poll.
async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<PollIdRequest>,
) -> AppResult<ApiResponse<()>> {
    state.poll_service.delete(&user.id, &req.poll_id).await?;
    Ok(ApiResponse::ok(()))
}

/// Get a poll with its options and tallies.
async fn show(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<PollIdRequest>,
) -> AppResult<ApiResponse<PollDetail>> {
    let detail = state.poll_service.get_detail(&user.id, &req.poll_id).await?;
    Ok(ApiResponse::ok(detail))
}

/// List polls request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPollsRequest {
    pub trip_id: String,
    /// Scope the listing to one activity's polls.
    pub activity_id: Option<String>,
    /// Only trip-level polls when set.
    #[serde(default)]
    pub trip_level_only: bool,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

const fn default_limit() -> u64 {
    50
}

/// List a trip's polls.
async fn list(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ListPollsRequest>,
) -> AppResult<ApiResponse<Vec<poll::Model>>> {
    let scope = match (req.activity_id, req.trip_level_only) {
        (Some(activity_id), _) => PollScope::Activity(activity_id),
        (None, true) => PollScope::TripLevel,
        (None, false) => PollScope::All,
    };

    let polls = state
        .poll_service
        .list(&user.id, &req.trip_id, &scope, req.limit, req.offset)
        .await?;
    Ok(ApiResponse::ok(polls))
}

/// Add option request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddOptionRequest {
    pub poll_id: String,
    #[serde(flatten)]
    pub option: PollOptionInput,
}

/// Add an option to an open poll.
async fn add_option(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<AddOptionRequest>,
) -> AppResult<ApiResponse<poll_option::Model>> {
    let option = state
        .poll_service
        .add_option(&user.id, &req.poll_id, req.option)
        .await?;
    Ok(ApiResponse::ok(option))
}

/// Remove option request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveOptionRequest {
    pub poll_id: String,
    pub poll_option_id: String,
}

/// Remove an option from an open poll.
async fn remove_option(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<RemoveOptionRequest>,
) -> AppResult<ApiResponse<()>> {
    state
        .poll_service
        .remove_option(&user.id, &req.poll_id, &req.poll_option_id)
        .await?;
    Ok(ApiResponse::ok(()))
}

/// Finalize poll request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizePollRequest {
    pub poll_id: String,
    pub poll_option_id: String,
}

/// Commit one option of a date poll as its outcome. Leader only.
async fn finalize(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<FinalizePollRequest>,
) -> AppResult<ApiResponse<FinalizeOutcome>> {
    let outcome = state
        .finalization_service
        .finalize(
            &user.id,
            &req.poll_id,
            FinalizePollInput {
                poll_option_id: req.poll_option_id,
            },
        )
        .await?;
    Ok(ApiResponse::ok(outcome))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create))
        .route("/update", post(update))
        .route("/close", post(close))
        .route("/delete", post(delete))
        .route("/show", post(show))
        .route("/list", post(list))
        .route("/options/add", post(add_option))
        .route("/options/remove", post(remove_option))
        .route("/finalize", post(finalize))
}
