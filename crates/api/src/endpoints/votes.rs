//! Vote endpoints.

use axum::{Json, Router, extract::State, routing::post};
use serde::Deserialize;
use tripcrew_common::AppResult;
use tripcrew_core::{CastVoteInput, ChangeVoteInput};
use tripcrew_db::entities::vote;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Cast a vote for an option of an open poll.
async fn cast(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CastVoteInput>,
) -> AppResult<ApiResponse<vote::Model>> {
    let vote = state.vote_service.cast(&user.id, input).await?;
    Ok(ApiResponse::ok(vote))
}

/// Move an ordinary-poll vote to a different option.
async fn change(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<ChangeVoteInput>,
) -> AppResult<ApiResponse<vote::Model>> {
    let vote = state.vote_service.change(&user.id, input).await?;
    Ok(ApiResponse::ok(vote))
}

/// Remove vote request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveVoteRequest {
    pub vote_id: String,
}

/// Remove one of the caller's votes.
async fn remove(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<RemoveVoteRequest>,
) -> AppResult<ApiResponse<()>> {
    state.vote_service.remove(&user.id, &req.vote_id).await?;
    Ok(ApiResponse::ok(()))
}

/// Poll votes request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollVotesRequest {
    pub poll_id: String,
}

/// All votes cast in a poll.
async fn list(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<PollVotesRequest>,
) -> AppResult<ApiResponse<Vec<vote::Model>>> {
    let votes = state.vote_service.poll_votes(&user.id, &req.poll_id).await?;
    Ok(ApiResponse::ok(votes))
}

/// The caller's votes within a poll.
async fn mine(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<PollVotesRequest>,
) -> AppResult<ApiResponse<Vec<vote::Model>>> {
    let votes = state.vote_service.user_votes(&user.id, &req.poll_id).await?;
    Ok(ApiResponse::ok(votes))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/cast", post(cast))
        .route("/change", post(change))
        .route("/remove", post(remove))
        .route("/list", post(list))
        .route("/mine", post(mine))
}
