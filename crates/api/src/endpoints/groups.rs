//! Group endpoints.

use axum::{Json, Router, extract::State, routing::post};
use serde::Deserialize;
use tripcrew_common::AppResult;
use tripcrew_core::{AddMemberInput, CreateGroupInput};
use tripcrew_db::entities::{group, group_member};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Create a group. The caller becomes its first leader.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateGroupInput>,
) -> AppResult<ApiResponse<group::Model>> {
    let group = state.group_service.create(&user.id, input).await?;
    Ok(ApiResponse::ok(group))
}

/// Add a member to a group.
async fn add_member(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<AddMemberInput>,
) -> AppResult<ApiResponse<group_member::Model>> {
    let member = state.group_service.add_member(&user.id, input).await?;
    Ok(ApiResponse::ok(member))
}

/// List members request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMembersRequest {
    pub group_id: String,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

const fn default_limit() -> u64 {
    50
}

/// List the members of a group.
async fn list_members(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ListMembersRequest>,
) -> AppResult<ApiResponse<Vec<group_member::Model>>> {
    let members = state
        .group_service
        .list_members(&user.id, &req.group_id, req.limit, req.offset)
        .await?;
    Ok(ApiResponse::ok(members))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create))
        .route("/members/add", post(add_member))
        .route("/members", post(list_members))
}
