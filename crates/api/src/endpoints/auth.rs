//! Authentication endpoints.

use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};
use tripcrew_common::AppResult;
use validator::Validate;

use crate::{middleware::AppState, response::ApiResponse};

/// Register request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100))]
    pub username: String,
}

/// Register response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub id: String,
    pub username: String,
    pub token: String,
}

/// Create a new user account with a fresh API token.
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<ApiResponse<RegisterResponse>> {
    req.validate()?;

    let user = state.user_service.register(&req.username).await?;

    Ok(ApiResponse::ok(RegisterResponse {
        id: user.id.clone(),
        username: user.username,
        token: user.token.unwrap_or_default(),
    }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/auth/register", post(register))
}
