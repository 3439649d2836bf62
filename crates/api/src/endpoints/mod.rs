//! API endpoints.

mod activities;
mod auth;
mod groups;
mod polls;
mod trips;
mod votes;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .nest("/groups", groups::router())
        .nest("/trips", trips::router())
        .nest("/activities", activities::router())
        .nest("/polls", polls::router())
        .nest("/votes", votes::router())
}
