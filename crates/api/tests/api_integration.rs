//! API integration tests.
//!
//! These tests verify router wiring and the auth boundary against a mock
//! database.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};
use tower::ServiceExt;
use tripcrew_api::{middleware::AppState, router as api_router};
use tripcrew_core::{
    ActivityService, DbMembershipGate, FinalizationService, GroupService, MembershipGate,
    PollService, TripService, UserService, VoteService,
};
use tripcrew_db::repositories::{
    ActivityRepository, GroupRepository, PollRepository, TripRepository, UserRepository,
    VoteRepository,
};

fn create_mock_db() -> DatabaseConnection {
    MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .into_connection()
}

fn create_test_state() -> AppState {
    let db = Arc::new(create_mock_db());

    let user_repo = UserRepository::new(Arc::clone(&db));
    let group_repo = GroupRepository::new(Arc::clone(&db));
    let trip_repo = TripRepository::new(Arc::clone(&db));
    let activity_repo = ActivityRepository::new(Arc::clone(&db));
    let poll_repo = PollRepository::new(Arc::clone(&db));
    let vote_repo = VoteRepository::new(Arc::clone(&db));

    let gate: Arc<dyn MembershipGate> = Arc::new(DbMembershipGate::new(group_repo.clone()));

    AppState {
        user_service: UserService::new(user_repo),
        group_service: GroupService::new(group_repo),
        trip_service: TripService::new(trip_repo.clone(), Arc::clone(&gate)),
        activity_service: ActivityService::new(
            activity_repo.clone(),
            trip_repo.clone(),
            Arc::clone(&gate),
        ),
        poll_service: PollService::new(
            poll_repo.clone(),
            vote_repo.clone(),
            trip_repo.clone(),
            activity_repo.clone(),
            Arc::clone(&gate),
        ),
        vote_service: VoteService::new(
            vote_repo,
            poll_repo.clone(),
            trip_repo.clone(),
            Arc::clone(&gate),
        ),
        finalization_service: FinalizationService::new(poll_repo, trip_repo, activity_repo, gate),
    }
}

fn create_test_router() -> Router {
    let state = create_test_state();
    api_router().with_state(state)
}

#[tokio::test]
async fn test_trip_create_requires_auth() {
    let app = create_test_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/trips/create")
                .method("POST")
                .header("Content-Type", "application/json")
                .body(Body::from(
                    r#"{"groupId":"g1","title":"Trip","planningRangeStart":"2025-06-01","planningRangeEnd":"2025-08-31"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    // No auth middleware ran, so no user lands in request extensions
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_vote_cast_requires_auth() {
    let app = create_test_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/votes/cast")
                .method("POST")
                .header("Content-Type", "application/json")
                .body(Body::from(r#"{"pollOptionId":"o1"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_with_invalid_json_returns_error() {
    let app = create_test_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/auth/register")
                .method("POST")
                .header("Content-Type", "application/json")
                .body(Body::from("not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    assert!(
        status == StatusCode::BAD_REQUEST || status == StatusCode::UNPROCESSABLE_ENTITY,
        "unexpected status: {status}"
    );
}

#[tokio::test]
async fn test_unknown_endpoint_returns_404() {
    let app = create_test_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/nonexistent")
                .method("POST")
                .header("Content-Type", "application/json")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
