//! Tripcrew server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, middleware};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tripcrew_api::{middleware::AppState, router as api_router};
use tripcrew_common::Config;
use tripcrew_core::{
    ActivityService, DbMembershipGate, FinalizationService, GroupService, MembershipGate,
    PollService, TripService, UserService, VoteService,
};
use tripcrew_db::repositories::{
    ActivityRepository, GroupRepository, PollRepository, TripRepository, UserRepository,
    VoteRepository,
};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tripcrew=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting tripcrew server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database
    let db = tripcrew_db::init(&config).await?;
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    tripcrew_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
    let db = Arc::new(db);
    let user_repo = UserRepository::new(Arc::clone(&db));
    let group_repo = GroupRepository::new(Arc::clone(&db));
    let trip_repo = TripRepository::new(Arc::clone(&db));
    let activity_repo = ActivityRepository::new(Arc::clone(&db));
    let poll_repo = PollRepository::new(Arc::clone(&db));
    let vote_repo = VoteRepository::new(Arc::clone(&db));

    // Initialize services
    let gate: Arc<dyn MembershipGate> = Arc::new(DbMembershipGate::new(group_repo.clone()));

    let user_service = UserService::new(user_repo);
    let group_service = GroupService::new(group_repo);
    let trip_service = TripService::new(trip_repo.clone(), Arc::clone(&gate));
    let activity_service = ActivityService::new(
        activity_repo.clone(),
        trip_repo.clone(),
        Arc::clone(&gate),
    );
    let poll_service = PollService::new(
        poll_repo.clone(),
        vote_repo.clone(),
        trip_repo.clone(),
        activity_repo.clone(),
        Arc::clone(&gate),
    );
    let vote_service = VoteService::new(
        vote_repo,
        poll_repo.clone(),
        trip_repo.clone(),
        Arc::clone(&gate),
    );
    let finalization_service =
        FinalizationService::new(poll_repo, trip_repo, activity_repo, gate);

    let state = AppState {
        user_service,
        group_service,
        trip_service,
        activity_service,
        poll_service,
        vote_service,
        finalization_service,
    };

    // Build router
    let app = Router::new()
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            tripcrew_api::middleware::auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
