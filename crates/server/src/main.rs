//! LendLocal server entry point.

use std::sync::Arc;

use axum::{Router, middleware, routing::get};
use lendlocal_api::{
    StreamingState, middleware::AppState, router as api_router, streaming_handler,
};
use lendlocal_common::Config;
use lendlocal_core::{
    BorrowService, ChatService, CommunityService, EmailService, EventPublisherService,
    FollowService, ItemRequestService, ItemService, NotificationService, PresenceRegistry,
    ReportService, ReviewService, UserService,
};
use lendlocal_db::repositories::{
    BorrowRequestRepository, ChatRepository, CommunityRepository, FollowRepository,
    ItemRepository, ItemRequestRepository, NotificationRepository, ReportRepository,
    ReviewRepository, UserRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

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
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lendlocal=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting lendlocal server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database
    let db = lendlocal_db::init(&config).await?;
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    lendlocal_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
    let db = Arc::new(db);
    let user_repo = UserRepository::new(Arc::clone(&db));
    let item_repo = ItemRepository::new(Arc::clone(&db));
    let borrow_repo = BorrowRequestRepository::new(Arc::clone(&db));
    let item_request_repo = ItemRequestRepository::new(Arc::clone(&db));
    let review_repo = ReviewRepository::new(Arc::clone(&db));
    let notification_repo = NotificationRepository::new(Arc::clone(&db));
    let chat_repo = ChatRepository::new(Arc::clone(&db));
    let community_repo = CommunityRepository::new(Arc::clone(&db));
    let follow_repo = FollowRepository::new(Arc::clone(&db));
    let report_repo = ReportRepository::new(Arc::clone(&db));

    // Streaming state doubles as the event publisher the services fan out to.
    let streaming = StreamingState::new();
    let event_publisher: EventPublisherService = Arc::new(streaming.clone());
    let presence = PresenceRegistry::new();

    // Initialize services
    let mut notification_service = NotificationService::new(
        notification_repo.clone(),
        user_repo.clone(),
        config.server.link_base().to_string(),
    );
    notification_service.set_event_publisher(event_publisher.clone());
    if let Some(email_config) = config.email.clone() {
        let email_service = EmailService::new(email_config)?;
        notification_service.set_email_service(email_service);
        info!("Outbound notification emails enabled");
    } else {
        info!("No SMTP configuration; notification emails disabled");
    }

    let user_service = UserService::new(user_repo.clone());
    let item_service = ItemService::new(item_repo.clone(), community_repo.clone());
    let review_service = ReviewService::new(
        review_repo.clone(),
        borrow_repo.clone(),
        user_repo.clone(),
    );
    let borrow_service = BorrowService::new(
        borrow_repo.clone(),
        item_repo.clone(),
        user_repo.clone(),
        review_service.clone(),
        notification_service.clone(),
    );
    let item_request_service = ItemRequestService::new(
        item_request_repo,
        item_repo.clone(),
        borrow_repo.clone(),
        community_repo.clone(),
        user_repo.clone(),
        notification_service.clone(),
    );
    let community_service = CommunityService::new(
        community_repo.clone(),
        user_repo.clone(),
        notification_service.clone(),
    );
    let follow_service = FollowService::new(
        follow_repo,
        user_repo.clone(),
        notification_service.clone(),
    );
    let report_service = ReportService::new(report_repo, user_repo.clone(), item_repo.clone());
    let mut chat_service = ChatService::new(
        chat_repo,
        user_repo.clone(),
        notification_repo.clone(),
        notification_service.clone(),
        presence.clone(),
    );
    chat_service.set_event_publisher(event_publisher);

    // Create app state
    let state = AppState {
        user_service,
        item_service,
        community_service,
        borrow_service,
        item_request_service,
        review_service,
        notification_service,
        chat_service,
        follow_service,
        report_service,
        presence,
        streaming,
    };

    // Build router
    let app = Router::new()
        .route("/streaming", get(streaming_handler))
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            lendlocal_api::middleware::auth_middleware,
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
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
