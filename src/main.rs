pub mod auth;
pub mod bookings;
pub mod catalog;
pub mod validation;

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};

use bookings::{
    handlers::{
        cancel_booking_by_token_handler, cancel_booking_handler, change_status_handler,
        create_booking_handler, delete_booking_handler, get_booking_by_token_handler,
        get_booking_handler, get_refund_policy_handler, list_bookings_handler,
        process_refund_by_token_handler, process_refund_handler,
        public_create_booking_handler, refund_eligibility_by_token_handler,
        refund_eligibility_handler, update_booking_by_token_handler, update_booking_handler,
        update_refund_policy_handler,
    },
    BookingService, BookingsRepository, RefundPolicyStore,
};
use catalog::PackagesRepository;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub booking_service: BookingService,
}

/// Creates and configures the application router
/// Maps all API endpoints to their handlers and adds CORS middleware
pub fn create_router(state: AppState) -> Router {
    use tower_http::cors::{Any, CorsLayer};

    // Configure CORS to allow all origins, methods, and headers
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Admin routes (JWT with admin role required)
        .route("/api/bookings", post(create_booking_handler))
        .route("/api/bookings", get(list_bookings_handler))
        .route("/api/bookings/:id", get(get_booking_handler))
        .route("/api/bookings/:id", put(update_booking_handler))
        .route("/api/bookings/:id", delete(delete_booking_handler))
        .route("/api/bookings/:id/status", patch(change_status_handler))
        .route("/api/bookings/:id/cancel", post(cancel_booking_handler))
        .route("/api/bookings/:id/refund", post(process_refund_handler))
        .route(
            "/api/bookings/:id/refund-eligibility",
            get(refund_eligibility_handler),
        )
        .route("/api/refund-policy", get(get_refund_policy_handler))
        .route("/api/refund-policy", put(update_refund_policy_handler))
        // Public token-based routes
        .route("/api/public/bookings", post(public_create_booking_handler))
        .route(
            "/api/public/bookings/:token",
            get(get_booking_by_token_handler),
        )
        .route(
            "/api/public/bookings/:token",
            put(update_booking_by_token_handler),
        )
        .route(
            "/api/public/bookings/:token/cancel",
            post(cancel_booking_by_token_handler),
        )
        .route(
            "/api/public/bookings/:token/refund",
            post(process_refund_by_token_handler),
        )
        .route(
            "/api/public/bookings/:token/refund-eligibility",
            get(refund_eligibility_by_token_handler),
        )
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    tracing::info!("Travel Bookings API - Starting...");

    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());

    let booking_service = BookingService::new(
        BookingsRepository::new(),
        PackagesRepository::seeded(),
        RefundPolicyStore::new(),
    );
    let app = create_router(AppState { booking_service });

    let addr = format!("{}:{}", host, port);
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Travel Bookings API is running on http://{}", addr);

    axum::serve(listener, app).await.expect("Server error");
}
