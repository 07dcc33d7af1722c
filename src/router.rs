use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::AppState;

/// Build the application router with all routes
pub fn build(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(handlers::healthcheck))
        .route("/api/device-types", get(handlers::devices::list_device_types))
        // Rack routes
        .route("/api/racks", get(handlers::racks::list_racks))
        .route("/api/racks", post(handlers::racks::create_rack))
        .route("/api/racks/:id", get(handlers::racks::get_rack))
        .route("/api/racks/:id", put(handlers::racks::update_rack))
        .route("/api/racks/:id", delete(handlers::racks::delete_rack))
        .route("/api/racks/:id/layout", get(handlers::racks::rack_layout))
        .route("/api/racks/:id/utilization", get(handlers::racks::rack_utilization))
        // Device routes
        .route("/api/racks/:id/devices", get(handlers::devices::list_devices))
        .route("/api/racks/:id/devices", post(handlers::devices::create_device))
        .route("/api/racks/:id/devices/validate", post(handlers::devices::validate_device))
        .route("/api/racks/:id/devices/:device_id", get(handlers::devices::get_device))
        .route("/api/racks/:id/devices/:device_id", put(handlers::devices::update_device))
        .route("/api/racks/:id/devices/:device_id", delete(handlers::devices::delete_device))
        // Power topology routes
        .route("/api/power/topology", get(handlers::power::get_topology))
        .route("/api/power/sources", get(handlers::power::list_source_reports))
        .route("/api/power/sources/:id", get(handlers::power::get_source_report))
        .route("/api/power/consumers/:id", get(handlers::power::get_consumer_feeds))
        // Add state and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}
