// Router construction shared by the server binary and tests
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    get_lathe_details, get_lathe_product_analysis, get_lathe_sensor_data, health_check, list_lathes,
    welcome,
};
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(welcome))
        .route("/healthz", get(health_check))
        .route("/lathes", get(list_lathes))
        .route("/lathes/:id", get(get_lathe_details))
        .route("/lathes/:id/sensor-data", get(get_lathe_sensor_data))
        .route("/lathes/:id/product-analysis", get(get_lathe_product_analysis))
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
