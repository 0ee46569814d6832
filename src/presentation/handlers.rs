// HTTP request handlers
use crate::presentation::app_state::AppState;
use crate::presentation::error::ApiResult;
use crate::presentation::responses::{
    LatheDetailsResponse, LatheSummaryResponse, ProductAnalysisResponse, SensorDataResponse,
};
use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

pub async fn welcome() -> Json<Value> {
    Json(json!({ "message": "Welcome to Lathe Predictive Maintenance API" }))
}

/// Summaries of every lathe with data
pub async fn list_lathes(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<LatheSummaryResponse>>> {
    let summaries = state.machine_service.list_summaries().await?;
    Ok(Json(summaries.into_iter().map(Into::into).collect()))
}

pub async fn get_lathe_details(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<LatheDetailsResponse>> {
    let detail = state.machine_service.detail(id).await?;
    Ok(Json(detail.into()))
}

/// Raw channel readings of the detail window with min/max/avg per channel
pub async fn get_lathe_sensor_data(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<SensorDataResponse>> {
    let report = state.machine_service.sensor_stats(id).await?;
    Ok(Json(report.into()))
}

/// Per-product-type breakdown over the full history
pub async fn get_lathe_product_analysis(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<ProductAnalysisResponse>> {
    let analysis = state.machine_service.product_analysis(id).await?;
    Ok(Json(analysis.into()))
}
