// HTTP error mapping for machine use cases
use crate::application::error::MachineError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl From<MachineError> for ApiError {
    fn from(err: MachineError) -> Self {
        if err.is_not_found() {
            tracing::warn!(kind = err.kind(), "{}", err);
            Self {
                status: StatusCode::NOT_FOUND,
                detail: err.to_string(),
            }
        } else {
            tracing::error!(kind = err.kind(), error = %err, "record source error");
            Self {
                status: StatusCode::BAD_GATEWAY,
                detail: "Record source unavailable".to_string(),
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
