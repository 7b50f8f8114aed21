//! REST API handlers.

pub mod labels;

use axum::Json;
use axum::http::StatusCode;
use serde_json::{Value, json};

use crate::pipeline::PipelineError;

/// Standard success response.
pub fn ok_json(data: Value) -> Json<Value> {
    Json(json!({ "status": "ok", "data": data }))
}

/// Standard error response.
pub fn err_json(status: u16, message: &str) -> (StatusCode, Json<Value>) {
    (
        StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(json!({ "status": "error", "error": message })),
    )
}

/// Map a pipeline failure to 400 (bad request data) or 500.
pub fn pipeline_err(e: PipelineError) -> (StatusCode, Json<Value>) {
    let status = if e.is_caller_error() { 400 } else { 500 };
    if status == 500 {
        tracing::error!("Label pipeline failed: {e}");
    }
    err_json(status, &e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_envelope() {
        let (status, Json(body)) = err_json(400, "bad input");
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "status": "error", "error": "bad input" }));
    }

    #[test]
    fn pipeline_errors_map_to_status() {
        let (status, _) = pipeline_err(PipelineError::NoRows);
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, Json(body)) = pipeline_err(PipelineError::NoDatabase);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("LABEL_DB_PATH"));
    }
}
