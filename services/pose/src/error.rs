//! Error type for the pose evaluation service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum PoseError {
    #[error("Missing parameters")]
    MissingParameters,

    #[error("No reference pose for frame {0}")]
    NoReferencePose(i64),

    #[error("Pose comparison failed")]
    ComparisonFailed,
}

impl IntoResponse for PoseError {
    fn into_response(self) -> Response {
        let status = match &self {
            PoseError::MissingParameters | PoseError::NoReferencePose(_) => StatusCode::BAD_REQUEST,
            PoseError::ComparisonFailed => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn render(error: PoseError) -> (StatusCode, Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_error_responses() {
        assert_eq!(
            render(PoseError::MissingParameters).await,
            (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Missing parameters" })
            )
        );
        assert_eq!(
            render(PoseError::NoReferencePose(12)).await,
            (
                StatusCode::BAD_REQUEST,
                json!({ "error": "No reference pose for frame 12" })
            )
        );
        assert_eq!(
            render(PoseError::ComparisonFailed).await.0,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
