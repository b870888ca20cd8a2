//! Pose evaluation routes

use axum::{
    Json, Router,
    extract::State,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

use crate::{
    error::PoseError,
    keypoints::{Feedback, compare_pose_directional},
    models::{AnalyzeRequest, AnalyzeResponse},
    reference::ReferencePoses,
};

#[derive(Clone)]
pub struct AppState {
    pub reference_poses: Arc<ReferencePoses>,
}

/// Create the router for the pose evaluation service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/analyze", post(analyze))
        .route("/save", post(save))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "UP" }))
}

/// Score one frame of a dancer against the song's reference choreography
pub async fn analyze(
    State(state): State<AppState>,
    Json(payload): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, PoseError> {
    let (Some(song_title), Some(keypoints)) = (payload.song_title, payload.keypoints) else {
        return Err(PoseError::MissingParameters);
    };
    let frame_index = payload.frame_index;

    if keypoints.is_empty() {
        debug!("No pose detected in frame {} of {}", frame_index, song_title);
        return Ok(Json(AnalyzeResponse {
            score: 0.0,
            feedback: Feedback::Worst,
            frame_index,
        }));
    }

    let reference = state
        .reference_poses
        .frame(&song_title, frame_index)
        .await
        .ok_or(PoseError::NoReferencePose(frame_index))?;

    let score = compare_pose_directional(&keypoints, &reference).map_err(|e| {
        error!(
            "Failed to compare frame {} of {}: {}",
            frame_index, song_title, e
        );
        PoseError::ComparisonFailed
    })?;

    debug!(
        "Session {:?} frame {} of {} scored {}",
        payload.session_id, frame_index, song_title, score
    );

    Ok(Json(AnalyzeResponse {
        score,
        feedback: Feedback::for_score(score),
        frame_index,
    }))
}

/// End of a session: release the cached reference poses
pub async fn save(State(state): State<AppState>) -> impl IntoResponse {
    let released = state.reference_poses.release();
    info!("Released reference poses of {} songs", released);

    Json(json!({ "status": "closed", "released_songs": released }))
}
