//! Recorded video routes

use axum::{
    Extension, Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{
    error::{ApiError, ApiResult},
    forms::{SaveVideoForm, read_edit_file},
    middleware::{AuthUser, auth_context},
    models::{MyVideoResponse, MyVideosQuery, RecordedVideo, SessionVideosQuery},
    state::AppState,
};

/// Create the router for the video service
pub fn create_router(state: AppState, max_upload_bytes: usize) -> Router {
    let recorded_video = Router::new()
        .route("/user/me", get(get_my_videos))
        .route("/session", get(get_videos_by_session))
        .route("/saveVideo", post(save_recorded_video))
        .route("/:video_id", get(get_video))
        .route("/:video_id/edit", post(edit_video))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_context));

    Router::new()
        .route("/health", get(health_check))
        .nest("/recorded-video", recorded_video)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "video-service"
    }))
}

/// Videos of the authenticated user, optionally filtered by mode
pub async fn get_my_videos(
    State(state): State<AppState>,
    user: Option<Extension<AuthUser>>,
    Query(query): Query<MyVideosQuery>,
) -> ApiResult<Json<Vec<MyVideoResponse>>> {
    let Some(Extension(user)) = user else {
        return Err(ApiError::Unauthorized);
    };

    let videos = match query.mode {
        Some(mode) => {
            state
                .video_service
                .list_by_mode_and_username(&user.username, mode)
                .await?
        }
        None => state.video_service.list_by_username(&user.username).await?,
    };

    Ok(Json(videos))
}

/// A single video by ID
pub async fn get_video(
    State(state): State<AppState>,
    Path(video_id): Path<i64>,
) -> ApiResult<Json<MyVideoResponse>> {
    state
        .video_service
        .get_by_id(video_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Video not found with ID: {}", video_id)))
}

/// Videos recorded in a session with the given mode
pub async fn get_videos_by_session(
    State(state): State<AppState>,
    Query(query): Query<SessionVideosQuery>,
) -> ApiResult<Json<Vec<MyVideoResponse>>> {
    let videos = state
        .video_service
        .list_by_session_and_mode(query.session_id, query.mode)
        .await?;

    Ok(Json(videos))
}

/// Store an uploaded recording for the authenticated user
pub async fn save_recorded_video(
    State(state): State<AppState>,
    user: Option<Extension<AuthUser>>,
    multipart: Multipart,
) -> ApiResult<Json<RecordedVideo>> {
    let Some(Extension(user)) = user else {
        return Err(ApiError::Unauthorized);
    };

    let (dto, file) = SaveVideoForm::read(multipart).await?.into_parts()?;
    info!(
        "Saving {} byte recording for {} (session {}, {})",
        file.len(),
        user.username,
        dto.session_id,
        dto.video_mode
    );

    let video = state
        .video_service
        .save_recorded_video(dto, file, &user.username)
        .await?;

    Ok(Json(video))
}

/// Replace the file of an existing video
pub async fn edit_video(
    State(state): State<AppState>,
    Path(video_id): Path<i64>,
    multipart: Multipart,
) -> ApiResult<Json<MyVideoResponse>> {
    let file = read_edit_file(multipart).await?;
    let video = state.video_service.edit_video(video_id, file).await?;

    Ok(Json(MyVideoResponse::from(video)))
}
