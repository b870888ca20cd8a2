//! Authentication service routes

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::{
    AppState,
    error::AuthError,
    models::{JoinRequest, LoginRequest, NewUser, TokenResponse, UserResponse},
    password::{hash_password, verify_password},
    validation::validate_join_request,
};

/// Create the router for the authentication service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/join", post(join))
        .route("/login", post(login))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "auth-service"
    }))
}

/// User registration endpoint
pub async fn join(
    State(state): State<AppState>,
    Json(payload): Json<JoinRequest>,
) -> Result<impl IntoResponse, AuthError> {
    validate_join_request(&payload).map_err(AuthError::Validation)?;

    let password_hash = hash_password(&payload.password1).map_err(|e| {
        error!("Failed to hash password: {}", e);
        AuthError::InternalServerError
    })?;

    let new_user = NewUser {
        username: payload.name,
        email: payload.email,
        password_hash,
    };

    let user = state.user_repository.create(&new_user).await?;
    info!("Registered user: {}", user.username);

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// User login endpoint
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AuthError> {
    info!("Login attempt for user: {}", payload.username);

    let Some(user) = state
        .user_repository
        .find_by_username(&payload.username)
        .await?
    else {
        warn!("Login for unknown user: {}", payload.username);
        return Err(AuthError::Unauthorized);
    };

    let valid = verify_password(&payload.password, &user.password_hash).map_err(|e| {
        error!("Failed to verify password for {}: {}", user.username, e);
        AuthError::InternalServerError
    })?;

    if !valid {
        warn!("Invalid password for user: {}", user.username);
        return Err(AuthError::Unauthorized);
    }

    let access_token = state
        .jwt_service
        .generate_access_token(&user.username)
        .map_err(|e| {
            error!("Failed to generate access token: {}", e);
            AuthError::InternalServerError
        })?;

    Ok(Json(TokenResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt_service.access_token_expiry(),
    }))
}
