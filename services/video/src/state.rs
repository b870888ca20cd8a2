//! Application state shared across handlers

use std::sync::Arc;

use crate::{middleware::JwtVerifier, service::VideoService};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub video_service: Arc<dyn VideoService>,
    pub jwt_verifier: JwtVerifier,
}
