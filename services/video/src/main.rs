use anyhow::Result;
use aws_config::BehaviorVersion;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod error;
mod forms;
mod middleware;
mod models;
mod repositories;
mod routes;
mod service;
mod settings;
mod state;
mod storage;

use common::database::{DatabaseConfig, health_check, init_pool, run_migrations};

use crate::{
    middleware::{JwtConfig, JwtVerifier},
    repositories::VideoRepository,
    service::RecordedVideoService,
    settings::VideoSettings,
    state::AppState,
    storage::VideoStorage,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting recorded video service");

    let settings = VideoSettings::load()?;

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    if health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    run_migrations(&pool).await?;

    // Initialize S3 storage
    let aws_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let storage = VideoStorage::new(
        aws_sdk_s3::Client::new(&aws_config),
        settings.storage_bucket.clone(),
        settings.public_base_url.clone(),
    );

    let video_service = RecordedVideoService::new(VideoRepository::new(pool), storage);
    let jwt_verifier = JwtVerifier::new(&JwtConfig::from_env()?)?;

    let app_state = AppState {
        video_service: Arc::new(video_service),
        jwt_verifier,
    };

    let app = routes::create_router(app_state, settings.max_upload_bytes);

    let listener = tokio::net::TcpListener::bind(&settings.bind_address).await?;
    info!("Video service listening on {}", settings.bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
