use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod error;
mod keypoints;
mod models;
mod reference;
mod routes;
mod settings;

use crate::{reference::ReferencePoses, routes::AppState, settings::PoseSettings};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting pose evaluation service");

    let settings = PoseSettings::load()?;
    info!("Reading reference poses from {}", settings.reference_dir);

    let app_state = AppState {
        reference_poses: Arc::new(ReferencePoses::new(&settings.reference_dir)),
    };

    let app = routes::create_router(app_state);

    let listener = tokio::net::TcpListener::bind(&settings.bind_address).await?;
    info!("Pose service listening on {}", settings.bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
