//! Service settings loaded from defaults and `VIDEO_*` environment variables

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

/// Settings of the video service
///
/// # Environment Variables
/// - `VIDEO_BIND_ADDRESS` (default: `0.0.0.0:3002`)
/// - `VIDEO_STORAGE_BUCKET` (default: `recorded-videos`)
/// - `VIDEO_PUBLIC_BASE_URL`: prefix of the URLs handed to clients
/// - `VIDEO_MAX_UPLOAD_BYTES` (default: 200 MiB)
#[derive(Debug, Clone, Deserialize)]
pub struct VideoSettings {
    pub bind_address: String,
    pub storage_bucket: String,
    pub public_base_url: String,
    pub max_upload_bytes: usize,
}

impl VideoSettings {
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("bind_address", "0.0.0.0:3002")?
            .set_default("storage_bucket", "recorded-videos")?
            .set_default(
                "public_base_url",
                "https://recorded-videos.s3.amazonaws.com",
            )?
            .set_default("max_upload_bytes", 200_i64 * 1024 * 1024)?
            .add_source(Environment::with_prefix("VIDEO").try_parsing(true))
            .build()?
            .try_deserialize()
    }
}
