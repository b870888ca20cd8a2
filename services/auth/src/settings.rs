//! Service settings loaded from defaults and `AUTH_*` environment variables

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

/// Settings of the authentication service
///
/// # Environment Variables
/// - `AUTH_BIND_ADDRESS` (default: `0.0.0.0:3000`)
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    pub bind_address: String,
}

impl AuthSettings {
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("bind_address", "0.0.0.0:3000")?
            .add_source(Environment::with_prefix("AUTH").try_parsing(true))
            .build()?
            .try_deserialize()
    }
}
