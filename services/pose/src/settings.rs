//! Service settings loaded from defaults and `POSE_*` environment variables

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

/// Settings of the pose evaluation service
///
/// # Environment Variables
/// - `POSE_BIND_ADDRESS` (default: `0.0.0.0:5000`)
/// - `POSE_REFERENCE_DIR`: directory of the per-song reference files (default: `./ref_poses`)
#[derive(Debug, Clone, Deserialize)]
pub struct PoseSettings {
    pub bind_address: String,
    pub reference_dir: String,
}

impl PoseSettings {
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("bind_address", "0.0.0.0:5000")?
            .set_default("reference_dir", "./ref_poses")?
            .add_source(Environment::with_prefix("POSE").try_parsing(true))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_defaults_and_overrides() {
        unsafe {
            std::env::remove_var("POSE_BIND_ADDRESS");
            std::env::remove_var("POSE_REFERENCE_DIR");
        }
        let settings = PoseSettings::load().unwrap();
        assert_eq!(settings.bind_address, "0.0.0.0:5000");
        assert_eq!(settings.reference_dir, "./ref_poses");

        unsafe { std::env::set_var("POSE_REFERENCE_DIR", "/srv/choreography") };
        let settings = PoseSettings::load();
        unsafe { std::env::remove_var("POSE_REFERENCE_DIR") };

        assert_eq!(settings.unwrap().reference_dir, "/srv/choreography");
    }
}
