//! JWT issuance for authenticated users
//!
//! Access tokens are signed with RS256. The video service verifies them with
//! the matching public key and reads the username from `sub`.

use anyhow::Result;
use jsonwebtoken::{EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::warn;

/// 15 minutes
const DEFAULT_ACCESS_TOKEN_EXPIRY: u64 = 900;

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Private key for signing tokens
    pub private_key: String,
    /// Access token expiration time in seconds (default: 15 minutes)
    pub access_token_expiry: u64,
}

impl JwtConfig {
    /// Create a new JwtConfig from environment variables
    ///
    /// # Environment Variables
    /// - `JWT_PRIVATE_KEY`: Private key for signing tokens (PEM format) or path to private key file
    /// - `JWT_ACCESS_TOKEN_EXPIRY`: Access token expiry in seconds (default: 900)
    pub fn from_env() -> Result<Self> {
        let private_key = std::env::var("JWT_PRIVATE_KEY")
            .map_err(|_| anyhow::anyhow!("JWT_PRIVATE_KEY environment variable not set"))?;

        // If the private key looks like a file path, read from file (try CWD, then crate root)
        let private_key = if private_key.starts_with("-----BEGIN") {
            private_key
        } else {
            std::fs::read_to_string(&private_key)
                .or_else(|_| {
                    let mut path = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
                    path.push(&private_key);
                    std::fs::read_to_string(path)
                })
                .map_err(|e| anyhow::anyhow!("Failed to read private key file: {}", e))?
                .trim()
                .to_string()
        };

        let access_token_expiry = match std::env::var("JWT_ACCESS_TOKEN_EXPIRY") {
            Ok(value) => value.trim().parse().unwrap_or_else(|_| {
                warn!(
                    "Invalid JWT_ACCESS_TOKEN_EXPIRY {:?}, using {} seconds",
                    value, DEFAULT_ACCESS_TOKEN_EXPIRY
                );
                DEFAULT_ACCESS_TOKEN_EXPIRY
            }),
            Err(_) => DEFAULT_ACCESS_TOKEN_EXPIRY,
        };

        Ok(JwtConfig {
            private_key,
            access_token_expiry,
        })
    }
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Username
    pub sub: String,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
}

/// JWT service
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    access_token_expiry: u64,
}

impl JwtService {
    /// Initialize a new JWT service
    pub fn new(config: JwtConfig) -> Result<Self> {
        let encoding_key = EncodingKey::from_rsa_pem(config.private_key.as_bytes())?;

        Ok(JwtService {
            encoding_key,
            access_token_expiry: config.access_token_expiry,
        })
    }

    /// Generate an access token for a user
    pub fn generate_access_token(&self, username: &str) -> Result<String> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| anyhow::anyhow!("Failed to get current time: {}", e))?
            .as_secs();

        let claims = Claims {
            sub: username.to_string(),
            iat: now,
            exp: now + self.access_token_expiry,
        };

        let token = encode(
            &Header::new(jsonwebtoken::Algorithm::RS256),
            &claims,
            &self.encoding_key,
        )?;
        Ok(token)
    }

    /// Get the access token expiry time
    pub fn access_token_expiry(&self) -> u64 {
        self.access_token_expiry
    }
}
