use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

use crate::kernel::cloudinary::CloudinaryConfig;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub environment: String,
    pub client_url: Option<String>,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub cloudinary: CloudinaryConfig,
    pub db_timeout: Duration,
    pub request_timeout: Duration,
    pub rate_limit_enabled: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            environment: env::var("ENVIRONMENT")
                .or_else(|_| env::var("NODE_ENV"))
                .unwrap_or_else(|_| "development".to_string()),
            client_url: env::var("CLIENT_URL").ok().filter(|url| !url.is_empty()),
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            jwt_issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "family-moments".to_string()),
            cloudinary: CloudinaryConfig {
                cloud_name: env::var("CLOUDINARY_CLOUD_NAME")
                    .context("CLOUDINARY_CLOUD_NAME must be set")?,
                api_key: env::var("CLOUDINARY_API_KEY")
                    .context("CLOUDINARY_API_KEY must be set")?,
                api_secret: env::var("CLOUDINARY_API_SECRET")
                    .context("CLOUDINARY_API_SECRET must be set")?,
                folder: env::var("MEDIA_FOLDER").unwrap_or_else(|_| "family-photos".to_string()),
                timeout: secs_var("UPSTREAM_TIMEOUT_SECS", 60)?,
            },
            db_timeout: secs_var("DB_TIMEOUT_SECS", 10)?,
            request_timeout: secs_var("REQUEST_TIMEOUT_SECS", 120)?,
            rate_limit_enabled: env::var("RATE_LIMIT_ENABLED")
                .map(|v| !matches!(v.to_lowercase().as_str(), "false" | "0" | "no"))
                .unwrap_or(true),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

/// Database settings only, for tools that never touch the media store.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub database_url: String,
    pub db_timeout: Duration,
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self> {
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            db_timeout: secs_var("DB_TIMEOUT_SECS", 10)?,
        })
    }
}

fn secs_var(name: &str, default: u64) -> Result<Duration> {
    match env::var(name) {
        Ok(raw) => raw
            .parse::<u64>()
            .map(Duration::from_secs)
            .with_context(|| format!("{} must be a whole number of seconds", name)),
        Err(_) => Ok(Duration::from_secs(default)),
    }
}
