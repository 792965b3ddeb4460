//! Configuration module
//!
//! Application configuration loaded from the environment at process start.
//! All tuning knobs for the ingestion pipeline (tool paths, storage layout,
//! queue concurrency) live here; no component reads the environment directly.

use std::env;
use std::str::FromStr;

// Common defaults
const DEFAULT_SERVER_PORT: u16 = 3000;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 20;
const DEFAULT_DB_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_VIDEO_SIZE_BYTES: usize = 512 * 1024 * 1024;
const DEFAULT_MAX_CONCURRENT_JOBS: usize = 2;

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    pub log_json: bool,
    // Database configuration
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    // Durable file store configuration
    pub storage_path: String,
    pub storage_base_url: String,
    // External tool configuration
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    // Ingestion configuration
    pub max_video_size_bytes: usize,
    pub extraction_max_concurrent_jobs: usize,
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: FromStr>(key: &str, default: T) -> Result<T, anyhow::Error> {
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|_| anyhow::anyhow!("Invalid value for {}: {}", key, raw)),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let database_url =
            env::var("DATABASE_URL").map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;

        let cors_origins = env_or("CORS_ORIGINS", "http://localhost:3000")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            server_port: env_parse("SERVER_PORT", DEFAULT_SERVER_PORT)?,
            environment: env_or("ENVIRONMENT", "development"),
            cors_origins,
            log_json: env_parse("LOG_JSON", false)?,
            database_url,
            db_max_connections: env_parse("DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS)?,
            db_timeout_seconds: env_parse("DB_TIMEOUT_SECONDS", DEFAULT_DB_TIMEOUT_SECS)?,
            storage_path: env_or("STORAGE_PATH", "./data/media"),
            storage_base_url: env_or("STORAGE_BASE_URL", "http://localhost:3000/media"),
            ffmpeg_path: env_or("FFMPEG_PATH", "ffmpeg"),
            ffprobe_path: env_or("FFPROBE_PATH", "ffprobe"),
            max_video_size_bytes: env_parse("MAX_VIDEO_SIZE_BYTES", DEFAULT_MAX_VIDEO_SIZE_BYTES)?,
            extraction_max_concurrent_jobs: env_parse(
                "EXTRACTION_MAX_CONCURRENT_JOBS",
                DEFAULT_MAX_CONCURRENT_JOBS,
            )?,
        })
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }
}
