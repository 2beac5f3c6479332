//! Application configuration constants.
//!
//! Tunable limits live here; the database path and server port can be
//! overridden from `config.toml` or the environment.

use serde::Deserialize;
use std::path::PathBuf;

/// Configuration file structure for config.toml
#[derive(Debug, Default, Deserialize)]
struct AppConfig {
    database: Option<DatabaseConfig>,
    server: Option<ServerConfig>,
}

#[derive(Debug, Deserialize)]
struct DatabaseConfig {
    path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ServerConfig {
    port: Option<u16>,
}

const CONFIG_FILE: &str = "config.toml";

fn read_config_file() -> Option<AppConfig> {
    let contents = std::fs::read_to_string(CONFIG_FILE).ok()?;
    match toml::from_str::<AppConfig>(&contents) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!("Ignoring malformed {}: {}", CONFIG_FILE, e);
            None
        }
    }
}

// ==================== Database Configuration ====================

pub const DEFAULT_DATABASE_PATH: &str = "data/recital.db";

/// Load database path with priority: config.toml > .env > default
pub fn load_database_path() -> PathBuf {
    let _ = dotenvy::dotenv();
    resolve_database_path(read_config_file(), std::env::var("DATABASE_PATH").ok())
}

fn resolve_database_path(config: Option<AppConfig>, env_path: Option<String>) -> PathBuf {
    if let Some(path) = config.and_then(|c| c.database).and_then(|db| db.path) {
        tracing::info!("Using database from config.toml: {}", path);
        return PathBuf::from(path);
    }

    if let Some(path) = env_path {
        tracing::info!("Using database from DATABASE_PATH env: {}", path);
        return PathBuf::from(path);
    }

    let default = PathBuf::from(DEFAULT_DATABASE_PATH);
    tracing::info!("Using default database path: {}", default.display());
    default
}

// ==================== Server Configuration ====================

/// Server address to bind to
pub const SERVER_ADDR: &str = "0.0.0.0";

/// Default server port
pub const SERVER_PORT: u16 = 3000;

/// Server port with priority: config.toml > RECITAL_PORT > default
pub fn server_port() -> u16 {
    let _ = dotenvy::dotenv();
    resolve_server_port(read_config_file(), std::env::var("RECITAL_PORT").ok())
}

fn resolve_server_port(config: Option<AppConfig>, env_port: Option<String>) -> u16 {
    if let Some(port) = config.and_then(|c| c.server).and_then(|s| s.port) {
        return port;
    }
    match env_port.map(|p| p.parse::<u16>()) {
        Some(Ok(port)) => port,
        Some(Err(e)) => {
            tracing::warn!("Invalid RECITAL_PORT, using {}: {}", SERVER_PORT, e);
            SERVER_PORT
        }
        None => SERVER_PORT,
    }
}

/// Get the full server bind address
pub fn server_bind_addr(port: u16) -> String {
    format!("{}:{}", SERVER_ADDR, port)
}

// ==================== Session Configuration ====================

/// Test sessions idle longer than this are dropped
pub const SESSION_EXPIRY_HOURS: i64 = 2;

/// Probability threshold for session cleanup (0-255, lower = more frequent)
/// Value of 25 means ~10% chance (25/256) on each session access
pub const SESSION_CLEANUP_THRESHOLD: u8 = 25;

/// Length of generated test session ids
pub const SESSION_ID_LEN: usize = 32;

// ==================== Planning Configuration ====================

/// Maximum average passages per day a plan may ask for
pub const MAX_DAILY_LOAD: f64 = 10.0;

// ==================== Query Limits ====================

/// Default limit for keyword search
pub const SEARCH_LIMIT: usize = 50;

/// Version used when a request does not name one
pub const DEFAULT_VERSION: &str = "WEB";
