use std::env;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

const HOST: &str = "0.0.0.0";
const PORT: u16 = 8080;
const GEMINI_MODEL: &str = "gemini-2.5-flash";
const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const MAPS_BASE_URL: &str = "https://maps.googleapis.com";
const CREDENTIAL_STORE_PATH: &str = ".travel-planner/credentials.json";
const HTTP_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} is invalid: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub maps_base_url: String,
    pub credential_store_path: PathBuf,
    pub http_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let gemini_api_key = env::var("GEMINI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::Missing("GEMINI_API_KEY"))?;

        let port = match env::var("PORT") {
            Ok(value) => value.parse().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                value,
            })?,
            Err(_) => PORT,
        };

        let timeout_secs = match env::var("HTTP_TIMEOUT_SECS") {
            Ok(value) => value.parse().map_err(|_| ConfigError::Invalid {
                name: "HTTP_TIMEOUT_SECS",
                value,
            })?,
            Err(_) => HTTP_TIMEOUT_SECS,
        };

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| HOST.to_string()),
            port,
            gemini_api_key,
            gemini_model: env::var("GEMINI_MODEL").unwrap_or_else(|_| GEMINI_MODEL.to_string()),
            gemini_base_url: env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| GEMINI_BASE_URL.to_string()),
            maps_base_url: env::var("MAPS_BASE_URL").unwrap_or_else(|_| MAPS_BASE_URL.to_string()),
            credential_store_path: env::var("CREDENTIAL_STORE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(CREDENTIAL_STORE_PATH)),
            http_timeout: Duration::from_secs(timeout_secs),
        })
    }
}
