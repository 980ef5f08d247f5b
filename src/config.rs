use std::env;
use std::path::PathBuf;

use thiserror::Error;

const DEFAULT_UPLOAD_DIR: &str = "uploads";
const DEFAULT_GENERATED_DIR: &str = "generated";
const DEFAULT_TEMPLATE_PATH: &str = "modelo/modelo.docx";
const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_MAX_UPLOAD_MB: usize = 20;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid value for {name}: '{value}'")]
    InvalidValue { name: &'static str, value: String },
}

/// Runtime settings, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub upload_dir: PathBuf,
    pub generated_dir: PathBuf,
    pub template_path: PathBuf,
    pub bind_address: String,
    pub port: u16,
    /// Leave run directories and uploads on disk after responding.
    pub keep_generated: bool,
    pub max_upload_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            generated_dir: PathBuf::from(DEFAULT_GENERATED_DIR),
            template_path: PathBuf::from(DEFAULT_TEMPLATE_PATH),
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            port: DEFAULT_PORT,
            keep_generated: false,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_MB * 1024 * 1024,
        }
    }
}

impl AppConfig {
    /// Read the process environment, after loading `.env` if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup. Unset or blank keys fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let port = match get("PORT") {
            Some(value) => value.parse::<u16>().map_err(|_| ConfigError::InvalidValue {
                name: "PORT",
                value,
            })?,
            None => defaults.port,
        };

        let keep_generated = match get("KEEP_GENERATED") {
            Some(value) => parse_bool(&value).ok_or(ConfigError::InvalidValue {
                name: "KEEP_GENERATED",
                value,
            })?,
            None => defaults.keep_generated,
        };

        let max_upload_bytes = match get("MAX_UPLOAD_MB") {
            Some(value) => match value.parse::<usize>() {
                Ok(mb) if mb > 0 => mb.saturating_mul(1024 * 1024),
                _ => {
                    return Err(ConfigError::InvalidValue {
                        name: "MAX_UPLOAD_MB",
                        value,
                    })
                }
            },
            None => defaults.max_upload_bytes,
        };

        Ok(Self {
            upload_dir: get("UPLOAD_DIR").map(PathBuf::from).unwrap_or(defaults.upload_dir),
            generated_dir: get("GENERATED_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.generated_dir),
            template_path: get("TEMPLATE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.template_path),
            bind_address: get("BIND_ADDRESS").unwrap_or(defaults.bind_address),
            port,
            keep_generated,
            max_upload_bytes,
        })
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
