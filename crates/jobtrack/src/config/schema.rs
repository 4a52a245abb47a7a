use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::upload::DEFAULT_MAX_UPLOAD_BYTES;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
    #[serde(default = "default_uploads_path")]
    pub uploads_path: PathBuf,
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default)]
    pub log_format: LogFormat,
    #[serde(default)]
    pub upload: UploadConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            uploads_path: default_uploads_path(),
            bind_address: default_bind_address(),
            log_format: LogFormat::default(),
            upload: UploadConfig::default(),
        }
    }
}

impl Config {
    /// Applies `JOBTRACK_DATABASE_PATH`, `UPLOADS_PATH` and
    /// `JOBTRACK_BIND_ADDRESS` when set and non-empty.
    pub fn apply_env_overrides(&mut self) {
        if let Some(path) = non_empty_env("JOBTRACK_DATABASE_PATH") {
            self.database_path = PathBuf::from(path);
        }
        if let Some(path) = non_empty_env("UPLOADS_PATH") {
            self.uploads_path = PathBuf::from(path);
        }
        if let Some(addr) = non_empty_env("JOBTRACK_BIND_ADDRESS") {
            self.bind_address = addr;
        }
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn default_database_path() -> PathBuf {
    crate::db::default_database_path().unwrap_or_else(|| PathBuf::from("jobtrack.db"))
}

fn default_uploads_path() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".jobtrack").join("uploads"))
        .unwrap_or_else(|| PathBuf::from("uploads"))
}

fn default_bind_address() -> String {
    "127.0.0.1:3000".to_string()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    #[serde(default = "default_max_bytes")]
    pub max_bytes: u64,
}

fn default_max_bytes() -> u64 {
    DEFAULT_MAX_UPLOAD_BYTES
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}
