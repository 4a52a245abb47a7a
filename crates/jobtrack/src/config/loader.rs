use std::net::SocketAddr;
use std::path::Path;

use crate::config::schema::Config;
use crate::error::ConfigError;

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let config: Config = serde_json::from_str(content)?;

    validate_config(&config)?;

    Ok(config)
}

pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.bind_address.parse::<SocketAddr>().is_err() {
        return Err(ConfigError::Validation {
            message: format!("Invalid bind_address: '{}'", config.bind_address),
        });
    }

    if config.upload.max_bytes == 0 {
        return Err(ConfigError::Validation {
            message: "upload.max_bytes must be greater than zero".to_string(),
        });
    }

    if config.database_path.as_os_str().is_empty() {
        return Err(ConfigError::Validation {
            message: "database_path must not be empty".to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogFormat;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_object_uses_defaults() {
        let config = load_config_from_str("{}").unwrap();
        assert_eq!(config.bind_address, "127.0.0.1:3000");
        assert_eq!(config.log_format, LogFormat::Text);
        assert_eq!(config.upload.max_bytes, 200 * 1024);
        assert!(config.database_path.ends_with("jobtrack.db"));
    }

    #[test]
    fn test_full_config() {
        let config = load_config_from_str(
            r#"{
                "database_path": "/var/lib/jobtrack/db.sqlite",
                "uploads_path": "/data/uploads",
                "bind_address": "0.0.0.0:8080",
                "log_format": "json",
                "upload": { "max_bytes": 1024 }
            }"#,
        )
        .unwrap();
        assert_eq!(
            config.database_path,
            std::path::PathBuf::from("/var/lib/jobtrack/db.sqlite")
        );
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.upload.max_bytes, 1024);
    }

    #[test]
    fn test_invalid_bind_address() {
        let result = load_config_from_str(r#"{"bind_address": "localhost"}"#);
        assert!(matches!(result, Err(ConfigError::Validation { .. })));
    }

    #[test]
    fn test_zero_upload_limit_rejected() {
        let result = load_config_from_str(r#"{"upload": {"max_bytes": 0}}"#);
        assert!(matches!(result, Err(ConfigError::Validation { .. })));
    }

    #[test]
    fn test_malformed_json() {
        let result = load_config_from_str("{ not json");
        assert!(matches!(result, Err(ConfigError::ParseJson(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"bind_address": "127.0.0.1:4000"}}"#).unwrap();
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.bind_address, "127.0.0.1:4000");
    }

    #[test]
    fn test_missing_file() {
        let result = load_config("/nonexistent/jobtrack.json");
        assert!(matches!(result, Err(ConfigError::ReadFile { .. })));
    }

    // Tests that modify environment variables must run serially.
    #[test]
    #[serial]
    fn test_env_overrides() {
        std::env::set_var("JOBTRACK_DATABASE_PATH", "/tmp/jt.db");
        std::env::set_var("UPLOADS_PATH", "/tmp/jt-uploads");
        std::env::set_var("JOBTRACK_BIND_ADDRESS", "");

        let mut config = Config::default();
        config.apply_env_overrides();
        assert_eq!(config.database_path, std::path::PathBuf::from("/tmp/jt.db"));
        assert_eq!(
            config.uploads_path,
            std::path::PathBuf::from("/tmp/jt-uploads")
        );
        assert_eq!(config.bind_address, "127.0.0.1:3000");

        std::env::remove_var("JOBTRACK_DATABASE_PATH");
        std::env::remove_var("UPLOADS_PATH");
        std::env::remove_var("JOBTRACK_BIND_ADDRESS");
    }
}
