//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use quill_infra::DatabaseConfig;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Deadline for receiving a request's headers.
    pub read_timeout: Duration,
    /// Deadline for producing a response, storage calls included.
    pub write_timeout: Duration,
    pub run_migrations: bool,
    pub database: DatabaseConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secs_or = |key: &str, default: u64| {
            lookup(key)
                .and_then(|v| u64::from_str(&v).ok())
                .unwrap_or(default)
        };
        let count_or = |key: &str, default: u32| {
            lookup(key)
                .and_then(|v| v.parse().ok())
                .unwrap_or(default)
        };

        let url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let mut database = DatabaseConfig::new(url);
        database.max_connections = count_or("DB_MAX_CONNECTIONS", 100);
        database.min_connections = count_or("DB_MIN_CONNECTIONS", 10);

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            read_timeout: Duration::from_secs(secs_or("READ_TIMEOUT_SECS", 10)),
            write_timeout: Duration::from_secs(secs_or("WRITE_TIMEOUT_SECS", 10)),
            run_migrations: lookup("RUN_MIGRATIONS")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(true),
            database,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn database_url_is_required() {
        assert!(matches!(
            config_from(&[]),
            Err(ConfigError::Missing("DATABASE_URL"))
        ));
    }

    #[test]
    fn defaults_apply() {
        let config = config_from(&[("DATABASE_URL", "postgres://localhost/blog")]).unwrap();

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.read_timeout, Duration::from_secs(10));
        assert_eq!(config.write_timeout, Duration::from_secs(10));
        assert!(config.run_migrations);
        assert_eq!(config.database.url, "postgres://localhost/blog");
        assert_eq!(config.database.max_connections, 100);
    }

    #[test]
    fn overrides_are_read_and_garbage_ignored() {
        let config = config_from(&[
            ("DATABASE_URL", "postgres://db/blog"),
            ("PORT", "9000"),
            ("WRITE_TIMEOUT_SECS", "3"),
            ("READ_TIMEOUT_SECS", "soon"),
            ("DB_MAX_CONNECTIONS", "5"),
            ("RUN_MIGRATIONS", "false"),
        ])
        .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.write_timeout, Duration::from_secs(3));
        assert_eq!(config.read_timeout, Duration::from_secs(10));
        assert_eq!(config.database.max_connections, 5);
        assert!(!config.run_migrations);
    }

    #[test]
    fn out_of_range_pool_size_falls_back_to_default() {
        let config = config_from(&[
            ("DATABASE_URL", "postgres://db/blog"),
            ("DB_MAX_CONNECTIONS", "4294967297"),
            ("DB_MIN_CONNECTIONS", "-1"),
        ])
        .unwrap();

        assert_eq!(config.database.max_connections, 100);
        assert_eq!(config.database.min_connections, 10);
    }
}
