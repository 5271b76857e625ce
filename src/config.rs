//! Service configuration read from the environment (and `.env`).

use std::path::PathBuf;

use log::warn;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";
/// Request bodies carry whole schedules; 5 MiB covers large tournaments
pub const DEFAULT_JSON_LIMIT_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Required in the `X-Admin-Password` header to delete tournaments
    pub admin_password: String,
    /// Built front-end served at `/` when set
    pub static_dir: Option<PathBuf>,
    pub json_limit_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            admin_password: DEFAULT_ADMIN_PASSWORD.to_string(),
            static_dir: None,
            json_limit_bytes: DEFAULT_JSON_LIMIT_BYTES,
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment variables
    ///
    /// `port_override` comes from the command line and wins over `PORT`.
    ///
    /// # Errors
    ///
    /// Returns an error if the loaded values fail [`AppConfig::validate`]
    pub fn from_env(port_override: Option<u16>) -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let port = port_override.unwrap_or_else(|| parse_env_or("PORT", DEFAULT_PORT));
        let host = std::env::var("BIND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let admin_password = match std::env::var("ADMIN_PASSWORD") {
            Ok(password) => password,
            Err(_) => {
                warn!("ADMIN_PASSWORD not set, using the default password; change this!");
                DEFAULT_ADMIN_PASSWORD.to_string()
            }
        };

        let static_dir = std::env::var("STATIC_DIR")
            .ok()
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from);

        let config = AppConfig {
            host,
            port,
            admin_password,
            static_dir,
            json_limit_bytes: parse_env_or("JSON_LIMIT_BYTES", DEFAULT_JSON_LIMIT_BYTES),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::Invalid {
                var: "PORT".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.admin_password.is_empty() {
            return Err(ConfigError::Invalid {
                var: "ADMIN_PASSWORD".to_string(),
                reason: "Must not be empty".to_string(),
            });
        }

        if self.json_limit_bytes < 1024 {
            return Err(ConfigError::Invalid {
                var: "JSON_LIMIT_BYTES".to_string(),
                reason: "Must be at least 1024".to_string(),
            });
        }

        if let Some(dir) = &self.static_dir {
            if !dir.is_dir() {
                return Err(ConfigError::Invalid {
                    var: "STATIC_DIR".to_string(),
                    reason: format!("{} is not a directory", dir.display()),
                });
            }
        }

        Ok(())
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.bind_address(), ("0.0.0.0".to_string(), 8080));
    }

    #[test]
    fn test_validation_rejects_empty_password() {
        let config = AppConfig {
            admin_password: String::new(),
            ..AppConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("ADMIN_PASSWORD"));
    }

    #[test]
    fn test_validation_rejects_missing_static_dir() {
        let config = AppConfig {
            static_dir: Some(PathBuf::from("/definitely/not/here")),
            ..AppConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_parse_env_or_falls_back() {
        assert_eq!(parse_env_or("TOURNEY_SCHEDULER_UNSET_TEST_VAR", 42u16), 42);
    }
}
