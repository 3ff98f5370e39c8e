// Ballpark - Configuration
//
// Reads process configuration once at startup. The resulting `Config` is
// passed explicitly to whatever needs it; nothing here is global.
//
//   APP_ENV               development | test | production (default: development)
//   PORT                  HTTP listen port (default: 3001)
//   DATABASE_PATH         SQLite file (default: <data dir>/ballpark/ballpark.db)
//   API_KEY_PEPPER        required outside the test environment
//   DISABLE_API_KEY_AUTH  "true" bypasses the API key gate
//   PLAYER_FEED_PATH      JSON player feed; the sync job runs only when set
//   PLAYER_SYNC_INTERVAL_SECS  seconds between syncs (default: 86400)

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use zeroize::Zeroizing;

use crate::secret::SecretHasher;

pub const DEFAULT_PORT: u16 = 3001;

pub const DEFAULT_PLAYER_SYNC_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Pepper used when running in the test environment without one configured.
const TEST_PEPPER: &str = "test-api-key-pepper";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("API_KEY_PEPPER is required")]
    MissingPepper,

    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl Environment {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Some(Environment::Development),
            "test" => Some(Environment::Test),
            "production" | "prod" => Some(Environment::Production),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Test => "test",
            Environment::Production => "production",
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub environment: Environment,
    pub port: u16,
    pub database_path: PathBuf,
    pub disable_api_key_auth: bool,
    pub player_feed_path: Option<PathBuf>,
    pub player_sync_interval: Duration,
    api_key_pepper: Zeroizing<String>,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its
    /// value. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let environment = match get("APP_ENV") {
            Some(value) => Environment::parse(&value).ok_or_else(|| ConfigError::Invalid {
                key: "APP_ENV",
                reason: format!("unknown environment '{}'", value),
            })?,
            None => Environment::Development,
        };

        let port = match get("PORT") {
            Some(value) => value.trim().parse().map_err(|e| ConfigError::Invalid {
                key: "PORT",
                reason: format!("{}", e),
            })?,
            None => DEFAULT_PORT,
        };

        let database_path = get("DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(default_database_path);

        let api_key_pepper = match get("API_KEY_PEPPER") {
            Some(pepper) => pepper,
            None if environment == Environment::Test => TEST_PEPPER.to_string(),
            None => return Err(ConfigError::MissingPepper),
        };

        let disable_api_key_auth = get("DISABLE_API_KEY_AUTH").as_deref() == Some("true");

        let player_feed_path = get("PLAYER_FEED_PATH").map(PathBuf::from);

        let player_sync_interval = match get("PLAYER_SYNC_INTERVAL_SECS") {
            Some(value) => match value.trim().parse::<u64>() {
                Ok(0) => {
                    return Err(ConfigError::Invalid {
                        key: "PLAYER_SYNC_INTERVAL_SECS",
                        reason: "must be greater than zero".to_string(),
                    })
                }
                Ok(secs) => Duration::from_secs(secs),
                Err(e) => {
                    return Err(ConfigError::Invalid {
                        key: "PLAYER_SYNC_INTERVAL_SECS",
                        reason: format!("{}", e),
                    })
                }
            },
            None => DEFAULT_PLAYER_SYNC_INTERVAL,
        };

        Ok(Self {
            environment,
            port,
            database_path,
            disable_api_key_auth,
            player_feed_path,
            player_sync_interval,
            api_key_pepper: Zeroizing::new(api_key_pepper),
        })
    }

    pub fn secret_hasher(&self) -> SecretHasher {
        SecretHasher::new(&self.api_key_pepper)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("environment", &self.environment)
            .field("port", &self.port)
            .field("database_path", &self.database_path)
            .field("disable_api_key_auth", &self.disable_api_key_auth)
            .field("player_feed_path", &self.player_feed_path)
            .field("player_sync_interval", &self.player_sync_interval)
            .field("api_key_pepper", &"[REDACTED]")
            .finish()
    }
}

/// Default database location under the platform data directory.
fn default_database_path() -> PathBuf {
    let base = dirs_next::data_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("ballpark").join("ballpark.db")
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_uses_provided_pepper() {
        let config = load(&[
            ("APP_ENV", "development"),
            ("API_KEY_PEPPER", "pepper-123"),
            ("DISABLE_API_KEY_AUTH", "false"),
        ])
        .unwrap();

        assert_eq!(
            config.secret_hasher().hash("k"),
            SecretHasher::new("pepper-123").hash("k")
        );
        assert!(!config.disable_api_key_auth);
        assert_eq!(config.environment, Environment::Development);
    }

    #[test]
    fn test_missing_pepper_allowed_in_test_env() {
        let config = load(&[
            ("APP_ENV", "test"),
            ("API_KEY_PEPPER", ""),
            ("DISABLE_API_KEY_AUTH", "true"),
        ])
        .unwrap();

        assert_eq!(
            config.secret_hasher().hash("k"),
            SecretHasher::new(TEST_PEPPER).hash("k")
        );
        assert!(config.disable_api_key_auth);
    }

    #[test]
    fn test_missing_pepper_is_fatal_outside_test_env() {
        let err = load(&[("APP_ENV", "development"), ("API_KEY_PEPPER", "")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingPepper));
        assert_eq!(err.to_string(), "API_KEY_PEPPER is required");

        let err = load(&[("APP_ENV", "production")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingPepper));

        // Default environment is development, so the pepper is required.
        assert!(load(&[]).is_err());
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("API_KEY_PEPPER", "p")]).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert!(!config.disable_api_key_auth);
        assert!(config.database_path.ends_with("ballpark/ballpark.db"));
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.player_feed_path, None);
        assert_eq!(config.player_sync_interval, DEFAULT_PLAYER_SYNC_INTERVAL);
    }

    #[test]
    fn test_player_sync_settings() {
        let config = load(&[
            ("API_KEY_PEPPER", "p"),
            ("PLAYER_FEED_PATH", "/srv/feeds/players.json"),
            ("PLAYER_SYNC_INTERVAL_SECS", "3600"),
        ])
        .unwrap();
        assert_eq!(
            config.player_feed_path,
            Some(PathBuf::from("/srv/feeds/players.json"))
        );
        assert_eq!(config.player_sync_interval, Duration::from_secs(3600));

        for bad in ["0", "hourly", "-5"] {
            let err = load(&[("API_KEY_PEPPER", "p"), ("PLAYER_SYNC_INTERVAL_SECS", bad)])
                .unwrap_err();
            assert!(matches!(
                err,
                ConfigError::Invalid {
                    key: "PLAYER_SYNC_INTERVAL_SECS",
                    ..
                }
            ));
        }
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("API_KEY_PEPPER", "p"),
            ("APP_ENV", "production"),
            ("PORT", "8080"),
            ("DATABASE_PATH", "/var/lib/ballpark/keys.db"),
        ])
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.database_path, PathBuf::from("/var/lib/ballpark/keys.db"));
        assert_eq!(config.environment, Environment::Production);
    }

    #[test]
    fn test_disable_flag_requires_exact_true() {
        let config = load(&[("API_KEY_PEPPER", "p"), ("DISABLE_API_KEY_AUTH", "yes")]).unwrap();
        assert!(!config.disable_api_key_auth);
    }

    #[test]
    fn test_invalid_port_and_env() {
        let err = load(&[("API_KEY_PEPPER", "p"), ("PORT", "http")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "PORT", .. }));

        let err = load(&[("API_KEY_PEPPER", "p"), ("APP_ENV", "staging")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "APP_ENV", .. }));
    }

    #[test]
    fn test_debug_redacts_pepper() {
        let config = load(&[("API_KEY_PEPPER", "very-secret-pepper")]).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("very-secret-pepper"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_secret_hasher_uses_configured_pepper() {
        let config = load(&[("API_KEY_PEPPER", "pepper-123")]).unwrap();
        assert_eq!(
            config.secret_hasher().hash("k"),
            SecretHasher::new("pepper-123").hash("k")
        );
    }
}
