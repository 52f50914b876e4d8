use std::env;

use chrono::Duration;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

use crate::domain::auth::lockout::LockoutPolicy;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub lockout: LockoutConfig,
    #[serde(default)]
    pub accounts: Vec<AccountSeed>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
    pub grpc_port: u16,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SessionConfig {
    pub ttl_secs: u64,
    pub sweep_interval_secs: u64,
    pub secure_cookie: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 24 * 60 * 60,
            sweep_interval_secs: 60 * 60,
            secure_cookie: true,
        }
    }
}

/// Upper bound for `session.ttl_secs` and `lockout.duration_secs` (one year)
pub const MAX_DURATION_SECS: u64 = 365 * 24 * 60 * 60;

fn bounded_seconds(secs: u64) -> Duration {
    Duration::seconds(secs.min(MAX_DURATION_SECS) as i64)
}

impl SessionConfig {
    /// Session lifetime, saturating at [`MAX_DURATION_SECS`].
    pub fn ttl(&self) -> Duration {
        bounded_seconds(self.ttl_secs)
    }
}

/// Lockout settings. A `duration_secs` of 0 disables timed expiry.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LockoutConfig {
    pub threshold: u32,
    pub duration_secs: u64,
}

impl Default for LockoutConfig {
    fn default() -> Self {
        Self {
            threshold: LockoutPolicy::DEFAULT_THRESHOLD,
            duration_secs: LockoutPolicy::DEFAULT_DURATION_SECS as u64,
        }
    }
}

impl LockoutConfig {
    pub fn policy(&self) -> LockoutPolicy {
        let duration = match self.duration_secs {
            0 => None,
            secs => Some(bounded_seconds(secs)),
        };
        LockoutPolicy::new(self.threshold, duration)
    }
}

/// Account provisioned at startup if absent
#[derive(Debug, Deserialize, Clone)]
pub struct AccountSeed {
    pub user_id: String,
    pub password_hash: String,
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (STORAGE__DATABASE_URL, SERVER__HTTP_PORT, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on environment-specific configuration
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Layer on environment variables (with __ as separator)
            // Example: LOCKOUT__THRESHOLD=3 overrides lockout.threshold
            .add_source(Environment::default().separator("__"))
            .build()?;

        let config: Config = configuration.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    /// Reject durations that cannot be added to a timestamp safely.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session.ttl_secs == 0 || self.session.ttl_secs > MAX_DURATION_SECS {
            return Err(ConfigError::Message(format!(
                "session.ttl_secs must be between 1 and {}, got {}",
                MAX_DURATION_SECS, self.session.ttl_secs
            )));
        }

        if self.lockout.duration_secs > MAX_DURATION_SECS {
            return Err(ConfigError::Message(format!(
                "lockout.duration_secs must be at most {}, got {}",
                MAX_DURATION_SECS, self.lockout.duration_secs
            )));
        }

        Ok(())
    }
}
