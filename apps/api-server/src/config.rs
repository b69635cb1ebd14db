//! Application configuration loaded from environment variables.

use std::env;
use std::num::NonZeroU32;
use std::str::FromStr;

use quota_core::QuotaConfig;

#[cfg(feature = "postgres")]
use quota_infra::DatabaseConfig;

/// Which usage store backs the quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Postgres,
    Redis,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" | "in-memory" => Ok(Self::Memory),
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "redis" => Ok(Self::Redis),
            other => Err(format!("unknown store backend: {other}")),
        }
    }
}

/// Purge schedule for stores without key expiry.
#[derive(Debug, Clone)]
pub struct RetentionConfig {
    pub enabled: bool,
    /// Six-field cron expression (with seconds).
    pub schedule: String,
    /// Windows older than this many minutes are deleted.
    pub keep_minutes: i64,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            schedule: "0 */5 * * * *".to_string(),
            keep_minutes: 60,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub quota: QuotaConfig,
    pub store: StoreBackend,
    /// Run on the in-memory store when the configured one is unreachable at startup.
    pub fallback_to_memory: bool,
    /// Apply pending migrations before serving traffic.
    pub run_migrations: bool,
    pub retention: RetentionConfig,
    #[cfg(feature = "postgres")]
    pub database: Option<DatabaseConfig>,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let quota = match env::var("RATE_LIMIT_PER_MINUTE") {
            Ok(raw) => match raw.parse::<NonZeroU32>() {
                Ok(limit) => QuotaConfig::new(limit),
                Err(_) => {
                    tracing::warn!(value = %raw, "Invalid RATE_LIMIT_PER_MINUTE, using default");
                    QuotaConfig::default()
                }
            },
            Err(_) => QuotaConfig::default(),
        };

        let store = match env::var("STORE_BACKEND") {
            Ok(raw) => raw.parse().unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Falling back to the in-memory store");
                StoreBackend::Memory
            }),
            Err(_) => StoreBackend::Memory,
        };

        let defaults = RetentionConfig::default();
        let retention = RetentionConfig {
            enabled: env_flag("RETENTION_ENABLED", defaults.enabled),
            schedule: env::var("RETENTION_CRON").unwrap_or(defaults.schedule),
            keep_minutes: env::var("RETENTION_MINUTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|m: &i64| *m > 0)
                .unwrap_or(defaults.keep_minutes),
        };

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            quota,
            store,
            fallback_to_memory: env_flag("STORE_FALLBACK_TO_MEMORY", false),
            run_migrations: env_flag("RUN_MIGRATIONS", true),
            retention,
            #[cfg(feature = "postgres")]
            database: DatabaseConfig::from_env(),
        }
    }
}

fn env_flag(name: &str, default: bool) -> bool {
    env::var(name)
        .map(|v| !matches!(v.to_lowercase().as_str(), "false" | "0" | "no" | "off"))
        .unwrap_or(default)
}
