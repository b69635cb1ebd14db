//! Redis usage store - one string counter per window key, expired by TTL.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, Script};

use quota_core::error::StoreError;
use quota_core::ports::{CreateOutcome, UsageStore};
use quota_core::{UsageRecord, WindowKey};

/// Redis connection configuration.
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis URL (e.g., redis://localhost:6379)
    pub url: String,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Key prefix for usage counters
    pub key_prefix: String,
    /// Lifetime of a window's counter, counted from its creation
    pub key_ttl: Duration,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
            connect_timeout: Duration::from_secs(5),
            key_prefix: "quota".to_string(),
            key_ttl: Duration::from_secs(3600),
        }
    }
}

impl RedisConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            connect_timeout: Duration::from_secs(
                std::env::var("REDIS_CONNECT_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5),
            ),
            key_prefix: std::env::var("REDIS_KEY_PREFIX").unwrap_or_else(|_| "quota".to_string()),
            key_ttl: Duration::from_secs(
                std::env::var("RETENTION_MINUTES")
                    .ok()
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(60)
                    .max(1)
                    * 60,
            ),
        }
    }
}

/// Redis-backed usage store.
///
/// The conditional increment runs as a Lua script, so the compare and the `INCR`
/// execute as one atomic step on the server. Creation uses `SET NX`, which gives the
/// uniqueness guarantee. Counters expire on their own after `key_ttl`.
pub struct RedisUsageStore {
    conn: ConnectionManager,
    config: RedisConfig,
    /// Lua script for increment-if-below-limit
    increment: Script,
}

impl RedisUsageStore {
    pub async fn new(config: RedisConfig) -> Result<Self, StoreError> {
        let client =
            Client::open(config.url.as_str()).map_err(|e| StoreError::Connection(e.to_string()))?;

        // Use timeout to prevent hanging if Redis is unreachable
        let conn_manager_fut = ConnectionManager::new(client);
        let conn = tokio::time::timeout(config.connect_timeout, conn_manager_fut)
            .await
            .map_err(|_| StoreError::Connection("Connection timed out".to_string()))?
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        // Returns the new count, or nil when the key is missing or already at the limit
        let increment = Script::new(
            r#"
            local current = redis.call('GET', KEYS[1])
            if not current then
                return false
            end
            if tonumber(current) >= tonumber(ARGV[1]) then
                return false
            end
            return redis.call('INCR', KEYS[1])
            "#,
        );

        tracing::info!(url = %config.url, "Connected to Redis usage store");

        Ok(Self {
            conn,
            config,
            increment,
        })
    }

    /// Create from environment configuration.
    pub async fn from_env() -> Result<Self, StoreError> {
        Self::new(RedisConfig::from_env()).await
    }

    fn make_key(&self, key: &WindowKey) -> String {
        format!(
            "{}:{}:{}",
            self.config.key_prefix,
            key.identity(),
            key.window_start().timestamp()
        )
    }
}

#[async_trait]
impl UsageStore for RedisUsageStore {
    async fn conditional_increment(
        &self,
        key: &WindowKey,
        limit: u32,
    ) -> Result<Option<u32>, StoreError> {
        let redis_key = self.make_key(key);
        let mut conn = self.conn.clone();

        let count: Option<u32> = self
            .increment
            .key(&redis_key)
            .arg(limit)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        tracing::debug!(key = %redis_key, ?count, "Conditional increment");
        Ok(count)
    }

    async fn read(&self, key: &WindowKey) -> Result<Option<UsageRecord>, StoreError> {
        let mut conn = self.conn.clone();
        let count: Option<u32> = conn
            .get(self.make_key(key))
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        Ok(count.map(|count| UsageRecord::new(key.clone(), count)))
    }

    async fn create_if_absent(&self, key: &WindowKey) -> Result<CreateOutcome, StoreError> {
        let redis_key = self.make_key(key);
        let mut conn = self.conn.clone();

        let reply: Option<String> = redis::cmd("SET")
            .arg(&redis_key)
            .arg(1)
            .arg("NX")
            .arg("EX")
            .arg(self.config.key_ttl.as_secs())
            .query_async(&mut conn)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        let outcome = match reply {
            Some(_) => CreateOutcome::Created,
            None => CreateOutcome::AlreadyExists,
        };
        tracing::debug!(key = %redis_key, ?outcome, "Create if absent");
        Ok(outcome)
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    async fn get_test_store() -> Option<RedisUsageStore> {
        let config = RedisConfig {
            url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6389".to_string()),
            connect_timeout: Duration::from_secs(1),
            key_prefix: format!("test_quota_{}", std::process::id()),
            key_ttl: Duration::from_secs(5),
        };

        match RedisUsageStore::new(config).await {
            Ok(store) => Some(store),
            // CI sets REDIS_REQUIRED so these tests cannot pass vacuously.
            Err(e) if std::env::var_os("REDIS_REQUIRED").is_some() => {
                panic!("REDIS_REQUIRED is set but Redis is unreachable: {e}")
            }
            Err(e) => {
                eprintln!("Skipping test: Redis not available ({e})");
                None
            }
        }
    }

    #[tokio::test]
    async fn test_redis_primitives() {
        let Some(store) = get_test_store().await else {
            return;
        };

        let key = WindowKey::at("redis_user", Utc::now());

        assert_eq!(store.conditional_increment(&key, 2).await.unwrap(), None);
        assert!(store.read(&key).await.unwrap().is_none());

        assert_eq!(
            store.create_if_absent(&key).await.unwrap(),
            CreateOutcome::Created
        );
        assert_eq!(
            store.create_if_absent(&key).await.unwrap(),
            CreateOutcome::AlreadyExists
        );

        assert_eq!(store.conditional_increment(&key, 2).await.unwrap(), Some(2));
        assert_eq!(store.conditional_increment(&key, 2).await.unwrap(), None);
        assert_eq!(store.read(&key).await.unwrap().unwrap().count, 2);
    }

    #[tokio::test]
    async fn test_redis_increment_stops_at_limit() {
        let Some(store) = get_test_store().await else {
            return;
        };

        let key = WindowKey::at("redis_limit_user", Utc::now());
        store.create_if_absent(&key).await.unwrap();

        // Already at the limit: the script must refuse without touching the counter.
        assert_eq!(store.conditional_increment(&key, 1).await.unwrap(), None);
        assert_eq!(store.read(&key).await.unwrap().unwrap().count, 1);

        for expected in 2..=5 {
            assert_eq!(
                store.conditional_increment(&key, 5).await.unwrap(),
                Some(expected)
            );
        }
        assert_eq!(store.conditional_increment(&key, 5).await.unwrap(), None);
        assert_eq!(store.read(&key).await.unwrap().unwrap().count, 5);
    }

    #[tokio::test]
    async fn test_redis_counter_expires() {
        let Some(store) = get_test_store().await else {
            return;
        };

        let key = WindowKey::at("redis_ttl_user", Utc::now());
        store.create_if_absent(&key).await.unwrap();

        let mut conn = store.conn.clone();
        let ttl: i64 = conn.ttl(store.make_key(&key)).await.unwrap();
        assert!(ttl > 0 && ttl <= 5);
    }
}
