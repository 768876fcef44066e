//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use yatube_core::pagination::POSTS_PER_PAGE;
use yatube_infra::JwtConfig;

#[cfg(feature = "postgres")]
use yatube_infra::DatabaseConfig;
#[cfg(feature = "redis")]
use yatube_infra::RedisConfig;

/// Seconds a rendered home page stays cached.
pub const INDEX_CACHE_SECONDS: u64 = 20;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    #[cfg(feature = "postgres")]
    pub database: Option<DatabaseConfig>,
    /// Apply pending migrations before serving.
    pub auto_migrate: bool,
    #[cfg(feature = "redis")]
    pub redis: Option<RedisConfig>,
    pub jwt: JwtConfig,
    pub posts_per_page: u64,
    pub index_cache_ttl: Duration,
}

fn parsed_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parsed_or("PORT", 8080),
            #[cfg(feature = "postgres")]
            database: DatabaseConfig::from_env(),
            auto_migrate: env::var("DB_AUTO_MIGRATE")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            #[cfg(feature = "redis")]
            redis: RedisConfig::from_env(),
            jwt: JwtConfig::from_env(),
            posts_per_page: parsed_or("POSTS_PER_PAGE", POSTS_PER_PAGE),
            index_cache_ttl: Duration::from_secs(parsed_or(
                "INDEX_CACHE_SECONDS",
                INDEX_CACHE_SECONDS,
            )),
        }
    }
}

impl Default for AppConfig {
    /// In-memory everything; what the test suite runs against.
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            #[cfg(feature = "postgres")]
            database: None,
            auto_migrate: false,
            #[cfg(feature = "redis")]
            redis: None,
            jwt: JwtConfig::default(),
            posts_per_page: POSTS_PER_PAGE,
            index_cache_ttl: Duration::from_secs(INDEX_CACHE_SECONDS),
        }
    }
}
