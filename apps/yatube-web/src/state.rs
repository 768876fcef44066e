//! Application state - shared across all handlers.

use std::sync::Arc;

use yatube_core::Paginator;
use yatube_core::ports::{Cache, PasswordService, Repositories, TokenService};
use yatube_core::services::{AccountService, FollowService, GroupService, PostService};
use yatube_infra::{Argon2PasswordService, InMemoryCache, InMemoryStore, JwtTokenService};

#[cfg(feature = "postgres")]
use yatube_infra::DatabaseConnections;
#[cfg(feature = "postgres")]
use yatube_infra::database::postgres_repositories;
#[cfg(feature = "redis")]
use yatube_infra::RedisCache;

use crate::config::AppConfig;
use crate::page_cache::HomePageCache;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub posts: PostService,
    pub groups: GroupService,
    pub follows: FollowService,
    pub accounts: AccountService,
    pub tokens: Arc<dyn TokenService>,
    pub page_cache: HomePageCache,
    #[cfg(feature = "postgres")]
    pub db: Option<Arc<DatabaseConnections>>,
}

impl AppState {
    /// Build the application state, falling back to in-memory backends
    /// for anything that is not configured or not reachable.
    pub async fn new(config: &AppConfig) -> Self {
        #[cfg(feature = "postgres")]
        let (db, repos) = Self::init_database(config).await;

        #[cfg(not(feature = "postgres"))]
        let repos = {
            tracing::info!("Running without postgres feature - using in-memory store");
            InMemoryStore::new().repositories()
        };

        let cache = Self::init_cache(config).await;
        let passwords: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());

        let state = Self::assemble(config, repos, passwords, cache);

        tracing::info!("Application state initialized");

        #[cfg(feature = "postgres")]
        let state = Self { db, ..state };

        state
    }

    /// Wire services over the given backends.
    pub fn assemble(
        config: &AppConfig,
        repos: Repositories,
        passwords: Arc<dyn PasswordService>,
        cache: Arc<dyn Cache>,
    ) -> Self {
        let paginator = Paginator::new(config.posts_per_page);
        Self {
            posts: PostService::new(repos.clone(), paginator),
            groups: GroupService::new(repos.clone(), paginator),
            follows: FollowService::new(repos.clone(), paginator),
            accounts: AccountService::new(repos, passwords),
            tokens: Arc::new(JwtTokenService::new(config.jwt.clone())),
            page_cache: HomePageCache::new(cache, config.index_cache_ttl),
            #[cfg(feature = "postgres")]
            db: None,
        }
    }

    #[cfg(feature = "postgres")]
    async fn init_database(config: &AppConfig) -> (Option<Arc<DatabaseConnections>>, Repositories) {
        use migration::MigratorTrait;

        let Some(db_config) = config.database.as_ref() else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            return (None, InMemoryStore::new().repositories());
        };

        match DatabaseConnections::init(db_config).await {
            Ok(connections) => {
                if config.auto_migrate {
                    if let Err(e) = migration::Migrator::up(&connections.main, None).await {
                        tracing::error!("Failed to apply migrations: {}", e);
                    } else {
                        tracing::info!("Migrations applied");
                    }
                }
                let repos = postgres_repositories(connections.main.clone());
                (Some(Arc::new(connections)), repos)
            }
            Err(e) => {
                tracing::error!(
                    "Failed to connect to database: {}. Using in-memory fallback.",
                    e
                );
                (None, InMemoryStore::new().repositories())
            }
        }
    }

    async fn init_cache(config: &AppConfig) -> Arc<dyn Cache> {
        #[cfg(feature = "redis")]
        if let Some(redis_config) = config.redis.clone() {
            match RedisCache::new(redis_config).await {
                Ok(cache) => return Arc::new(cache),
                Err(e) => {
                    tracing::warn!("Redis unavailable: {}. Using in-memory cache.", e);
                }
            }
        }

        #[cfg(not(feature = "redis"))]
        let _ = config;

        Arc::new(InMemoryCache::new())
    }
}
