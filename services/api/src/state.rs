//! Application state shared across handlers

use anyhow::Result;
use common::{
    SequenceAllocator,
    cache::{RedisConfig, RedisPool, RedisSequence},
    database::{DatabaseConfig, health_check, init_pool},
    sequence::{MemorySequence, PgSequence},
};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::info;

use crate::{
    config::{AppConfig, CounterBackend, DuplicateGuard, StorageBackend},
    repositories::{Repositories, memory::MemoryStore, schema::run_migrations},
    services::{AlbumService, ShareService, permissions::AccessPolicy},
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub albums: AlbumService,
    pub shares: ShareService,
}

impl AppState {
    /// Wire the services over an already built set of stores
    pub fn new(config: AppConfig, repos: Repositories) -> Self {
        let policy = AccessPolicy::new(config.auth.admin_role_id);
        let albums = AlbumService::new(
            repos.clone(),
            policy,
            config.sharing.token_strategy,
            config.public_base_url.clone(),
        );
        let shares = ShareService::new(repos, policy, config.sharing.duplicate_guard);

        Self {
            config: Arc::new(config),
            albums,
            shares,
        }
    }

    /// Connect the configured backends and build the state
    pub async fn from_config(config: AppConfig) -> Result<Self> {
        config.storage.validate()?;

        let pool = match config.storage.backend {
            StorageBackend::Postgres => Some(connect_postgres(config.sharing.duplicate_guard).await?),
            StorageBackend::Memory => None,
        };

        let sequences: Arc<dyn SequenceAllocator> = match (config.storage.counter, &pool) {
            (CounterBackend::Postgres, Some(pool)) => Arc::new(PgSequence::new(pool.clone())),
            (CounterBackend::Redis, _) => {
                let redis = RedisPool::new(&RedisConfig::from_env()?).await?;
                if !redis.health_check().await? {
                    anyhow::bail!("Failed to connect to Redis");
                }
                Arc::new(RedisSequence::new(redis))
            }
            // remaining pairings are rejected by `StorageConfig::validate`
            _ => Arc::new(MemorySequence::new()),
        };
        info!(backend = ?config.storage.backend, counter = ?config.storage.counter, "Storage configured");

        let repos = match pool {
            Some(pool) => Repositories::postgres(pool, sequences),
            None => {
                let unique = config.sharing.duplicate_guard == DuplicateGuard::UniqueIndex;
                Repositories::memory(MemoryStore::new(unique), sequences)
            }
        };

        Ok(Self::new(config, repos))
    }
}

async fn connect_postgres(guard: DuplicateGuard) -> Result<PgPool> {
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    if health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    run_migrations(&pool, guard).await?;
    Ok(pool)
}
