//! Redis cache module for the studio albums backend
//!
//! This module provides the Redis client with its health check, and a Redis
//! `INCR` backed sequence allocator.

use anyhow::Result;
use async_trait::async_trait;
use redis::{AsyncCommands, Client};
use tracing::info;

use crate::error::DatabaseResult;
use crate::sequence::SequenceAllocator;

/// Configuration for Redis connection
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis connection URL (e.g., "redis://localhost:6379")
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
}

impl RedisConfig {
    /// Create a new RedisConfig from environment variables
    ///
    /// # Environment Variables
    /// - `REDIS_URL`: Redis connection URL (default: "redis://localhost:6379")
    /// - `REDIS_MAX_CONNECTIONS`: Maximum number of connections (default: 10)
    pub fn from_env() -> Result<Self> {
        let url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());
        let max_connections = std::env::var("REDIS_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .unwrap_or(10);

        Ok(RedisConfig {
            url,
            max_connections,
        })
    }
}

/// Redis connection pool
#[derive(Clone)]
pub struct RedisPool {
    client: Client,
}

impl RedisPool {
    /// Initialize a new Redis connection pool
    pub async fn new(config: &RedisConfig) -> Result<Self> {
        let client = Client::open(config.url.clone())?;
        info!("Redis client initialized with URL: {}", config.url);
        Ok(RedisPool { client })
    }

    /// Get a connection from the pool
    async fn get_connection(&self) -> redis::RedisResult<redis::aio::MultiplexedConnection> {
        self.client.get_multiplexed_async_connection().await
    }

    /// Check if Redis is reachable
    pub async fn health_check(&self) -> Result<bool> {
        let mut conn = self.get_connection().await?;
        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(pong == "PONG")
    }
}

/// Sequence allocator backed by Redis `INCR` on `sequence:<name>` keys
#[derive(Clone)]
pub struct RedisSequence {
    pool: RedisPool,
}

impl RedisSequence {
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }

    fn key(sequence: &str) -> String {
        format!("sequence:{}", sequence)
    }
}

#[async_trait]
impl SequenceAllocator for RedisSequence {
    async fn next_value(&self, sequence: &str) -> DatabaseResult<i64> {
        let mut conn = self.pool.get_connection().await?;
        let value: i64 = conn.incr(Self::key(sequence), 1).await?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_key_format() {
        assert_eq!(RedisSequence::key("album_no"), "sequence:album_no");
    }

    #[tokio::test]
    #[ignore = "requires a running Redis"]
    async fn test_redis_connection() -> Result<()> {
        let config = RedisConfig {
            url: "redis://localhost:6379".to_string(),
            max_connections: 10,
        };

        let pool = RedisPool::new(&config).await?;
        assert!(pool.health_check().await?);
        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a running Redis"]
    async fn test_redis_sequence_increments() -> Result<()> {
        let config = RedisConfig {
            url: "redis://localhost:6379".to_string(),
            max_connections: 10,
        };

        let pool = RedisPool::new(&config).await?;
        let sequence = RedisSequence::new(pool);
        let first = sequence.next_value("test_albums").await?;
        assert_eq!(sequence.next_value("test_albums").await?, first + 1);

        Ok(())
    }
}
