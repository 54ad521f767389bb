//! Integration tests for the storage infrastructure
//!
//! These need a live PostgreSQL and Redis (see `DATABASE_URL` and
//! `REDIS_URL`), so they are ignored by default.

use common::{
    cache::{RedisConfig, RedisPool, RedisSequence},
    database::{DatabaseConfig, apply_schema, health_check, init_pool},
    sequence::{PgSequence, SequenceAllocator},
};
use sqlx::Row;

#[tokio::test]
#[ignore = "requires running PostgreSQL and Redis"]
async fn test_infrastructure_integration() -> Result<(), Box<dyn std::error::Error>> {
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;
    assert!(health_check(&pool).await?, "Database health check failed");

    let row = sqlx::query("SELECT 1 as result").fetch_one(&pool).await?;
    let result: i32 = row.get("result");
    assert_eq!(result, 1);

    let redis_config = RedisConfig::from_env()?;
    let redis_pool = RedisPool::new(&redis_config).await?;
    assert!(redis_pool.health_check().await?, "Redis health check failed");

    let sequence = RedisSequence::new(redis_pool);
    let first = sequence.next_value("integration_health").await?;
    assert!(first >= 1);

    Ok(())
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn test_pg_sequence_is_monotonic() -> Result<(), Box<dyn std::error::Error>> {
    let pool = init_pool(&DatabaseConfig::from_env()?).await?;
    apply_schema(
        &pool,
        &["CREATE SEQUENCE IF NOT EXISTS integration_counter_seq START 1"],
    )
    .await?;

    let sequence = PgSequence::new(pool.clone());
    let first = sequence.next_value("integration_counter").await?;
    let second = sequence.next_value("integration_counter").await?;
    assert!(second > first);

    sqlx::query("DROP SEQUENCE IF EXISTS integration_counter_seq")
        .execute(&pool)
        .await?;
    Ok(())
}

#[tokio::test]
#[ignore = "requires a running Redis"]
async fn test_redis_sequence_is_monotonic() -> Result<(), Box<dyn std::error::Error>> {
    let redis_pool = RedisPool::new(&RedisConfig::from_env()?).await?;

    let sequence = RedisSequence::new(redis_pool);
    let first = sequence.next_value("integration_counter").await?;
    assert_eq!(sequence.next_value("integration_counter").await?, first + 1);
    Ok(())
}
