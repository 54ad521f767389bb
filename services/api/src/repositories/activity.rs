//! Activity feed persistence

use async_trait::async_trait;
use common::error::{DatabaseError, DatabaseResult};
use sqlx::PgPool;

use super::ActivityStore;
use crate::models::activity::ActivityEntry;

#[derive(Clone)]
pub struct ActivityRepository {
    pool: PgPool,
}

impl ActivityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ActivityStore for ActivityRepository {
    async fn insert_activity(&self, entry: &ActivityEntry) -> DatabaseResult<()> {
        sqlx::query(
            r#"
            INSERT INTO activity_feed
                (activity_id, user_id, emoji, activity, status, updated_by, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(entry.activity_id)
        .bind(entry.user_id)
        .bind(&entry.emoji)
        .bind(&entry.activity)
        .bind(entry.status)
        .bind(entry.updated_by)
        .bind(entry.created_at)
        .bind(entry.updated_at)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        Ok(())
    }
}
