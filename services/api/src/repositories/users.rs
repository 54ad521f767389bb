//! User and event type lookups

use async_trait::async_trait;
use common::error::{DatabaseError, DatabaseResult};
use sqlx::{PgPool, Row};

use super::{EventTypeStore, UserStore};
use crate::models::user::{EventType, User};

/// User repository for database operations
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn find_user(&self, user_id: i64) -> DatabaseResult<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT user_id, name, studio_name, email, mobile, role_id, status,
                   login_permission, created_at, updated_at
            FROM users
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        Ok(row.map(|row| User {
            user_id: row.get("user_id"),
            name: row.get("name"),
            studio_name: row.get("studio_name"),
            email: row.get("email"),
            mobile: row.get("mobile"),
            role_id: row.get("role_id"),
            status: row.get("status"),
            login_permission: row.get("login_permission"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        }))
    }
}

/// Event type repository for database operations
#[derive(Clone)]
pub struct EventTypeRepository {
    pool: PgPool,
}

impl EventTypeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventTypeStore for EventTypeRepository {
    async fn find_event_type(&self, event_type_id: i64) -> DatabaseResult<Option<EventType>> {
        let row = sqlx::query(
            r#"
            SELECT event_type_id, event_type, status
            FROM event_types
            WHERE event_type_id = $1
            "#,
        )
        .bind(event_type_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        Ok(row.map(|row| EventType {
            event_type_id: row.get("event_type_id"),
            event_type: row.get("event_type"),
            status: row.get("status"),
        }))
    }
}
