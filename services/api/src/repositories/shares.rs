//! Album share repository for database operations

use async_trait::async_trait;
use common::error::{DatabaseError, DatabaseResult};
use sqlx::{PgPool, Postgres, QueryBuilder, Row, postgres::PgRow};
use uuid::Uuid;

use super::ShareStore;
use crate::models::{
    pagination::PageRequest,
    share::{AlbumShare, ShareFilter},
};

const SHARE_COLUMNS: &str = r#"
    album_share_id, user_id, album_ref, shared_by, description, accept_share,
    status, created_by, updated_by, created_at, updated_at
"#;

/// Album share repository for database operations
#[derive(Clone)]
pub struct ShareRepository {
    pool: PgPool,
}

impl ShareRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn share_from_row(row: &PgRow) -> DatabaseResult<AlbumShare> {
    let shared_by: String = row.get("shared_by");
    let accept_share: String = row.get("accept_share");

    Ok(AlbumShare {
        album_share_id: row.get("album_share_id"),
        user_id: row.get("user_id"),
        album_ref: row.get("album_ref"),
        shared_by: shared_by
            .parse()
            .map_err(|e| DatabaseError::Query(sqlx::Error::Decode(Box::new(e))))?,
        description: row.get("description"),
        accept_share: accept_share
            .parse()
            .map_err(|e| DatabaseError::Query(sqlx::Error::Decode(Box::new(e))))?,
        status: row.get("status"),
        created_by: row.get("created_by"),
        updated_by: row.get("updated_by"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &ShareFilter) {
    builder.push(" WHERE TRUE");

    if let Some(user_id) = filter.user_id {
        builder.push(" AND user_id = ").push_bind(user_id);
    }
    if let Some(album_ref) = filter.album_ref {
        builder.push(" AND album_ref = ").push_bind(album_ref);
    }
    if let Some(status) = filter.status {
        builder.push(" AND status = ").push_bind(status);
    }
    if let Some(accept_share) = filter.accept_share {
        builder
            .push(" AND accept_share = ")
            .push_bind(accept_share.as_str());
    }
}

#[async_trait]
impl ShareStore for ShareRepository {
    async fn insert_share(&self, share: &AlbumShare) -> DatabaseResult<()> {
        sqlx::query(
            r#"
            INSERT INTO album_shares (
                album_share_id, user_id, album_ref, shared_by, description, accept_share,
                status, created_by, updated_by, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(share.album_share_id)
        .bind(share.user_id)
        .bind(share.album_ref)
        .bind(share.shared_by.as_str())
        .bind(&share.description)
        .bind(share.accept_share.as_str())
        .bind(share.status)
        .bind(share.created_by)
        .bind(share.updated_by)
        .bind(share.created_at)
        .bind(share.updated_at)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        Ok(())
    }

    async fn update_share(&self, share: &AlbumShare) -> DatabaseResult<()> {
        sqlx::query(
            r#"
            UPDATE album_shares
            SET description = $2, accept_share = $3, status = $4, updated_by = $5,
                updated_at = $6
            WHERE album_share_id = $1
            "#,
        )
        .bind(share.album_share_id)
        .bind(&share.description)
        .bind(share.accept_share.as_str())
        .bind(share.status)
        .bind(share.updated_by)
        .bind(share.updated_at)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        Ok(())
    }

    async fn find_share(&self, album_share_id: i64) -> DatabaseResult<Option<AlbumShare>> {
        let sql = format!(
            "SELECT {} FROM album_shares WHERE album_share_id = $1",
            SHARE_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(album_share_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        row.as_ref().map(share_from_row).transpose()
    }

    async fn find_share_for(
        &self,
        user_id: i64,
        album_ref: Uuid,
    ) -> DatabaseResult<Option<AlbumShare>> {
        let sql = format!(
            "SELECT {} FROM album_shares WHERE user_id = $1 AND album_ref = $2 \
             ORDER BY created_at ASC LIMIT 1",
            SHARE_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(user_id)
            .bind(album_ref)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        row.as_ref().map(share_from_row).transpose()
    }

    async fn find_shares(&self, filter: &ShareFilter) -> DatabaseResult<Vec<AlbumShare>> {
        let mut query =
            QueryBuilder::<Postgres>::new(format!("SELECT {} FROM album_shares", SHARE_COLUMNS));
        push_filter(&mut query, filter);
        query.push(" ORDER BY created_at DESC");

        let rows = query
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        rows.iter().map(share_from_row).collect()
    }

    async fn list_shares(
        &self,
        filter: &ShareFilter,
        page: &PageRequest,
    ) -> DatabaseResult<(Vec<AlbumShare>, u64)> {
        let mut query =
            QueryBuilder::<Postgres>::new(format!("SELECT {} FROM album_shares", SHARE_COLUMNS));
        push_filter(&mut query, filter);
        query
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(page.limit as i64)
            .push(" OFFSET ")
            .push_bind(page.offset() as i64);

        let rows = query
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM album_shares");
        push_filter(&mut count, filter);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        let shares = rows
            .iter()
            .map(share_from_row)
            .collect::<DatabaseResult<Vec<_>>>()?;

        Ok((shares, total.max(0) as u64))
    }
}
