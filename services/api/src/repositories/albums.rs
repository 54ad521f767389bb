//! Album repository for database operations

use async_trait::async_trait;
use common::error::{DatabaseError, DatabaseResult};
use sqlx::{PgPool, Postgres, QueryBuilder, Row, postgres::PgRow};
use uuid::Uuid;

use super::AlbumStore;
use crate::models::{
    album::{Album, AlbumFilter},
    pagination::PageRequest,
};

const ALBUM_COLUMNS: &str = r#"
    id, albums_id, photographer_id, album_title, event_type_id, event_date,
    client_name, client_contact_no, album_no, shaplink, album_orientation,
    file_type, number_of_pages, upload_images, upload_songs, reorder_images,
    cover_photo, generate_qr_code, set_expiry_date, enable_downloads,
    password_protect, add_watermark, add_logo, status, created_by, updated_by,
    created_at, updated_at
"#;

/// Album repository for database operations
#[derive(Clone)]
pub struct AlbumRepository {
    pool: PgPool,
}

impl AlbumRepository {
    /// Create a new album repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_one(&self, column: &str, bind: AlbumKey<'_>) -> DatabaseResult<Option<Album>> {
        let sql = format!("SELECT {} FROM albums WHERE {} = $1", ALBUM_COLUMNS, column);
        let query = sqlx::query(&sql);
        let query = match bind {
            AlbumKey::Number(n) => query.bind(n),
            AlbumKey::Ref(id) => query.bind(id),
            AlbumKey::Shaplink(s) => query.bind(s),
        };

        let row = query
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        row.as_ref().map(album_from_row).transpose()
    }
}

enum AlbumKey<'a> {
    Number(i64),
    Ref(Uuid),
    Shaplink(&'a str),
}

fn decode_error(err: impl std::error::Error + Send + Sync + 'static) -> DatabaseError {
    DatabaseError::Query(sqlx::Error::Decode(Box::new(err)))
}

fn album_from_row(row: &PgRow) -> DatabaseResult<Album> {
    let orientation: String = row.get("album_orientation");
    let file_type: String = row.get("file_type");

    Ok(Album {
        id: row.get("id"),
        albums_id: row.get("albums_id"),
        photographer_id: row.get("photographer_id"),
        album_title: row.get("album_title"),
        event_type_id: row.get("event_type_id"),
        event_date: row.get("event_date"),
        client_name: row.get("client_name"),
        client_contact_no: row.get("client_contact_no"),
        album_no: row.get("album_no"),
        shaplink: row.get("shaplink"),
        album_orientation: orientation.parse().map_err(decode_error)?,
        file_type: file_type.parse().map_err(decode_error)?,
        number_of_pages: row.get("number_of_pages"),
        upload_images: row.get("upload_images"),
        upload_songs: row.get("upload_songs"),
        reorder_images: row.get("reorder_images"),
        cover_photo: row.get("cover_photo"),
        generate_qr_code: row.get("generate_qr_code"),
        set_expiry_date: row.get("set_expiry_date"),
        enable_downloads: row.get("enable_downloads"),
        password_protect: row.get("password_protect"),
        add_watermark: row.get("add_watermark"),
        add_logo: row.get("add_logo"),
        status: row.get("status"),
        created_by: row.get("created_by"),
        updated_by: row.get("updated_by"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

/// Escape `LIKE` wildcards so the needle matches literally
fn escape_like(needle: &str) -> String {
    needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &AlbumFilter) {
    builder.push(" WHERE TRUE");

    if let Some(event_type_id) = filter.event_type_id {
        builder.push(" AND event_type_id = ").push_bind(event_type_id);
    }
    if let Some(orientation) = filter.album_orientation {
        builder
            .push(" AND album_orientation = ")
            .push_bind(orientation.as_str());
    }
    if let Some(file_type) = filter.file_type {
        builder.push(" AND file_type = ").push_bind(file_type.as_str());
    }
    if let Some(status) = filter.status {
        builder.push(" AND status = ").push_bind(status);
    }
    if let Some(title) = &filter.title_contains {
        builder
            .push(" AND album_title ILIKE ")
            .push_bind(format!("%{}%", escape_like(title)));
    }
    if let Some(from) = filter.event_date_from {
        builder.push(" AND event_date >= ").push_bind(from);
    }
    if let Some(to) = filter.event_date_to {
        builder.push(" AND event_date <= ").push_bind(to);
    }
    if let Some(scope) = &filter.owned_or_shared {
        builder
            .push(" AND (photographer_id = ")
            .push_bind(scope.owner_id)
            .push(" OR id = ANY(")
            .push_bind(scope.album_refs.clone())
            .push("))");
    }
}

#[async_trait]
impl AlbumStore for AlbumRepository {
    async fn insert_album(&self, album: &Album) -> DatabaseResult<()> {
        sqlx::query(
            r#"
            INSERT INTO albums (
                id, albums_id, photographer_id, album_title, event_type_id, event_date,
                client_name, client_contact_no, album_no, shaplink, album_orientation,
                file_type, number_of_pages, upload_images, upload_songs, reorder_images,
                cover_photo, generate_qr_code, set_expiry_date, enable_downloads,
                password_protect, add_watermark, add_logo, status, created_by, updated_by,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                    $15, $16, $17, $18, $19, $20, $21, $22, $23, $24, $25, $26, $27, $28)
            "#,
        )
        .bind(album.id)
        .bind(album.albums_id)
        .bind(album.photographer_id)
        .bind(&album.album_title)
        .bind(album.event_type_id)
        .bind(album.event_date)
        .bind(&album.client_name)
        .bind(&album.client_contact_no)
        .bind(&album.album_no)
        .bind(&album.shaplink)
        .bind(album.album_orientation.as_str())
        .bind(album.file_type.as_str())
        .bind(album.number_of_pages)
        .bind(&album.upload_images)
        .bind(&album.upload_songs)
        .bind(&album.reorder_images)
        .bind(&album.cover_photo)
        .bind(album.generate_qr_code)
        .bind(album.set_expiry_date)
        .bind(album.enable_downloads)
        .bind(&album.password_protect)
        .bind(&album.add_watermark)
        .bind(&album.add_logo)
        .bind(album.status)
        .bind(album.created_by)
        .bind(album.updated_by)
        .bind(album.created_at)
        .bind(album.updated_at)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        Ok(())
    }

    async fn update_album(&self, album: &Album) -> DatabaseResult<()> {
        sqlx::query(
            r#"
            UPDATE albums SET
                album_title = $2, event_type_id = $3, event_date = $4, client_name = $5,
                client_contact_no = $6, album_orientation = $7, file_type = $8,
                number_of_pages = $9, upload_images = $10, upload_songs = $11,
                reorder_images = $12, cover_photo = $13, generate_qr_code = $14,
                set_expiry_date = $15, enable_downloads = $16, password_protect = $17,
                add_watermark = $18, add_logo = $19, status = $20, updated_by = $21,
                updated_at = $22
            WHERE id = $1
            "#,
        )
        .bind(album.id)
        .bind(&album.album_title)
        .bind(album.event_type_id)
        .bind(album.event_date)
        .bind(&album.client_name)
        .bind(&album.client_contact_no)
        .bind(album.album_orientation.as_str())
        .bind(album.file_type.as_str())
        .bind(album.number_of_pages)
        .bind(&album.upload_images)
        .bind(&album.upload_songs)
        .bind(&album.reorder_images)
        .bind(&album.cover_photo)
        .bind(album.generate_qr_code)
        .bind(album.set_expiry_date)
        .bind(album.enable_downloads)
        .bind(&album.password_protect)
        .bind(&album.add_watermark)
        .bind(&album.add_logo)
        .bind(album.status)
        .bind(album.updated_by)
        .bind(album.updated_at)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        Ok(())
    }

    async fn find_album(&self, albums_id: i64) -> DatabaseResult<Option<Album>> {
        self.find_one("albums_id", AlbumKey::Number(albums_id)).await
    }

    async fn find_album_by_ref(&self, id: Uuid) -> DatabaseResult<Option<Album>> {
        self.find_one("id", AlbumKey::Ref(id)).await
    }

    async fn find_album_by_shaplink(&self, shaplink: &str) -> DatabaseResult<Option<Album>> {
        self.find_one("shaplink", AlbumKey::Shaplink(shaplink)).await
    }

    async fn list_albums(
        &self,
        filter: &AlbumFilter,
        page: &PageRequest,
    ) -> DatabaseResult<(Vec<Album>, u64)> {
        let mut query = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM albums", ALBUM_COLUMNS));
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

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM albums");
        push_filter(&mut count, filter);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        let albums = rows
            .iter()
            .map(album_from_row)
            .collect::<DatabaseResult<Vec<_>>>()?;

        Ok((albums, total.max(0) as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("Wedding"), "Wedding");
    }

    #[test]
    fn test_filter_sql() {
        let filter = AlbumFilter {
            event_type_id: Some(2),
            title_contains: Some("wed".to_string()),
            ..AlbumFilter::default()
        };
        let mut query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM albums");
        push_filter(&mut query, &filter);
        assert_eq!(
            query.sql(),
            "SELECT COUNT(*) FROM albums WHERE TRUE AND event_type_id = $1 AND album_title ILIKE $2"
        );
    }
}
