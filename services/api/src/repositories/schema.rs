//! Idempotent schema bootstrap for the Postgres backend

use common::database::apply_schema;
use common::error::DatabaseResult;
use sqlx::PgPool;
use tracing::info;

use crate::config::DuplicateGuard;

/// Counter behind `albums.albums_id`
pub const ALBUMS_SEQUENCE: &str = "albums";
/// Counter behind the `ALB000001` style album numbers
pub const ALBUM_NO_SEQUENCE: &str = "album_no";
pub const ALBUM_SHARES_SEQUENCE: &str = "album_shares";
pub const ACTIVITY_SEQUENCE: &str = "activity_feed";

/// Name of the optional unique index on (user_id, album_ref)
pub const SHARE_UNIQUE_INDEX: &str = "idx_album_shares_user_album_unique";

const TABLES: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        user_id BIGINT PRIMARY KEY,
        name TEXT NOT NULL,
        studio_name TEXT,
        email TEXT NOT NULL,
        mobile TEXT,
        role_id BIGINT NOT NULL,
        status BOOLEAN NOT NULL DEFAULT TRUE,
        login_permission BOOLEAN NOT NULL DEFAULT TRUE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS event_types (
        event_type_id BIGINT PRIMARY KEY,
        event_type TEXT NOT NULL,
        status BOOLEAN NOT NULL DEFAULT TRUE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS albums (
        id UUID PRIMARY KEY,
        albums_id BIGINT NOT NULL UNIQUE,
        photographer_id BIGINT NOT NULL,
        album_title VARCHAR(200) NOT NULL,
        event_type_id BIGINT NOT NULL,
        event_date DATE NOT NULL,
        client_name VARCHAR(100) NOT NULL,
        client_contact_no VARCHAR(10) NOT NULL,
        album_no TEXT NOT NULL,
        shaplink TEXT NOT NULL,
        album_orientation TEXT NOT NULL DEFAULT 'Portrait',
        file_type TEXT NOT NULL DEFAULT 'Standard Flip',
        number_of_pages INTEGER NOT NULL CHECK (number_of_pages >= 1),
        upload_images TEXT[] NOT NULL DEFAULT '{}',
        upload_songs TEXT[] NOT NULL DEFAULT '{}',
        reorder_images TEXT[] NOT NULL DEFAULT '{}',
        cover_photo TEXT,
        generate_qr_code BOOLEAN NOT NULL DEFAULT FALSE,
        set_expiry_date TIMESTAMPTZ,
        enable_downloads BOOLEAN NOT NULL DEFAULT FALSE,
        password_protect TEXT,
        add_watermark TEXT,
        add_logo TEXT,
        status BOOLEAN NOT NULL DEFAULT TRUE,
        created_by BIGINT,
        updated_by BIGINT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_albums_album_no ON albums (album_no)",
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_albums_shaplink ON albums (shaplink)",
    "CREATE INDEX IF NOT EXISTS idx_albums_photographer ON albums (photographer_id)",
    r#"
    CREATE TABLE IF NOT EXISTS album_shares (
        album_share_id BIGINT PRIMARY KEY,
        user_id BIGINT NOT NULL,
        album_ref UUID NOT NULL REFERENCES albums (id),
        shared_by TEXT NOT NULL,
        description VARCHAR(500),
        accept_share TEXT NOT NULL DEFAULT 'Pending'
            CHECK (accept_share IN ('Pending', 'Accepted', 'Rejected')),
        status BOOLEAN NOT NULL DEFAULT TRUE,
        created_by BIGINT,
        updated_by BIGINT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_album_shares_user_album ON album_shares (user_id, album_ref)",
    r#"
    CREATE TABLE IF NOT EXISTS activity_feed (
        activity_id BIGINT PRIMARY KEY,
        user_id BIGINT NOT NULL,
        emoji VARCHAR(10),
        activity VARCHAR(500) NOT NULL,
        status BOOLEAN NOT NULL DEFAULT TRUE,
        updated_by BIGINT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    "CREATE SEQUENCE IF NOT EXISTS albums_seq",
    "CREATE SEQUENCE IF NOT EXISTS album_no_seq",
    "CREATE SEQUENCE IF NOT EXISTS album_shares_seq",
    "CREATE SEQUENCE IF NOT EXISTS activity_feed_seq",
];

const UNIQUE_SHARE_INDEX: &str = "CREATE UNIQUE INDEX IF NOT EXISTS idx_album_shares_user_album_unique ON album_shares (user_id, album_ref)";

/// Statements to apply for the given duplicate-share guard
pub fn statements(guard: DuplicateGuard) -> Vec<&'static str> {
    let mut statements = TABLES.to_vec();
    if guard == DuplicateGuard::UniqueIndex {
        statements.push(UNIQUE_SHARE_INDEX);
    }
    statements
}

/// Create tables, indexes and sequences that do not exist yet
pub async fn run_migrations(pool: &PgPool, guard: DuplicateGuard) -> DatabaseResult<()> {
    info!(?guard, "Running album schema migrations");
    apply_schema(pool, &statements(guard)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_share_index_only_in_hardened_mode() {
        let check = statements(DuplicateGuard::Check);
        let hardened = statements(DuplicateGuard::UniqueIndex);

        assert!(!check.iter().any(|s| s.contains(SHARE_UNIQUE_INDEX)));
        assert_eq!(hardened.len(), check.len() + 1);
        assert!(hardened.last().is_some_and(|s| s.contains(SHARE_UNIQUE_INDEX)));
    }

    #[test]
    fn test_every_counter_has_a_sequence() {
        let check = statements(DuplicateGuard::Check);
        for sequence in [
            ALBUMS_SEQUENCE,
            ALBUM_NO_SEQUENCE,
            ALBUM_SHARES_SEQUENCE,
            ACTIVITY_SEQUENCE,
        ] {
            let ddl = format!("CREATE SEQUENCE IF NOT EXISTS {}_seq", sequence);
            assert!(check.iter().any(|s| *s == ddl), "missing {}", ddl);
        }
    }
}
