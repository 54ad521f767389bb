//! Repositories for database operations
//!
//! Each entity has a store trait with a Postgres implementation and an
//! in-memory one. Handlers and services only see the traits.

use async_trait::async_trait;
use common::SequenceAllocator;
use common::error::DatabaseResult;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::models::{
    activity::ActivityEntry,
    album::{Album, AlbumFilter},
    pagination::PageRequest,
    share::{AlbumShare, ShareFilter},
    user::{EventType, User},
};

pub mod activity;
pub mod albums;
pub mod memory;
pub mod schema;
pub mod shares;
pub mod users;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user(&self, user_id: i64) -> DatabaseResult<Option<User>>;
}

#[async_trait]
pub trait EventTypeStore: Send + Sync {
    async fn find_event_type(&self, event_type_id: i64) -> DatabaseResult<Option<EventType>>;
}

#[async_trait]
pub trait AlbumStore: Send + Sync {
    /// Fails with `UniqueViolation` when the album number or share token is taken
    async fn insert_album(&self, album: &Album) -> DatabaseResult<()>;

    /// Persist the mutable fields of an existing album
    async fn update_album(&self, album: &Album) -> DatabaseResult<()>;

    async fn find_album(&self, albums_id: i64) -> DatabaseResult<Option<Album>>;

    async fn find_album_by_ref(&self, id: Uuid) -> DatabaseResult<Option<Album>>;

    async fn find_album_by_shaplink(&self, shaplink: &str) -> DatabaseResult<Option<Album>>;

    /// One page of matching albums, newest first, with the total match count
    async fn list_albums(
        &self,
        filter: &AlbumFilter,
        page: &PageRequest,
    ) -> DatabaseResult<(Vec<Album>, u64)>;
}

#[async_trait]
pub trait ShareStore: Send + Sync {
    async fn insert_share(&self, share: &AlbumShare) -> DatabaseResult<()>;

    async fn update_share(&self, share: &AlbumShare) -> DatabaseResult<()>;

    async fn find_share(&self, album_share_id: i64) -> DatabaseResult<Option<AlbumShare>>;

    /// Oldest share a user holds on an album, whatever its state
    async fn find_share_for(
        &self,
        user_id: i64,
        album_ref: Uuid,
    ) -> DatabaseResult<Option<AlbumShare>>;

    /// All matching shares, newest first
    async fn find_shares(&self, filter: &ShareFilter) -> DatabaseResult<Vec<AlbumShare>>;

    async fn list_shares(
        &self,
        filter: &ShareFilter,
        page: &PageRequest,
    ) -> DatabaseResult<(Vec<AlbumShare>, u64)>;
}

#[async_trait]
pub trait ActivityStore: Send + Sync {
    async fn insert_activity(&self, entry: &ActivityEntry) -> DatabaseResult<()>;
}

/// Store handles shared by the services
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserStore>,
    pub event_types: Arc<dyn EventTypeStore>,
    pub albums: Arc<dyn AlbumStore>,
    pub shares: Arc<dyn ShareStore>,
    pub activity: Arc<dyn ActivityStore>,
    pub sequences: Arc<dyn SequenceAllocator>,
}

impl Repositories {
    /// Postgres-backed stores sharing one pool
    pub fn postgres(pool: PgPool, sequences: Arc<dyn SequenceAllocator>) -> Self {
        Self {
            users: Arc::new(users::UserRepository::new(pool.clone())),
            event_types: Arc::new(users::EventTypeRepository::new(pool.clone())),
            albums: Arc::new(albums::AlbumRepository::new(pool.clone())),
            shares: Arc::new(shares::ShareRepository::new(pool.clone())),
            activity: Arc::new(activity::ActivityRepository::new(pool)),
            sequences,
        }
    }

    /// Every store backed by the same in-memory tables
    pub fn memory(store: memory::MemoryStore, sequences: Arc<dyn SequenceAllocator>) -> Self {
        Self {
            users: Arc::new(store.clone()),
            event_types: Arc::new(store.clone()),
            albums: Arc::new(store.clone()),
            shares: Arc::new(store.clone()),
            activity: Arc::new(store),
            sequences,
        }
    }
}
