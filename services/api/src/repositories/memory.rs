//! In-process store backend
//!
//! Keeps every entity in memory behind one async lock. Used for local runs
//! without Postgres and by the HTTP tests.

use async_trait::async_trait;
use common::error::{DatabaseError, DatabaseResult};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ActivityStore, AlbumStore, EventTypeStore, ShareStore, UserStore};
use crate::models::{
    activity::ActivityEntry,
    album::{Album, AlbumFilter},
    pagination::PageRequest,
    share::{AlbumShare, ShareFilter},
    user::{EventType, User},
};

#[derive(Default)]
struct Tables {
    users: HashMap<i64, User>,
    event_types: HashMap<i64, EventType>,
    albums: HashMap<Uuid, Album>,
    shares: HashMap<i64, AlbumShare>,
    activity: Vec<ActivityEntry>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
    unique_shares: bool,
}

impl MemoryStore {
    /// `unique_shares` rejects a second share for the same user and album
    /// the way the Postgres unique index does
    pub fn new(unique_shares: bool) -> Self {
        Self {
            tables: Arc::default(),
            unique_shares,
        }
    }

    pub async fn add_user(&self, user: User) {
        self.tables.write().await.users.insert(user.user_id, user);
    }

    pub async fn add_event_type(&self, event_type: EventType) {
        self.tables
            .write()
            .await
            .event_types
            .insert(event_type.event_type_id, event_type);
    }

    #[cfg(test)]
    pub async fn activity(&self) -> Vec<ActivityEntry> {
        self.tables.read().await.activity.clone()
    }
}

fn paginate<T>(mut items: Vec<T>, page: &PageRequest) -> (Vec<T>, u64) {
    let total = items.len() as u64;
    let start = (page.offset() as usize).min(items.len());
    let end = (start + page.limit as usize).min(items.len());
    (items.drain(start..end).collect(), total)
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user(&self, user_id: i64) -> DatabaseResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&user_id).cloned())
    }
}

#[async_trait]
impl EventTypeStore for MemoryStore {
    async fn find_event_type(&self, event_type_id: i64) -> DatabaseResult<Option<EventType>> {
        Ok(self
            .tables
            .read()
            .await
            .event_types
            .get(&event_type_id)
            .cloned())
    }
}

#[async_trait]
impl AlbumStore for MemoryStore {
    async fn insert_album(&self, album: &Album) -> DatabaseResult<()> {
        let mut tables = self.tables.write().await;
        for existing in tables.albums.values() {
            if existing.album_no == album.album_no {
                return Err(DatabaseError::UniqueViolation(
                    "idx_albums_album_no".to_string(),
                ));
            }
            if existing.shaplink == album.shaplink {
                return Err(DatabaseError::UniqueViolation(
                    "idx_albums_shaplink".to_string(),
                ));
            }
            if existing.albums_id == album.albums_id {
                return Err(DatabaseError::UniqueViolation(
                    "albums_albums_id_key".to_string(),
                ));
            }
        }
        tables.albums.insert(album.id, album.clone());
        Ok(())
    }

    async fn update_album(&self, album: &Album) -> DatabaseResult<()> {
        let mut tables = self.tables.write().await;
        if let Some(existing) = tables.albums.get_mut(&album.id) {
            *existing = album.clone();
        }
        Ok(())
    }

    async fn find_album(&self, albums_id: i64) -> DatabaseResult<Option<Album>> {
        Ok(self
            .tables
            .read()
            .await
            .albums
            .values()
            .find(|a| a.albums_id == albums_id)
            .cloned())
    }

    async fn find_album_by_ref(&self, id: Uuid) -> DatabaseResult<Option<Album>> {
        Ok(self.tables.read().await.albums.get(&id).cloned())
    }

    async fn find_album_by_shaplink(&self, shaplink: &str) -> DatabaseResult<Option<Album>> {
        Ok(self
            .tables
            .read()
            .await
            .albums
            .values()
            .find(|a| a.shaplink == shaplink)
            .cloned())
    }

    async fn list_albums(
        &self,
        filter: &AlbumFilter,
        page: &PageRequest,
    ) -> DatabaseResult<(Vec<Album>, u64)> {
        let tables = self.tables.read().await;
        let mut albums: Vec<Album> = tables
            .albums
            .values()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect();
        albums.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then(b.albums_id.cmp(&a.albums_id))
        });
        Ok(paginate(albums, page))
    }
}

#[async_trait]
impl ShareStore for MemoryStore {
    async fn insert_share(&self, share: &AlbumShare) -> DatabaseResult<()> {
        let mut tables = self.tables.write().await;
        if self.unique_shares
            && tables
                .shares
                .values()
                .any(|s| s.user_id == share.user_id && s.album_ref == share.album_ref)
        {
            return Err(DatabaseError::UniqueViolation(
                "idx_album_shares_user_album_unique".to_string(),
            ));
        }
        if tables.shares.contains_key(&share.album_share_id) {
            return Err(DatabaseError::UniqueViolation(
                "album_shares_pkey".to_string(),
            ));
        }
        tables.shares.insert(share.album_share_id, share.clone());
        Ok(())
    }

    async fn update_share(&self, share: &AlbumShare) -> DatabaseResult<()> {
        let mut tables = self.tables.write().await;
        if let Some(existing) = tables.shares.get_mut(&share.album_share_id) {
            *existing = share.clone();
        }
        Ok(())
    }

    async fn find_share(&self, album_share_id: i64) -> DatabaseResult<Option<AlbumShare>> {
        Ok(self
            .tables
            .read()
            .await
            .shares
            .get(&album_share_id)
            .cloned())
    }

    async fn find_share_for(
        &self,
        user_id: i64,
        album_ref: Uuid,
    ) -> DatabaseResult<Option<AlbumShare>> {
        Ok(self
            .tables
            .read()
            .await
            .shares
            .values()
            .filter(|s| s.user_id == user_id && s.album_ref == album_ref)
            .min_by_key(|s| (s.created_at, s.album_share_id))
            .cloned())
    }

    async fn find_shares(&self, filter: &ShareFilter) -> DatabaseResult<Vec<AlbumShare>> {
        let tables = self.tables.read().await;
        let mut shares: Vec<AlbumShare> = tables
            .shares
            .values()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect();
        shares.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then(b.album_share_id.cmp(&a.album_share_id))
        });
        Ok(shares)
    }

    async fn list_shares(
        &self,
        filter: &ShareFilter,
        page: &PageRequest,
    ) -> DatabaseResult<(Vec<AlbumShare>, u64)> {
        let shares = self.find_shares(filter).await?;
        Ok(paginate(shares, page))
    }
}

#[async_trait]
impl ActivityStore for MemoryStore {
    async fn insert_activity(&self, entry: &ActivityEntry) -> DatabaseResult<()> {
        self.tables.write().await.activity.push(entry.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::album::fixtures;
    use crate::models::share::{AcceptState, SharedBy};
    use chrono::{Duration, Utc};

    fn share(id: i64, user_id: i64, album_ref: Uuid) -> AlbumShare {
        let now = Utc::now() + Duration::seconds(id);
        AlbumShare {
            album_share_id: id,
            user_id,
            album_ref,
            shared_by: SharedBy::Shaplink,
            description: None,
            accept_share: AcceptState::Pending,
            status: true,
            created_by: None,
            updated_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_album_identifiers_are_unique() {
        let store = MemoryStore::new(false);
        let album = fixtures::album(1, 7);
        store.insert_album(&album).await.unwrap();

        let mut clash = fixtures::album(2, 7);
        clash.album_no = album.album_no.clone();
        let err = store.insert_album(&clash).await.unwrap_err();
        assert!(matches!(err, DatabaseError::UniqueViolation(ref c) if c == "idx_albums_album_no"));

        let mut clash = fixtures::album(3, 7);
        clash.shaplink = album.shaplink.clone();
        assert!(store.insert_album(&clash).await.is_err());
    }

    #[tokio::test]
    async fn test_unique_share_mode() {
        let album_ref = Uuid::new_v4();

        let racy = MemoryStore::new(false);
        racy.insert_share(&share(1, 9, album_ref)).await.unwrap();
        racy.insert_share(&share(2, 9, album_ref)).await.unwrap();

        let hardened = MemoryStore::new(true);
        hardened.insert_share(&share(1, 9, album_ref)).await.unwrap();
        let err = hardened
            .insert_share(&share(2, 9, album_ref))
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::UniqueViolation(_)));
    }

    #[tokio::test]
    async fn test_share_listing_is_newest_first_and_paginated() {
        let store = MemoryStore::new(false);
        let album_ref = Uuid::new_v4();
        for id in 1..=5 {
            store.insert_share(&share(id, 9, album_ref)).await.unwrap();
        }
        store.insert_share(&share(6, 4, album_ref)).await.unwrap();

        let filter = ShareFilter {
            user_id: Some(9),
            ..ShareFilter::default()
        };
        let (page, total) = store
            .list_shares(&filter, &PageRequest::new(Some(2), Some(2)))
            .await
            .unwrap();
        assert_eq!(total, 5);
        let ids: Vec<i64> = page.iter().map(|s| s.album_share_id).collect();
        assert_eq!(ids, vec![3, 2]);

        let first = store.find_share_for(9, album_ref).await.unwrap().unwrap();
        assert_eq!(first.album_share_id, 1);
    }
}
