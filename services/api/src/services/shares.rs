//! Share workflow: token resolution, acceptance and share listings

use chrono::Utc;
use common::error::DatabaseError;
use std::collections::HashMap;
use tracing::info;

use super::{activity::ActivityRecorder, permissions::AccessPolicy, validation};
use crate::{
    config::DuplicateGuard,
    error::{ApiError, ApiResult},
    middleware::AuthUser,
    models::{
        activity::ActivityKind,
        album::{Album, AlbumMetadata, AlbumSummary},
        pagination::{PageRequest, Pagination},
        share::{
            AcceptState, AlbumShare, SharePreview, ShareFilter, ShareListQuery, ShareView,
            SharedBy, UpdateAcceptanceRequest, UpdateShareDetailsRequest,
        },
        user::UserSummary,
    },
    repositories::{Repositories, schema::ALBUM_SHARES_SEQUENCE},
};

const DUPLICATE_SHARE: &str = "Album share already exists for this user and album";

/// Who a share is being resolved for
#[derive(Debug, Clone, Default)]
pub struct ShareTarget {
    /// `None` asks for a preview only
    pub recipient: Option<i64>,
    pub description: Option<String>,
    pub actor: Option<AuthUser>,
}

#[derive(Clone)]
pub struct ShareService {
    repos: Repositories,
    activity: ActivityRecorder,
    policy: AccessPolicy,
    duplicate_guard: DuplicateGuard,
}

impl ShareService {
    pub fn new(repos: Repositories, policy: AccessPolicy, duplicate_guard: DuplicateGuard) -> Self {
        let activity = ActivityRecorder::new(repos.activity.clone(), repos.sequences.clone());
        Self {
            repos,
            activity,
            policy,
            duplicate_guard,
        }
    }

    /// Resolve a share token into a preview, or a new pending share when a
    /// recipient is given
    pub async fn resolve(
        &self,
        token: &str,
        mode: SharedBy,
        target: ShareTarget,
    ) -> ApiResult<SharePreview> {
        let actor_id = target.actor.map(|a| a.user_id);
        match self.resolve_token(token, mode, target).await {
            Ok(preview) => Ok(preview),
            Err(e) => Err(self.activity.report(actor_id, "Album Share By Link", e).await),
        }
    }

    async fn resolve_token(
        &self,
        token: &str,
        mode: SharedBy,
        target: ShareTarget,
    ) -> ApiResult<SharePreview> {
        let token = token.trim();
        if token.is_empty() {
            return Err(ApiError::Validation("Sharelink is required".to_string()));
        }

        let album = self
            .repos
            .albums
            .find_album_by_shaplink(token)
            .await?
            .ok_or_else(|| {
                ApiError::NotFound("Album not found with the provided sharelink".to_string())
            })?;

        if !album.status {
            return Err(ApiError::Validation("Album is not active".to_string()));
        }
        let now = Utc::now();
        if album.is_expired_at(now) {
            return Err(ApiError::Expired("Album has expired".to_string()));
        }

        let photographer = self
            .repos
            .users
            .find_user(album.photographer_id)
            .await?
            .map(|user| user.contact_summary());

        let share_info = match target.recipient {
            Some(recipient) => Some(self.create_share(&album, mode, recipient, &target).await?),
            None => None,
        };

        Ok(SharePreview {
            metadata: AlbumMetadata::compute(&album, now),
            album,
            photographer,
            share_info,
        })
    }

    async fn create_share(
        &self,
        album: &Album,
        mode: SharedBy,
        recipient: i64,
        target: &ShareTarget,
    ) -> ApiResult<AlbumShare> {
        let user = self
            .repos
            .users
            .find_user(recipient)
            .await?
            .ok_or_else(|| ApiError::Reference("User not found".to_string()))?;

        if let Some(description) = &target.description {
            validation::validate_description(description).map_err(ApiError::Validation)?;
        }

        if self.duplicate_guard == DuplicateGuard::Check
            && self
                .repos
                .shares
                .find_share_for(recipient, album.id)
                .await?
                .is_some()
        {
            return Err(ApiError::Conflict(DUPLICATE_SHARE.to_string()));
        }

        let actor_id = target.actor.map(|a| a.user_id);
        let now = Utc::now();
        let share = AlbumShare {
            album_share_id: self.repos.sequences.next_value(ALBUM_SHARES_SEQUENCE).await?,
            user_id: recipient,
            album_ref: album.id,
            shared_by: mode,
            description: Some(
                target
                    .description
                    .clone()
                    .filter(|d| !d.is_empty())
                    .unwrap_or_else(|| format!("Album shared via {}", mode.as_str())),
            ),
            accept_share: AcceptState::Pending,
            status: true,
            created_by: actor_id,
            updated_by: actor_id,
            created_at: now,
            updated_at: now,
        };

        self.repos.shares.insert_share(&share).await.map_err(|e| match e {
            DatabaseError::UniqueViolation(_) => ApiError::Conflict(DUPLICATE_SHARE.to_string()),
            other => ApiError::Database(other),
        })?;
        info!(
            album_share_id = share.album_share_id,
            albums_id = album.albums_id,
            recipient,
            shared_by = mode.as_str(),
            "Album share created"
        );

        if let Some(actor_id) = actor_id {
            self.activity
                .record(
                    actor_id,
                    ActivityKind::AlbumShared {
                        album_title: album.album_title.clone(),
                        recipient: user.name,
                    },
                    Some(actor_id),
                )
                .await;
        }

        Ok(share)
    }

    async fn find(&self, album_share_id: i64) -> ApiResult<AlbumShare> {
        self.repos
            .shares
            .find_share(album_share_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Album share not found".to_string()))
    }

    /// Set the recipient's answer; only the recipient or an admin may
    pub async fn update_acceptance(
        &self,
        actor: AuthUser,
        request: UpdateAcceptanceRequest,
    ) -> ApiResult<(AcceptState, ShareView)> {
        let (Some(album_share_id), Some(state)) = (request.album_share_id, request.accept_share)
        else {
            return Err(ApiError::Validation(
                "Album Share ID and accept_share status are required".to_string(),
            ));
        };
        let state: AcceptState = state.parse().map_err(|_| {
            ApiError::Validation("accept_share must be one of: Accepted, Rejected, Pending".to_string())
        })?;

        let mut share = self.find(album_share_id).await?;
        if share.user_id != actor.user_id && !self.policy.is_admin(actor.role_id) {
            return Err(ApiError::Forbidden(
                "You do not have permission to update this album share".to_string(),
            ));
        }

        share.accept_share = state;
        share.updated_by = Some(actor.user_id);
        share.updated_at = Utc::now();
        self.repos.shares.update_share(&share).await?;
        info!(
            album_share_id,
            accept_share = state.as_str(),
            updated_by = actor.user_id,
            "Album share answered"
        );

        Ok((state, self.view(share).await?))
    }

    /// Edit description or active flag; creator or admin only
    pub async fn update_details(
        &self,
        actor: AuthUser,
        request: UpdateShareDetailsRequest,
    ) -> ApiResult<ShareView> {
        let album_share_id = request.id.ok_or_else(|| {
            ApiError::Validation("Album Share ID is required in request body".to_string())
        })?;
        if let Some(description) = &request.description {
            validation::validate_description(description).map_err(ApiError::Validation)?;
        }

        let mut share = self.find(album_share_id).await?;
        if share.created_by != Some(actor.user_id) && !self.policy.is_admin(actor.role_id) {
            return Err(ApiError::Forbidden(
                "You do not have permission to update this album share".to_string(),
            ));
        }

        if request.description.is_some() {
            share.description = request.description;
        }
        if let Some(status) = request.status {
            share.status = status;
        }
        share.updated_by = Some(actor.user_id);
        share.updated_at = Utc::now();
        self.repos.shares.update_share(&share).await?;

        self.view(share).await
    }

    /// A share as seen by its recipient; album expiry does not matter here
    pub async fn get(&self, actor: AuthUser, album_share_id: i64) -> ApiResult<ShareView> {
        let share = self.find(album_share_id).await?;
        if share.user_id != actor.user_id {
            return Err(ApiError::Forbidden(
                "You do not have permission to view this album share".to_string(),
            ));
        }

        self.view(share).await
    }

    /// Every share for admins, otherwise the caller's own
    pub async fn list_requests(
        &self,
        actor: AuthUser,
        query: ShareListQuery,
    ) -> ApiResult<(Vec<ShareView>, Pagination)> {
        let filter = ShareFilter {
            user_id: (!self.policy.is_admin(actor.role_id)).then_some(actor.user_id),
            status: query.status,
            ..ShareFilter::default()
        };
        self.page(&filter, PageRequest::new(query.page, query.limit))
            .await
    }

    /// Shares of one album for its owner, an admin or another share holder
    pub async fn list_by_album(
        &self,
        actor: AuthUser,
        albums_id: i64,
        query: ShareListQuery,
    ) -> ApiResult<(Vec<ShareView>, Pagination)> {
        let album = self
            .repos
            .albums
            .find_album(albums_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Album not found".to_string()))?;

        if !self.policy.can_manage(&album, actor.user_id, actor.role_id)
            && self
                .repos
                .shares
                .find_share_for(actor.user_id, album.id)
                .await?
                .is_none()
        {
            return Err(ApiError::Forbidden(
                "You do not have permission to view shares for this album".to_string(),
            ));
        }

        let filter = ShareFilter {
            album_ref: Some(album.id),
            status: query.status,
            ..ShareFilter::default()
        };
        self.page(&filter, PageRequest::new(query.page, query.limit))
            .await
    }

    async fn page(
        &self,
        filter: &ShareFilter,
        page: PageRequest,
    ) -> ApiResult<(Vec<ShareView>, Pagination)> {
        let (shares, total) = self.repos.shares.list_shares(filter, &page).await?;

        let mut users: HashMap<i64, Option<UserSummary>> = HashMap::new();
        let mut albums: HashMap<uuid::Uuid, Option<AlbumSummary>> = HashMap::new();
        let mut views = Vec::with_capacity(shares.len());
        for share in shares {
            if !users.contains_key(&share.user_id) {
                let user = self.repos.users.find_user(share.user_id).await?;
                users.insert(share.user_id, user.map(|u| u.summary()));
            }
            if !albums.contains_key(&share.album_ref) {
                let album = self.repos.albums.find_album_by_ref(share.album_ref).await?;
                albums.insert(share.album_ref, album.as_ref().map(AlbumSummary::from));
            }
            views.push(ShareView {
                user: users.get(&share.user_id).cloned().flatten(),
                album: albums.get(&share.album_ref).cloned().flatten(),
                share,
            });
        }

        Ok((views, Pagination::for_request(&page, total)))
    }

    async fn view(&self, share: AlbumShare) -> ApiResult<ShareView> {
        let user = self.repos.users.find_user(share.user_id).await?;
        let album = self.repos.albums.find_album_by_ref(share.album_ref).await?;

        Ok(ShareView {
            user: user.map(|u| u.summary()),
            album: album.as_ref().map(AlbumSummary::from),
            share,
        })
    }
}
