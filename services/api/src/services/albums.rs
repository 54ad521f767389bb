//! Album lifecycle: creation, updates, lookups and listings

use chrono::Utc;
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;

use super::{
    activity::ActivityRecorder,
    identifiers::{format_album_number, share_token},
    permissions::{self, AccessPolicy},
    validation,
};
use crate::{
    config::TokenStrategy,
    error::{ApiError, ApiResult},
    middleware::AuthUser,
    models::{
        activity::ActivityKind,
        album::{
            Album, AlbumDetail, AlbumListQuery, AlbumMetadata, AlbumSearchQuery, AlbumView,
            CheckAlbumRequest, CreateAlbumRequest, OwnedOrShared, ShareLinkInfo,
            ShareRecipient, UpdateAlbumRequest,
        },
        pagination::{PageRequest, Pagination},
        share::{AcceptState, ShareFilter, ViewerShareInfo},
        user::UserSummary,
    },
    repositories::{
        Repositories,
        schema::{ALBUM_NO_SEQUENCE, ALBUMS_SEQUENCE},
    },
};

/// Album creation, updates and read paths
#[derive(Clone)]
pub struct AlbumService {
    repos: Repositories,
    activity: ActivityRecorder,
    policy: AccessPolicy,
    token_strategy: TokenStrategy,
    public_base_url: String,
}

impl AlbumService {
    pub fn new(
        repos: Repositories,
        policy: AccessPolicy,
        token_strategy: TokenStrategy,
        public_base_url: impl Into<String>,
    ) -> Self {
        let activity = ActivityRecorder::new(repos.activity.clone(), repos.sequences.clone());
        Self {
            repos,
            activity,
            policy,
            token_strategy,
            public_base_url: public_base_url.into(),
        }
    }

    pub async fn create(&self, actor: AuthUser, request: CreateAlbumRequest) -> ApiResult<AlbumView> {
        match self.create_album(actor, request).await {
            Ok(view) => Ok(view),
            Err(e) => Err(self.activity.report(Some(actor.user_id), "Album Creation", e).await),
        }
    }

    async fn create_album(&self, actor: AuthUser, request: CreateAlbumRequest) -> ApiResult<AlbumView> {
        let fields = validation::validate_create(&request).map_err(ApiError::Validation)?;

        let photographer = self
            .repos
            .users
            .find_user(fields.photographer_id)
            .await?
            .filter(|user| user.status)
            .ok_or_else(|| ApiError::Reference("Photographer not found".to_string()))?;

        self.repos
            .event_types
            .find_event_type(fields.event_type_id)
            .await?
            .ok_or_else(|| ApiError::Reference("Event type not found".to_string()))?;

        let albums_id = self.repos.sequences.next_value(ALBUMS_SEQUENCE).await?;
        let album_no = format_album_number(self.repos.sequences.next_value(ALBUM_NO_SEQUENCE).await?);
        let now = Utc::now();
        let shaplink = share_token(
            self.token_strategy,
            &album_no,
            now.timestamp_millis(),
            photographer.user_id,
            &mut rand::thread_rng(),
        );

        let album = Album {
            id: Uuid::new_v4(),
            albums_id,
            photographer_id: photographer.user_id,
            album_title: fields.album_title,
            event_type_id: fields.event_type_id,
            event_date: fields.event_date,
            client_name: fields.client_name,
            client_contact_no: fields.client_contact_no,
            album_no,
            shaplink,
            album_orientation: request.album_orientation.unwrap_or_default(),
            file_type: request.file_type.unwrap_or_default(),
            number_of_pages: fields.number_of_pages,
            upload_images: request.upload_images.unwrap_or_default(),
            upload_songs: request.upload_songs.unwrap_or_default(),
            reorder_images: request.reorder_images.unwrap_or_default(),
            cover_photo: request.cover_photo,
            generate_qr_code: request.generate_qr_code.unwrap_or(false),
            set_expiry_date: request.set_expiry_date,
            enable_downloads: request.enable_downloads.unwrap_or(false),
            password_protect: request.password_protect,
            add_watermark: request.add_watermark,
            add_logo: request.add_logo,
            status: request.status.unwrap_or(true),
            created_by: Some(actor.user_id),
            updated_by: Some(actor.user_id),
            created_at: now,
            updated_at: now,
        };

        self.repos.albums.insert_album(&album).await?;
        info!(
            albums_id = album.albums_id,
            album_no = %album.album_no,
            photographer_id = album.photographer_id,
            "Album created"
        );

        self.activity
            .record(
                actor.user_id,
                ActivityKind::AlbumCreated {
                    album_title: album.album_title.clone(),
                },
                Some(actor.user_id),
            )
            .await;
        self.activity
            .record(
                actor.user_id,
                ActivityKind::ShaplinkGenerated {
                    album_title: album.album_title.clone(),
                    shaplink: album.shaplink.clone(),
                },
                Some(actor.user_id),
            )
            .await;

        Ok(AlbumView::new(album, Some(photographer.summary())))
    }

    pub async fn update(&self, actor: AuthUser, request: UpdateAlbumRequest) -> ApiResult<AlbumView> {
        match self.update_album(actor, request).await {
            Ok(view) => Ok(view),
            Err(e) => Err(self.activity.report(Some(actor.user_id), "Album Update", e).await),
        }
    }

    async fn update_album(&self, actor: AuthUser, request: UpdateAlbumRequest) -> ApiResult<AlbumView> {
        let albums_id = request
            .id
            .ok_or_else(|| ApiError::Validation("Album ID is required in request body".to_string()))?;
        validation::validate_patch(&request.patch).map_err(ApiError::Validation)?;

        let mut album = self.find(albums_id).await?;
        if !self.policy.can_manage(&album, actor.user_id, actor.role_id) {
            return Err(ApiError::Forbidden(
                "You do not have permission to update this album".to_string(),
            ));
        }

        if let Some(event_type_id) = request.patch.event_type_id {
            self.repos
                .event_types
                .find_event_type(event_type_id)
                .await?
                .ok_or_else(|| ApiError::Reference("Event type not found".to_string()))?;
        }

        let had_password = album.has_password();
        album.apply(request.patch);
        album.updated_by = Some(actor.user_id);
        album.updated_at = Utc::now();

        self.repos.albums.update_album(&album).await?;
        info!(albums_id = album.albums_id, updated_by = actor.user_id, "Album updated");

        self.activity
            .record(
                actor.user_id,
                ActivityKind::AlbumUpdated {
                    album_title: album.album_title.clone(),
                },
                Some(actor.user_id),
            )
            .await;
        if !had_password && album.has_password() {
            self.activity
                .record(
                    actor.user_id,
                    ActivityKind::PasswordSet {
                        album_title: album.album_title.clone(),
                    },
                    Some(actor.user_id),
                )
                .await;
        }

        let photographer = self.owner_summary(&album).await?;
        Ok(AlbumView::new(album, photographer))
    }

    /// Album by numeric id, or `NotFound`
    pub async fn find(&self, albums_id: i64) -> ApiResult<Album> {
        self.repos
            .albums
            .find_album(albums_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Album not found".to_string()))
    }

    async fn owner_summary(&self, album: &Album) -> ApiResult<Option<UserSummary>> {
        Ok(self
            .repos
            .users
            .find_user(album.photographer_id)
            .await?
            .map(|user| user.summary()))
    }

    async fn owner_summaries(&self, albums: &[Album]) -> ApiResult<HashMap<i64, UserSummary>> {
        let mut owners = HashMap::new();
        for album in albums {
            if owners.contains_key(&album.photographer_id) {
                continue;
            }
            if let Some(user) = self.repos.users.find_user(album.photographer_id).await? {
                owners.insert(album.photographer_id, user.summary());
            }
        }
        Ok(owners)
    }

    /// Album detail; viewer-specific fields only when authenticated
    pub async fn get(&self, viewer: Option<AuthUser>, albums_id: i64) -> ApiResult<AlbumDetail> {
        let album = self.find(albums_id).await?;
        let photographer = self
            .repos
            .users
            .find_user(album.photographer_id)
            .await?
            .map(|user| user.contact_summary());
        let metadata = AlbumMetadata::compute(&album, Utc::now());

        let Some(viewer) = viewer else {
            return Ok(AlbumDetail {
                album,
                photographer,
                metadata,
                is_owner: None,
                is_shared: None,
                share_info: None,
                permissions: None,
                all_shares: None,
            });
        };

        let share = self
            .repos
            .shares
            .find_shares(&ShareFilter {
                album_ref: Some(album.id),
                ..ShareFilter::granted_to(viewer.user_id)
            })
            .await?
            .into_iter()
            .next();
        let is_shared = permissions::is_shared(share.as_ref(), &album);
        let share_info = share
            .as_ref()
            .filter(|_| is_shared)
            .map(ViewerShareInfo::from);

        let all_shares = if self.policy.can_manage(&album, viewer.user_id, viewer.role_id) {
            Some(self.accepted_recipients(album.id).await?)
        } else {
            None
        };

        self.activity
            .record(
                viewer.user_id,
                ActivityKind::AlbumViewed {
                    album_title: album.album_title.clone(),
                },
                Some(viewer.user_id),
            )
            .await;

        Ok(AlbumDetail {
            is_owner: Some(album.photographer_id == viewer.user_id),
            is_shared: Some(is_shared),
            share_info,
            permissions: Some(self.policy.evaluate(&album, viewer.user_id, viewer.role_id)),
            all_shares,
            album,
            photographer,
            metadata,
        })
    }

    async fn accepted_recipients(&self, album_ref: Uuid) -> ApiResult<Vec<ShareRecipient>> {
        let filter = ShareFilter {
            album_ref: Some(album_ref),
            accept_share: Some(AcceptState::Accepted),
            ..ShareFilter::default()
        };
        let shares = self.repos.shares.find_shares(&filter).await?;

        let mut recipients = Vec::with_capacity(shares.len());
        for share in shares {
            let user = self.repos.users.find_user(share.user_id).await?;
            let (user_name, user_email) = user
                .map(|u| (u.name, u.email))
                .unwrap_or_default();
            recipients.push(ShareRecipient {
                album_share_id: share.album_share_id,
                user_id: share.user_id,
                user_name,
                user_email,
                description: share.description,
                status: share.status,
                shared_at: share.created_at,
                shared_by: share.created_by,
            });
        }
        Ok(recipients)
    }

    pub async fn list(&self, query: AlbumListQuery) -> ApiResult<(Vec<AlbumView>, Pagination)> {
        let page = PageRequest::new(query.page, query.limit);
        let (albums, total) = self.repos.albums.list_albums(&query.filter(), &page).await?;
        let owners = self.owner_summaries(&albums).await?;

        let views = albums
            .into_iter()
            .map(|album| {
                let photographer = owners.get(&album.photographer_id).cloned();
                AlbumView::new(album, photographer)
            })
            .collect();

        Ok((views, Pagination::for_request(&page, total)))
    }

    /// Albums the caller owns plus those shared with them and accepted
    pub async fn my_albums(
        &self,
        actor: AuthUser,
        query: AlbumListQuery,
    ) -> ApiResult<(Vec<AlbumView>, Pagination)> {
        let page = PageRequest::new(query.page, query.limit);
        let shares = self
            .repos
            .shares
            .find_shares(&ShareFilter::granted_to(actor.user_id))
            .await?;

        let mut filter = query.filter();
        filter.owned_or_shared = Some(OwnedOrShared {
            owner_id: actor.user_id,
            album_refs: shares.iter().map(|s| s.album_ref).collect(),
        });

        let (albums, total) = self.repos.albums.list_albums(&filter, &page).await?;
        let owners = self.owner_summaries(&albums).await?;

        let views = albums
            .into_iter()
            .map(|album| {
                let share = shares
                    .iter()
                    .find(|s| s.album_ref == album.id)
                    .filter(|_| album.photographer_id != actor.user_id);
                let photographer = owners.get(&album.photographer_id).cloned();
                let mut view = AlbumView::new(album, photographer);
                view.is_shared = Some(share.is_some());
                view.share_info = share.map(ViewerShareInfo::from);
                view
            })
            .collect();

        Ok((views, Pagination::for_request(&page, total)))
    }

    /// Admin-only title and event date search
    pub async fn search(
        &self,
        actor: AuthUser,
        query: AlbumSearchQuery,
    ) -> ApiResult<(Vec<AlbumView>, Pagination)> {
        if !self.policy.is_admin(actor.role_id) {
            return Err(ApiError::Forbidden(
                "Only administrators can search albums".to_string(),
            ));
        }

        let page = PageRequest::new(query.page, query.limit);
        let (albums, total) = self.repos.albums.list_albums(&query.filter(), &page).await?;
        let owners = self.owner_summaries(&albums).await?;

        let mut views = Vec::with_capacity(albums.len());
        for album in albums {
            let filter = ShareFilter {
                album_ref: Some(album.id),
                accept_share: Some(AcceptState::Accepted),
                ..ShareFilter::default()
            };
            let accepted = self.repos.shares.find_shares(&filter).await?;
            let photographer = owners.get(&album.photographer_id).cloned();

            let mut view = AlbumView::new(album, photographer);
            view.is_shared = Some(!accepted.is_empty());
            view.share_info = accepted.last().map(ViewerShareInfo::from);
            views.push(view);
        }

        Ok((views, Pagination::for_request(&page, total)))
    }

    /// Look an album up by numeric id or share token
    pub async fn check(&self, request: CheckAlbumRequest) -> ApiResult<AlbumView> {
        let album = match (request.album_id, request.shaplink.as_deref()) {
            (Some(albums_id), _) => self.repos.albums.find_album(albums_id).await?,
            (None, Some(shaplink)) if !shaplink.trim().is_empty() => {
                self.repos.albums.find_album_by_shaplink(shaplink.trim()).await?
            }
            _ => {
                return Err(ApiError::Validation(
                    "Either album_id or shaplink is required".to_string(),
                ));
            }
        }
        .ok_or_else(|| ApiError::NotFound("Album not found".to_string()))?;

        let photographer = self.owner_summary(&album).await?;
        Ok(AlbumView::new(album, photographer))
    }

    /// Public share URL for `mode` (`link` or `qr`)
    pub async fn share_link(
        &self,
        actor: AuthUser,
        albums_id: i64,
        mode: &str,
    ) -> ApiResult<ShareLinkInfo> {
        if !matches!(mode, "link" | "qr") {
            return Err(ApiError::Validation(
                "Share mode must be one of: link, qr".to_string(),
            ));
        }

        let album = self.find(albums_id).await?;
        let photographer = self.owner_summary(&album).await?;
        let share_link = format!(
            "{}/albums/share/{}/{}",
            self.public_base_url.trim_end_matches('/'),
            mode,
            album.shaplink
        );

        if mode == "qr" {
            self.activity
                .record(
                    actor.user_id,
                    ActivityKind::QrCodeGenerated {
                        album_title: album.album_title.clone(),
                    },
                    Some(actor.user_id),
                )
                .await;
        }

        Ok(ShareLinkInfo {
            album_id: album.albums_id,
            album_title: album.album_title,
            album_no: album.album_no,
            shaplink: album.shaplink,
            share_link,
            mode: mode.to_string(),
            photographer,
            set_expiry_date: album.set_expiry_date,
            status: album.status,
        })
    }
}
