//! Albums service routes

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
};
use axum_extra::extract::WithRejection;
use serde_json::json;

use crate::{
    AppState,
    error::{ApiError, ApiResult},
    middleware::{AuthUser, auth_middleware, optional_auth_middleware},
    models::{
        album::{
            AlbumListQuery, AlbumSearchQuery, CheckAlbumRequest, CreateAlbumRequest,
            UpdateAlbumRequest,
        },
        envelope::ApiResponse,
        share::{
            DirectInviteRequest, SharedBy, ShareListQuery, UpdateAcceptanceRequest,
            UpdateShareDetailsRequest,
        },
    },
    services::ShareTarget,
};

/// Create the router for the albums service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/albums", post(create_album).put(update_album))
        .route("/albums/my-albums", get(my_albums))
        .route("/albums/search", get(search_albums))
        .route("/albums/:id/share-link/:mode", get(share_link))
        .route("/album-shares", get(list_share_requests).put(update_acceptance))
        .route("/album-shares/details", put(update_share_details))
        .route("/album-shares/album/:album_id", get(list_album_shares))
        .route("/album-shares/:id", get(get_share))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let optional_auth_routes = Router::new()
        .route("/albums/:id", get(get_album))
        .route("/albums/share/:mode/:token", get(share_by_token))
        .route("/album-shares/link", post(share_by_invite))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            optional_auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/albums", get(list_albums))
        .route("/albums/check", post(check_album))
        .merge(protected_routes)
        .merge(optional_auth_routes)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "albums-api"
    }))
}

pub async fn create_album(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Json(payload), _): WithRejection<Json<CreateAlbumRequest>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let album = state.albums.create(user, payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message("Album created successfully", album)),
    ))
}

pub async fn update_album(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Json(payload), _): WithRejection<Json<UpdateAlbumRequest>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let album = state.albums.update(user, payload).await?;

    Ok(Json(ApiResponse::with_message(
        "Album updated successfully",
        album,
    )))
}

/// All albums, newest first
pub async fn list_albums(
    State(state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<AlbumListQuery>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let (albums, pagination) = state.albums.list(query).await?;

    Ok(Json(ApiResponse::paginated(albums, pagination)))
}

pub async fn my_albums(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Query(query), _): WithRejection<Query<AlbumListQuery>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let (albums, pagination) = state.albums.my_albums(user, query).await?;

    Ok(Json(ApiResponse::paginated(albums, pagination)))
}

pub async fn search_albums(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Query(query), _): WithRejection<Query<AlbumSearchQuery>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let (albums, pagination) = state.albums.search(user, query).await?;

    let mut body = ApiResponse::paginated(albums, pagination);
    body.message = Some("Albums found".to_string());
    Ok(Json(body))
}

pub async fn check_album(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<CheckAlbumRequest>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let album = state.albums.check(payload).await?;

    Ok(Json(ApiResponse::with_message("Album found", album)))
}

/// Album detail; permissions are included for authenticated callers
pub async fn get_album(
    State(state): State<AppState>,
    user: Option<Extension<AuthUser>>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let album = state.albums.get(user.map(|Extension(u)| u), id).await?;

    Ok(Json(ApiResponse::success(album)))
}

pub async fn share_link(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Path((id, mode)), _): WithRejection<Path<(i64, String)>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let link = state.albums.share_link(user, id, &mode).await?;

    Ok(Json(ApiResponse::with_message(
        "Album share link generated successfully",
        link,
    )))
}

/// Share an album with the caller, or preview it when anonymous
pub async fn share_by_token(
    State(state): State<AppState>,
    user: Option<Extension<AuthUser>>,
    WithRejection(Path((mode, token)), _): WithRejection<Path<(String, String)>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let mode = SharedBy::from_route_mode(&mode)
        .ok_or_else(|| ApiError::Validation("Share mode must be one of: link, shap, qr".to_string()))?;
    let user = user.map(|Extension(u)| u);

    let target = ShareTarget {
        recipient: user.map(|u| u.user_id),
        description: None,
        actor: user,
    };
    let preview = state.shares.resolve(&token, mode, target).await?;

    if preview.share_info.is_some() {
        Ok((
            StatusCode::CREATED,
            Json(ApiResponse::with_message(
                "Album share created successfully",
                preview,
            )),
        ))
    } else {
        Ok((
            StatusCode::OK,
            Json(ApiResponse::with_message(
                "Album details retrieved successfully",
                preview,
            )),
        ))
    }
}

/// Share an album with an explicit recipient, or preview it
pub async fn share_by_invite(
    State(state): State<AppState>,
    user: Option<Extension<AuthUser>>,
    WithRejection(Json(payload), _): WithRejection<Json<DirectInviteRequest>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let token = payload
        .sharelink
        .ok_or_else(|| ApiError::Validation("Sharelink is required".to_string()))?;

    let target = ShareTarget {
        recipient: payload.user_id,
        description: payload.description,
        actor: user.map(|Extension(u)| u),
    };
    let created = target.recipient.is_some();
    let preview = state
        .shares
        .resolve(&token, payload.shared_by.unwrap_or(SharedBy::Shaplink), target)
        .await?;

    let message = if created {
        "Album share created successfully"
    } else {
        "Album details retrieved successfully"
    };
    Ok(Json(ApiResponse::with_message(message, preview)))
}

pub async fn update_acceptance(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Json(payload), _): WithRejection<Json<UpdateAcceptanceRequest>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let (accept_share, share) = state.shares.update_acceptance(user, payload).await?;

    Ok(Json(ApiResponse::with_message(
        format!(
            "Album share {} successfully",
            accept_share.as_str().to_lowercase()
        ),
        share,
    )))
}

pub async fn update_share_details(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Json(payload), _): WithRejection<Json<UpdateShareDetailsRequest>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let share = state.shares.update_details(user, payload).await?;

    Ok(Json(ApiResponse::with_message(
        "Album share updated successfully",
        share,
    )))
}

pub async fn get_share(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let share = state.shares.get(user, id).await?;

    Ok(Json(ApiResponse::success(share)))
}

/// Share requests visible to the caller
pub async fn list_share_requests(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Query(query), _): WithRejection<Query<ShareListQuery>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let (shares, pagination) = state.shares.list_requests(user, query).await?;

    Ok(Json(ApiResponse::paginated(shares, pagination)))
}

pub async fn list_album_shares(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Path(album_id), _): WithRejection<Path<i64>, ApiError>,
    WithRejection(Query(query), _): WithRejection<Query<ShareListQuery>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let (shares, pagination) = state.shares.list_by_album(user, album_id, query).await?;

    Ok(Json(ApiResponse::paginated(shares, pagination)))
}
