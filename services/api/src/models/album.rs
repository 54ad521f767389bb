//! Album models for the albums service

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

use super::share::ViewerShareInfo;
use super::user::UserSummary;

/// Stored enum value that does not match any known variant
#[derive(Debug, Error)]
#[error("unknown {kind} value '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlbumOrientation {
    #[default]
    Portrait,
    Landscape,
}

impl AlbumOrientation {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlbumOrientation::Portrait => "Portrait",
            AlbumOrientation::Landscape => "Landscape",
        }
    }
}

impl FromStr for AlbumOrientation {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Portrait" => Ok(AlbumOrientation::Portrait),
            "Landscape" => Ok(AlbumOrientation::Landscape),
            other => Err(ParseEnumError {
                kind: "album_orientation",
                value: other.to_string(),
            }),
        }
    }
}

/// Page presentation of the album viewer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileType {
    #[default]
    #[serde(rename = "Standard Flip")]
    StandardFlip,
    #[serde(rename = "Book View")]
    BookView,
    #[serde(rename = "Single Scroll")]
    SingleScroll,
}

impl FileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::StandardFlip => "Standard Flip",
            FileType::BookView => "Book View",
            FileType::SingleScroll => "Single Scroll",
        }
    }
}

impl FromStr for FileType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Standard Flip" => Ok(FileType::StandardFlip),
            "Book View" => Ok(FileType::BookView),
            "Single Scroll" => Ok(FileType::SingleScroll),
            other => Err(ParseEnumError {
                kind: "fileType",
                value: other.to_string(),
            }),
        }
    }
}

/// Album record
///
/// `id` is the storage identifier referenced by shares; `albums_id` is the
/// numeric id exposed to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Album {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub albums_id: i64,
    pub photographer_id: i64,
    pub album_title: String,
    pub event_type_id: i64,
    pub event_date: NaiveDate,
    pub client_name: String,
    #[serde(rename = "client_contactNo")]
    pub client_contact_no: String,
    pub album_no: String,
    pub shaplink: String,
    pub album_orientation: AlbumOrientation,
    #[serde(rename = "fileType")]
    pub file_type: FileType,
    #[serde(rename = "numberOfPages")]
    pub number_of_pages: i32,
    pub upload_images: Vec<String>,
    pub upload_songs: Vec<String>,
    pub reorder_images: Vec<String>,
    #[serde(rename = "coverPhoto")]
    pub cover_photo: Option<String>,
    #[serde(rename = "generateQRCode")]
    pub generate_qr_code: bool,
    #[serde(rename = "setExpiryDate")]
    pub set_expiry_date: Option<DateTime<Utc>>,
    #[serde(rename = "enableDownloads")]
    pub enable_downloads: bool,
    /// Stored as given; not hashed
    #[serde(rename = "passwordProtect")]
    pub password_protect: Option<String>,
    #[serde(rename = "addWaterMark")]
    pub add_watermark: Option<String>,
    #[serde(rename = "addLogo")]
    pub add_logo: Option<String>,
    pub status: bool,
    #[serde(rename = "createdBy")]
    pub created_by: Option<i64>,
    #[serde(rename = "updatedBy")]
    pub updated_by: Option<i64>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl Album {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.set_expiry_date.is_some_and(|expiry| now > expiry)
    }

    pub fn has_password(&self) -> bool {
        self.password_protect.as_deref().is_some_and(|p| !p.is_empty())
    }

    /// Apply the provided fields, leaving generated identifiers untouched
    pub fn apply(&mut self, patch: AlbumPatch) {
        if let Some(v) = patch.album_title {
            self.album_title = v;
        }
        if let Some(v) = patch.event_type_id {
            self.event_type_id = v;
        }
        if let Some(v) = patch.event_date {
            self.event_date = v;
        }
        if let Some(v) = patch.client_name {
            self.client_name = v;
        }
        if let Some(v) = patch.client_contact_no {
            self.client_contact_no = v;
        }
        if let Some(v) = patch.album_orientation {
            self.album_orientation = v;
        }
        if let Some(v) = patch.file_type {
            self.file_type = v;
        }
        if let Some(v) = patch.number_of_pages {
            self.number_of_pages = v;
        }
        if let Some(v) = patch.upload_images {
            self.upload_images = v;
        }
        if let Some(v) = patch.upload_songs {
            self.upload_songs = v;
        }
        if let Some(v) = patch.reorder_images {
            self.reorder_images = v;
        }
        if patch.cover_photo.is_some() {
            self.cover_photo = patch.cover_photo;
        }
        if let Some(v) = patch.generate_qr_code {
            self.generate_qr_code = v;
        }
        if patch.set_expiry_date.is_some() {
            self.set_expiry_date = patch.set_expiry_date;
        }
        if let Some(v) = patch.enable_downloads {
            self.enable_downloads = v;
        }
        if patch.password_protect.is_some() {
            self.password_protect = patch.password_protect;
        }
        if patch.add_watermark.is_some() {
            self.add_watermark = patch.add_watermark;
        }
        if patch.add_logo.is_some() {
            self.add_logo = patch.add_logo;
        }
        if let Some(v) = patch.status {
            self.status = v;
        }
    }
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp (date part kept)
pub fn parse_event_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok().or_else(|| {
        DateTime::parse_from_rfc3339(value)
            .ok()
            .map(|dt| dt.with_timezone(&Utc).date_naive())
    })
}

fn deserialize_event_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_event_date(value)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date '{}'", value))),
    }
}

/// Body of `POST /albums`
///
/// Required fields are optional here so that missing ones surface as a
/// validation error rather than a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateAlbumRequest {
    pub photographer_id: Option<i64>,
    pub album_title: Option<String>,
    pub event_type_id: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_event_date")]
    pub event_date: Option<NaiveDate>,
    pub client_name: Option<String>,
    #[serde(rename = "client_contactNo")]
    pub client_contact_no: Option<String>,
    pub album_orientation: Option<AlbumOrientation>,
    #[serde(rename = "fileType")]
    pub file_type: Option<FileType>,
    #[serde(rename = "numberOfPages")]
    pub number_of_pages: Option<i32>,
    pub upload_images: Option<Vec<String>>,
    pub upload_songs: Option<Vec<String>>,
    pub reorder_images: Option<Vec<String>>,
    #[serde(rename = "coverPhoto")]
    pub cover_photo: Option<String>,
    #[serde(rename = "generateQRCode")]
    pub generate_qr_code: Option<bool>,
    #[serde(rename = "setExpiryDate")]
    pub set_expiry_date: Option<DateTime<Utc>>,
    #[serde(rename = "enableDownloads")]
    pub enable_downloads: Option<bool>,
    #[serde(rename = "passwordProtect")]
    pub password_protect: Option<String>,
    #[serde(rename = "addWaterMark")]
    pub add_watermark: Option<String>,
    #[serde(rename = "addLogo")]
    pub add_logo: Option<String>,
    pub status: Option<bool>,
}

/// Mutable album fields
///
/// Album number, share token, numeric id and owner are not part of the
/// patch and are ignored if sent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlbumPatch {
    pub album_title: Option<String>,
    pub event_type_id: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_event_date")]
    pub event_date: Option<NaiveDate>,
    pub client_name: Option<String>,
    #[serde(rename = "client_contactNo")]
    pub client_contact_no: Option<String>,
    pub album_orientation: Option<AlbumOrientation>,
    #[serde(rename = "fileType")]
    pub file_type: Option<FileType>,
    #[serde(rename = "numberOfPages")]
    pub number_of_pages: Option<i32>,
    pub upload_images: Option<Vec<String>>,
    pub upload_songs: Option<Vec<String>>,
    pub reorder_images: Option<Vec<String>>,
    #[serde(rename = "coverPhoto")]
    pub cover_photo: Option<String>,
    #[serde(rename = "generateQRCode")]
    pub generate_qr_code: Option<bool>,
    #[serde(rename = "setExpiryDate")]
    pub set_expiry_date: Option<DateTime<Utc>>,
    #[serde(rename = "enableDownloads")]
    pub enable_downloads: Option<bool>,
    #[serde(rename = "passwordProtect")]
    pub password_protect: Option<String>,
    #[serde(rename = "addWaterMark")]
    pub add_watermark: Option<String>,
    #[serde(rename = "addLogo")]
    pub add_logo: Option<String>,
    pub status: Option<bool>,
}

/// Body of `PUT /albums`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAlbumRequest {
    pub id: Option<i64>,
    #[serde(flatten)]
    pub patch: AlbumPatch,
}

/// Body of `POST /albums/check`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckAlbumRequest {
    pub album_id: Option<i64>,
    pub shaplink: Option<String>,
}

/// Query of `GET /albums` and `GET /albums/my-albums`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlbumListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub event_type_id: Option<i64>,
    pub album_orientation: Option<AlbumOrientation>,
    #[serde(rename = "fileType")]
    pub file_type: Option<FileType>,
    pub status: Option<bool>,
}

impl AlbumListQuery {
    pub fn filter(&self) -> AlbumFilter {
        AlbumFilter {
            event_type_id: self.event_type_id,
            album_orientation: self.album_orientation,
            file_type: self.file_type,
            status: self.status,
            ..AlbumFilter::default()
        }
    }
}

/// Query of `GET /albums/search`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlbumSearchQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub album_title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_event_date")]
    pub event_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_event_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_event_date")]
    pub end_date: Option<NaiveDate>,
    pub event_type_id: Option<i64>,
    pub status: Option<bool>,
}

impl AlbumSearchQuery {
    /// A complete start/end range takes precedence over a single event date
    pub fn filter(&self) -> AlbumFilter {
        let (from, to) = match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => (Some(start), Some(end)),
            _ => (self.event_date, self.event_date),
        };

        AlbumFilter {
            event_type_id: self.event_type_id,
            status: self.status,
            title_contains: self
                .album_title
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string),
            event_date_from: from,
            event_date_to: to,
            ..AlbumFilter::default()
        }
    }
}

/// Restricts a listing to albums owned by a user or in an explicit set
#[derive(Debug, Clone, PartialEq)]
pub struct OwnedOrShared {
    pub owner_id: i64,
    pub album_refs: Vec<Uuid>,
}

/// Storage-level album filter; all set conditions must hold
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlbumFilter {
    pub event_type_id: Option<i64>,
    pub album_orientation: Option<AlbumOrientation>,
    pub file_type: Option<FileType>,
    pub status: Option<bool>,
    /// Case-insensitive substring of the title
    pub title_contains: Option<String>,
    /// Inclusive event date bounds
    pub event_date_from: Option<NaiveDate>,
    pub event_date_to: Option<NaiveDate>,
    pub owned_or_shared: Option<OwnedOrShared>,
}

impl AlbumFilter {
    pub fn matches(&self, album: &Album) -> bool {
        if self.event_type_id.is_some_and(|id| album.event_type_id != id) {
            return false;
        }
        if self
            .album_orientation
            .is_some_and(|o| album.album_orientation != o)
        {
            return false;
        }
        if self.file_type.is_some_and(|f| album.file_type != f) {
            return false;
        }
        if self.status.is_some_and(|s| album.status != s) {
            return false;
        }
        if let Some(needle) = &self.title_contains {
            if !album
                .album_title
                .to_lowercase()
                .contains(&needle.to_lowercase())
            {
                return false;
            }
        }
        if self.event_date_from.is_some_and(|from| album.event_date < from) {
            return false;
        }
        if self.event_date_to.is_some_and(|to| album.event_date > to) {
            return false;
        }
        if let Some(scope) = &self.owned_or_shared {
            if album.photographer_id != scope.owner_id && !scope.album_refs.contains(&album.id) {
                return false;
            }
        }
        true
    }
}

/// Derived album facts included in detail and preview responses
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumMetadata {
    pub total_images: usize,
    pub total_songs: usize,
    pub has_cover_photo: bool,
    pub has_password: bool,
    pub is_expired: bool,
    /// Whole days left, rounded up; zero or negative once expired
    pub days_until_expiry: Option<i64>,
}

impl AlbumMetadata {
    pub fn compute(album: &Album, now: DateTime<Utc>) -> Self {
        let days_until_expiry = album.set_expiry_date.map(|expiry| {
            let millis = (expiry - now).num_milliseconds() as f64;
            (millis / 86_400_000.0).ceil() as i64
        });

        Self {
            total_images: album.upload_images.len(),
            total_songs: album.upload_songs.len(),
            has_cover_photo: album.cover_photo.as_deref().is_some_and(|c| !c.is_empty()),
            has_password: album.has_password(),
            is_expired: album.is_expired_at(now),
            days_until_expiry,
        }
    }
}

/// Rights of a requester over an album
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumPermissions {
    pub can_edit: bool,
    pub can_delete: bool,
    pub can_share: bool,
    pub can_download: bool,
    pub can_view: bool,
}

/// Album with its owner, as returned by create, update, check and listings
#[derive(Debug, Clone, Serialize)]
pub struct AlbumView {
    #[serde(flatten)]
    pub album: Album,
    pub photographer: Option<UserSummary>,
    #[serde(rename = "isShared", skip_serializing_if = "Option::is_none")]
    pub is_shared: Option<bool>,
    #[serde(rename = "shareInfo", skip_serializing_if = "Option::is_none")]
    pub share_info: Option<ViewerShareInfo>,
}

impl AlbumView {
    pub fn new(album: Album, photographer: Option<UserSummary>) -> Self {
        Self {
            album,
            photographer,
            is_shared: None,
            share_info: None,
        }
    }
}

/// Accepted share listed on the detail view for owners and admins
#[derive(Debug, Clone, Serialize)]
pub struct ShareRecipient {
    #[serde(rename = "albumShare_id")]
    pub album_share_id: i64,
    pub user_id: i64,
    #[serde(rename = "userName")]
    pub user_name: String,
    #[serde(rename = "userEmail")]
    pub user_email: String,
    pub description: Option<String>,
    pub status: bool,
    #[serde(rename = "sharedAt")]
    pub shared_at: DateTime<Utc>,
    #[serde(rename = "sharedBy")]
    pub shared_by: Option<i64>,
}

/// Response of `GET /albums/:id`
#[derive(Debug, Clone, Serialize)]
pub struct AlbumDetail {
    #[serde(flatten)]
    pub album: Album,
    pub photographer: Option<UserSummary>,
    pub metadata: AlbumMetadata,
    #[serde(rename = "isOwner", skip_serializing_if = "Option::is_none")]
    pub is_owner: Option<bool>,
    #[serde(rename = "isShared", skip_serializing_if = "Option::is_none")]
    pub is_shared: Option<bool>,
    #[serde(rename = "shareInfo", skip_serializing_if = "Option::is_none")]
    pub share_info: Option<ViewerShareInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<AlbumPermissions>,
    #[serde(rename = "allShares", skip_serializing_if = "Option::is_none")]
    pub all_shares: Option<Vec<ShareRecipient>>,
}

/// Response of `GET /albums/:id/share-link/:mode`
#[derive(Debug, Clone, Serialize)]
pub struct ShareLinkInfo {
    pub album_id: i64,
    pub album_title: String,
    pub album_no: String,
    pub shaplink: String,
    #[serde(rename = "shareLink")]
    pub share_link: String,
    pub mode: String,
    pub photographer: Option<UserSummary>,
    #[serde(rename = "setExpiryDate")]
    pub set_expiry_date: Option<DateTime<Utc>>,
    pub status: bool,
}

/// Album fields embedded in share responses
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlbumSummary {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub albums_id: i64,
    pub album_title: String,
    pub event_type_id: i64,
    pub event_date: NaiveDate,
    pub client_name: String,
    pub album_no: String,
    pub shaplink: String,
}

impl From<&Album> for AlbumSummary {
    fn from(album: &Album) -> Self {
        Self {
            id: album.id,
            albums_id: album.albums_id,
            album_title: album.album_title.clone(),
            event_type_id: album.event_type_id,
            event_date: album.event_date,
            client_name: album.client_name.clone(),
            album_no: album.album_no.clone(),
            shaplink: album.shaplink.clone(),
        }
    }
}
