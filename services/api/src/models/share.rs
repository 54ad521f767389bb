//! Album share models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use super::album::{Album, AlbumMetadata, AlbumSummary, ParseEnumError};
use super::user::UserSummary;

/// Delivery mode through which a share was created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SharedBy {
    Shaplink,
    #[serde(rename = "QRCode")]
    QrCode,
}

impl SharedBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SharedBy::Shaplink => "Shaplink",
            SharedBy::QrCode => "QRCode",
        }
    }

    /// Map the `:mode` path segment of share routes
    pub fn from_route_mode(mode: &str) -> Option<Self> {
        match mode {
            "link" | "shap" => Some(SharedBy::Shaplink),
            "qr" => Some(SharedBy::QrCode),
            _ => None,
        }
    }
}

impl FromStr for SharedBy {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Shaplink" => Ok(SharedBy::Shaplink),
            "QRCode" => Ok(SharedBy::QrCode),
            other => Err(ParseEnumError {
                kind: "shared_by",
                value: other.to_string(),
            }),
        }
    }
}

/// Recipient's answer to a share
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AcceptState {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

impl AcceptState {
    pub fn as_str(&self) -> &'static str {
        match self {
            AcceptState::Pending => "Pending",
            AcceptState::Accepted => "Accepted",
            AcceptState::Rejected => "Rejected",
        }
    }
}

impl FromStr for AcceptState {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(AcceptState::Pending),
            "Accepted" => Ok(AcceptState::Accepted),
            "Rejected" => Ok(AcceptState::Rejected),
            other => Err(ParseEnumError {
                kind: "accept_share",
                value: other.to_string(),
            }),
        }
    }
}

/// Link between a recipient and an album
///
/// `album_ref` holds the album's storage id, not its numeric `albums_id`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlbumShare {
    #[serde(rename = "albumShare_id")]
    pub album_share_id: i64,
    pub user_id: i64,
    #[serde(rename = "album_id")]
    pub album_ref: Uuid,
    pub shared_by: SharedBy,
    pub description: Option<String>,
    pub accept_share: AcceptState,
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

impl AlbumShare {
    /// Active and accepted
    pub fn grants_access(&self) -> bool {
        self.status && self.accept_share == AcceptState::Accepted
    }
}

/// Storage-level share filter; all set conditions must hold
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShareFilter {
    pub user_id: Option<i64>,
    pub album_ref: Option<Uuid>,
    pub status: Option<bool>,
    pub accept_share: Option<AcceptState>,
}

impl ShareFilter {
    pub fn matches(&self, share: &AlbumShare) -> bool {
        self.user_id.is_none_or(|id| share.user_id == id)
            && self.album_ref.is_none_or(|r| share.album_ref == r)
            && self.status.is_none_or(|s| share.status == s)
            && self.accept_share.is_none_or(|a| share.accept_share == a)
    }

    /// Active accepted shares held by a user
    pub fn granted_to(user_id: i64) -> Self {
        Self {
            user_id: Some(user_id),
            status: Some(true),
            accept_share: Some(AcceptState::Accepted),
            ..Self::default()
        }
    }
}

/// The viewer's own share as shown on album responses
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewerShareInfo {
    #[serde(rename = "albumShare_id")]
    pub album_share_id: i64,
    pub description: Option<String>,
    #[serde(rename = "sharedAt")]
    pub shared_at: DateTime<Utc>,
    #[serde(rename = "sharedBy")]
    pub shared_by: Option<i64>,
}

impl From<&AlbumShare> for ViewerShareInfo {
    fn from(share: &AlbumShare) -> Self {
        Self {
            album_share_id: share.album_share_id,
            description: share.description.clone(),
            shared_at: share.created_at,
            shared_by: share.created_by,
        }
    }
}

/// Body of `POST /album-shares/link`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DirectInviteRequest {
    pub sharelink: Option<String>,
    pub user_id: Option<i64>,
    pub description: Option<String>,
    pub shared_by: Option<SharedBy>,
}

/// Body of `PUT /album-shares`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAcceptanceRequest {
    #[serde(rename = "albumShare_id")]
    pub album_share_id: Option<i64>,
    /// Kept as text so that unknown states report a validation error
    pub accept_share: Option<String>,
}

/// Body of `PUT /album-shares/details`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateShareDetailsRequest {
    pub id: Option<i64>,
    pub description: Option<String>,
    pub status: Option<bool>,
}

/// Query of the share listings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShareListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub status: Option<bool>,
}

/// Share with its recipient and album, as returned by share endpoints
#[derive(Debug, Clone, Serialize)]
pub struct ShareView {
    #[serde(flatten)]
    pub share: AlbumShare,
    pub user: Option<UserSummary>,
    pub album: Option<AlbumSummary>,
}

/// Outcome of resolving a share token
///
/// `share_info` is `None` for a preview.
#[derive(Debug, Clone, Serialize)]
pub struct SharePreview {
    pub album: Album,
    pub photographer: Option<UserSummary>,
    #[serde(rename = "shareInfo")]
    pub share_info: Option<AlbumShare>,
    pub metadata: AlbumMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_route_modes() {
        assert_eq!(SharedBy::from_route_mode("link"), Some(SharedBy::Shaplink));
        assert_eq!(SharedBy::from_route_mode("shap"), Some(SharedBy::Shaplink));
        assert_eq!(SharedBy::from_route_mode("qr"), Some(SharedBy::QrCode));
        assert_eq!(SharedBy::from_route_mode("email"), None);
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(serde_json::to_value(SharedBy::QrCode).unwrap(), json!("QRCode"));
        assert_eq!("Rejected".parse::<AcceptState>().unwrap(), AcceptState::Rejected);
        assert!("accepted".parse::<AcceptState>().is_err());
        assert_eq!(AcceptState::default(), AcceptState::Pending);
    }

    #[test]
    fn test_filter_for_granted_shares() {
        let now = Utc::now();
        let mut share = AlbumShare {
            album_share_id: 1,
            user_id: 9,
            album_ref: Uuid::new_v4(),
            shared_by: SharedBy::Shaplink,
            description: None,
            accept_share: AcceptState::Pending,
            status: true,
            created_by: Some(9),
            updated_by: Some(9),
            created_at: now,
            updated_at: now,
        };

        let filter = ShareFilter::granted_to(9);
        assert!(!filter.matches(&share));
        assert!(!share.grants_access());

        share.accept_share = AcceptState::Accepted;
        assert!(filter.matches(&share));
        assert!(share.grants_access());

        share.status = false;
        assert!(!filter.matches(&share));
        assert!(!ShareFilter::granted_to(7).matches(&share));
    }
}
