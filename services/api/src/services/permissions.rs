//! Ownership and role based album permissions

use crate::models::{
    album::{Album, AlbumPermissions},
    share::AlbumShare,
};

/// Pure permission rules; the admin role id comes from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessPolicy {
    pub admin_role_id: i64,
}

impl AccessPolicy {
    pub fn new(admin_role_id: i64) -> Self {
        Self { admin_role_id }
    }

    pub fn is_admin(&self, role_id: i64) -> bool {
        role_id == self.admin_role_id
    }

    /// Owner or admin
    pub fn can_manage(&self, album: &Album, requester_id: i64, role_id: i64) -> bool {
        album.photographer_id == requester_id || self.is_admin(role_id)
    }

    pub fn evaluate(&self, album: &Album, requester_id: i64, role_id: i64) -> AlbumPermissions {
        let manage = self.can_manage(album, requester_id, role_id);

        AlbumPermissions {
            can_edit: manage,
            can_delete: manage,
            can_share: manage,
            can_download: album.enable_downloads || manage,
            can_view: true,
        }
    }
}

/// Whether `share` is an active accepted share on `album`
pub fn is_shared(share: Option<&AlbumShare>, album: &Album) -> bool {
    share.is_some_and(|s| s.album_ref == album.id && s.grants_access())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::album::fixtures;
    use crate::models::share::{AcceptState, SharedBy};
    use chrono::Utc;

    const POLICY: AccessPolicy = AccessPolicy { admin_role_id: 1 };

    #[test]
    fn test_download_needs_flag_ownership_or_admin() {
        let mut album = fixtures::album(1, 7);

        assert!(!POLICY.evaluate(&album, 9, 2).can_download);
        assert!(POLICY.evaluate(&album, 7, 2).can_download);
        assert!(POLICY.evaluate(&album, 9, 1).can_download);

        album.enable_downloads = true;
        assert!(POLICY.evaluate(&album, 9, 2).can_download);
    }

    #[test]
    fn test_edit_rights() {
        let album = fixtures::album(1, 7);

        let stranger = POLICY.evaluate(&album, 9, 2);
        assert!(!stranger.can_edit && !stranger.can_delete && !stranger.can_share);
        assert!(stranger.can_view);

        let owner = POLICY.evaluate(&album, 7, 2);
        assert!(owner.can_edit && owner.can_delete && owner.can_share);

        let admin = AccessPolicy::new(3).evaluate(&album, 9, 3);
        assert!(admin.can_edit);
        assert!(!AccessPolicy::new(3).evaluate(&album, 9, 1).can_edit);
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let album = fixtures::album(1, 7);
        assert_eq!(POLICY.evaluate(&album, 9, 2), POLICY.evaluate(&album, 9, 2));
    }

    #[test]
    fn test_is_shared() {
        let album = fixtures::album(1, 7);
        let now = Utc::now();
        let mut share = AlbumShare {
            album_share_id: 1,
            user_id: 9,
            album_ref: album.id,
            shared_by: SharedBy::QrCode,
            description: None,
            accept_share: AcceptState::Pending,
            status: true,
            created_by: None,
            updated_by: None,
            created_at: now,
            updated_at: now,
        };

        assert!(!is_shared(None, &album));
        assert!(!is_shared(Some(&share), &album));

        share.accept_share = AcceptState::Accepted;
        assert!(is_shared(Some(&share), &album));

        share.status = false;
        assert!(!is_shared(Some(&share), &album));

        share.status = true;
        share.album_ref = uuid::Uuid::new_v4();
        assert!(!is_shared(Some(&share), &album));
    }
}
