//! Activity feed rows

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ActivityEntry {
    pub activity_id: i64,
    pub user_id: i64,
    pub emoji: String,
    pub activity: String,
    pub status: bool,
    pub updated_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Kinds of activity recorded by the album workflows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivityKind {
    AlbumCreated { album_title: String },
    ShaplinkGenerated { album_title: String, shaplink: String },
    AlbumUpdated { album_title: String },
    PasswordSet { album_title: String },
    AlbumViewed { album_title: String },
    AlbumShared { album_title: String, recipient: String },
    QrCodeGenerated { album_title: String },
    Error { operation: String, message: String },
}

impl ActivityKind {
    pub fn emoji(&self) -> &'static str {
        match self {
            ActivityKind::AlbumCreated { .. } => "📸",
            ActivityKind::ShaplinkGenerated { .. } => "🔗",
            ActivityKind::AlbumUpdated { .. } => "✏️",
            ActivityKind::PasswordSet { .. } => "🔒",
            ActivityKind::AlbumViewed { .. } => "👁️",
            ActivityKind::AlbumShared { .. } => "📤",
            ActivityKind::QrCodeGenerated { .. } => "📱",
            ActivityKind::Error { .. } => "⚠️",
        }
    }

    pub fn describe(&self) -> String {
        match self {
            ActivityKind::AlbumCreated { album_title } => format!("album '{}' created", album_title),
            ActivityKind::ShaplinkGenerated {
                album_title,
                shaplink,
            } => format!("Shaplink '{}' generated for album '{}'", shaplink, album_title),
            ActivityKind::AlbumUpdated { album_title } => format!("album '{}' updated", album_title),
            ActivityKind::PasswordSet { album_title } => {
                format!("password protection set for album '{}'", album_title)
            }
            ActivityKind::AlbumViewed { album_title } => format!("album '{}' viewed", album_title),
            ActivityKind::AlbumShared {
                album_title,
                recipient,
            } => format!("album '{}' shared with '{}'", album_title, recipient),
            ActivityKind::QrCodeGenerated { album_title } => {
                format!("QR Code generated for album '{}'", album_title)
            }
            ActivityKind::Error { operation, message } => {
                format!("{} error: {}", operation, message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_text() {
        let kind = ActivityKind::AlbumShared {
            album_title: "Wedding".to_string(),
            recipient: "Asha".to_string(),
        };
        assert_eq!(kind.emoji(), "📤");
        assert_eq!(kind.describe(), "album 'Wedding' shared with 'Asha'");

        let kind = ActivityKind::Error {
            operation: "Album Creation".to_string(),
            message: "pool timed out".to_string(),
        };
        assert_eq!(kind.describe(), "Album Creation error: pool timed out");
    }
}
