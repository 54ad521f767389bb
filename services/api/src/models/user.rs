//! User and event type records read by the album workflows
//!
//! Both are created and maintained outside this service.

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub user_id: i64,
    pub name: String,
    pub studio_name: Option<String>,
    pub email: String,
    pub mobile: Option<String>,
    pub role_id: i64,
    pub status: bool,
    pub login_permission: bool,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// Public subset of a user embedded in album and share responses
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserSummary {
    pub user_id: i64,
    pub name: String,
    pub studio_name: Option<String>,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
}

impl User {
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            user_id: self.user_id,
            name: self.name.clone(),
            studio_name: self.studio_name.clone(),
            email: self.email.clone(),
            mobile: None,
        }
    }

    /// Summary including the mobile number
    pub fn contact_summary(&self) -> UserSummary {
        UserSummary {
            mobile: self.mobile.clone(),
            ..self.summary()
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EventType {
    pub event_type_id: i64,
    pub event_type: String,
    pub status: bool,
}
