//! Best-effort activity feed writes

use chrono::Utc;
use std::sync::Arc;
use tracing::{error, warn};

use common::SequenceAllocator;

use crate::error::ApiError;
use crate::models::activity::{ActivityEntry, ActivityKind};
use crate::repositories::{ActivityStore, schema::ACTIVITY_SEQUENCE};

const MAX_ACTIVITY_LEN: usize = 500;

/// Writes activity rows; failures are logged and never returned
#[derive(Clone)]
pub struct ActivityRecorder {
    store: Arc<dyn ActivityStore>,
    sequences: Arc<dyn SequenceAllocator>,
}

impl ActivityRecorder {
    pub fn new(store: Arc<dyn ActivityStore>, sequences: Arc<dyn SequenceAllocator>) -> Self {
        Self { store, sequences }
    }

    pub async fn record(&self, user_id: i64, kind: ActivityKind, updated_by: Option<i64>) {
        if let Err(e) = self.try_record(user_id, &kind, updated_by).await {
            warn!(user_id, error = %e, "Failed to record activity");
        }
    }

    /// Record a failed operation against the acting user
    pub async fn record_error(&self, user_id: i64, operation: &str, message: &str) {
        let kind = ActivityKind::Error {
            operation: operation.to_string(),
            message: message.to_string(),
        };
        self.record(user_id, kind, Some(user_id)).await;
    }

    /// Log a server-side failure and leave an error row for the acting user
    ///
    /// Caller errors pass through untouched.
    pub async fn report(&self, user_id: Option<i64>, operation: &str, err: ApiError) -> ApiError {
        if err.is_internal() {
            error!(operation, error = %err, "Operation failed");
            if let Some(user_id) = user_id {
                self.record_error(user_id, operation, &err.to_string()).await;
            }
        }
        err
    }

    async fn try_record(
        &self,
        user_id: i64,
        kind: &ActivityKind,
        updated_by: Option<i64>,
    ) -> common::error::DatabaseResult<()> {
        let activity_id = self.sequences.next_value(ACTIVITY_SEQUENCE).await?;
        let now = Utc::now();
        let entry = ActivityEntry {
            activity_id,
            user_id,
            emoji: kind.emoji().to_string(),
            activity: kind.describe().chars().take(MAX_ACTIVITY_LEN).collect(),
            status: true,
            updated_by,
            created_at: now,
            updated_at: now,
        };

        self.store.insert_activity(&entry).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::memory::MemoryStore;
    use async_trait::async_trait;
    use common::error::{DatabaseError, DatabaseResult};
    use common::sequence::MemorySequence;

    struct BrokenStore;

    #[async_trait]
    impl ActivityStore for BrokenStore {
        async fn insert_activity(&self, _entry: &ActivityEntry) -> DatabaseResult<()> {
            Err(DatabaseError::Sequence("feed unavailable".to_string()))
        }
    }

    #[tokio::test]
    async fn test_record_truncates_long_text() {
        let store = MemoryStore::new(false);
        let recorder = ActivityRecorder::new(Arc::new(store.clone()), Arc::new(MemorySequence::new()));

        recorder
            .record_error(7, "Album Creation", &"x".repeat(800))
            .await;

        let rows = store.activity().await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].activity_id, 1);
        assert_eq!(rows[0].activity.chars().count(), 500);
        assert_eq!(rows[0].emoji, "⚠️");
    }

    #[tokio::test]
    async fn test_store_failures_are_swallowed() {
        let recorder = ActivityRecorder::new(Arc::new(BrokenStore), Arc::new(MemorySequence::new()));
        recorder
            .record(
                7,
                ActivityKind::AlbumViewed {
                    album_title: "Wedding".to_string(),
                },
                Some(7),
            )
            .await;
    }

    #[tokio::test]
    async fn test_report_records_only_internal_failures() {
        let store = MemoryStore::new(false);
        let recorder = ActivityRecorder::new(Arc::new(store.clone()), Arc::new(MemorySequence::new()));

        let err = recorder
            .report(Some(7), "Album Update", ApiError::NotFound("Album not found".into()))
            .await;
        assert!(matches!(err, ApiError::NotFound(_)));
        assert!(store.activity().await.is_empty());

        let err = recorder
            .report(
                Some(7),
                "Album Update",
                ApiError::Database(DatabaseError::Sequence("down".into())),
            )
            .await;
        assert!(err.is_internal());
        let rows = store.activity().await;
        assert_eq!(rows.len(), 1);
        assert!(rows[0].activity.starts_with("Album Update error:"));
    }
}
