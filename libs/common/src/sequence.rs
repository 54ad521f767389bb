//! Monotonic counters used to allocate numeric surrogate ids
//!
//! Atomicity is the allocator's job: every implementation here hands out each
//! value at most once, even under concurrent callers.

use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::{DatabaseError, DatabaseResult};

/// Source of strictly increasing values per named sequence
#[async_trait]
pub trait SequenceAllocator: Send + Sync {
    /// Allocate the next value of `sequence`
    async fn next_value(&self, sequence: &str) -> DatabaseResult<i64>;
}

/// PostgreSQL `nextval` backed allocator
///
/// Sequence `foo` maps to the database sequence `foo_seq`, which must exist.
#[derive(Clone)]
pub struct PgSequence {
    pool: PgPool,
}

impl PgSequence {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SequenceAllocator for PgSequence {
    async fn next_value(&self, sequence: &str) -> DatabaseResult<i64> {
        let value: i64 = sqlx::query_scalar("SELECT nextval($1::regclass)")
            .bind(format!("{}_seq", sequence))
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        Ok(value)
    }
}

/// In-process allocator, used by the memory store backend
#[derive(Clone, Default)]
pub struct MemorySequence {
    counters: Arc<Mutex<HashMap<String, i64>>>,
}

impl MemorySequence {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SequenceAllocator for MemorySequence {
    async fn next_value(&self, sequence: &str) -> DatabaseResult<i64> {
        let mut counters = self
            .counters
            .lock()
            .map_err(|_| DatabaseError::Sequence("sequence lock poisoned".to_string()))?;
        let counter = counters.entry(sequence.to_string()).or_insert(0);
        *counter += 1;
        Ok(*counter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[tokio::test]
    async fn test_memory_sequence_starts_at_one_per_name() {
        let sequence = MemorySequence::new();
        assert_eq!(sequence.next_value("albums").await.unwrap(), 1);
        assert_eq!(sequence.next_value("albums").await.unwrap(), 2);
        assert_eq!(sequence.next_value("album_shares").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_memory_sequence_is_unique_under_concurrency() {
        let sequence = MemorySequence::new();
        let mut handles = Vec::new();
        for _ in 0..32 {
            let sequence = sequence.clone();
            handles.push(tokio::spawn(async move {
                sequence.next_value("album_no").await.unwrap()
            }));
        }

        let mut seen = HashSet::new();
        for handle in handles {
            assert!(seen.insert(handle.await.unwrap()));
        }
        assert_eq!(seen.len(), 32);
        assert_eq!(seen.iter().max(), Some(&32));
    }
}
