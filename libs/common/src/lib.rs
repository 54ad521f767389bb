//! Common library for the studio albums backend
//!
//! Shared storage plumbing used by the services: PostgreSQL pooling and
//! schema bootstrap, the Redis client, storage error types, and the
//! sequence allocators that hand out numeric ids.
//!
//! ```rust,no_run
//! use common::database::{DatabaseConfig, init_pool, health_check};
//! use common::sequence::{PgSequence, SequenceAllocator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DatabaseConfig::from_env()?;
//!     let pool = init_pool(&config).await?;
//!     assert!(health_check(&pool).await?);
//!     let next = PgSequence::new(pool).next_value("album_no").await?;
//!     println!("next album number: {}", next);
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod database;
pub mod error;
pub mod sequence;

pub use sequence::SequenceAllocator;
