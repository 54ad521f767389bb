//! Album and share workflows on top of the store traits

pub mod activity;
pub mod albums;
pub mod identifiers;
pub mod permissions;
pub mod shares;
pub mod validation;

pub use albums::AlbumService;
pub use shares::{ShareService, ShareTarget};
