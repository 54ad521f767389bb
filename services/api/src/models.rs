//! API models for request and response payloads

pub mod activity;
pub mod album;
pub mod envelope;
pub mod pagination;
pub mod share;
pub mod user;
