//! Data models for API requests, responses and persisted JSON.

/// Article records, documents and update payloads.
pub mod article;
/// Home feed and resource list.
pub mod home;
