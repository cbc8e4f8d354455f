//! HTTP request handlers.

/// Article read, update and sync endpoints.
pub mod articles;
/// Home page endpoints.
pub mod home;
