//! Home page models.

use super::article::IndexEntry;
use serde::{Deserialize, Serialize};

/// External resource listed on the home page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Resource {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub url: String,
}

/// Data backing the home page: resources plus the newest articles.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HomeFeed {
    pub resources: Vec<Resource>,
    pub articles: Vec<IndexEntry>,
}
