//! Song catalog abstraction for Lydbot.
//!
//! A catalog turns a free-text query into a single playable result.

mod youtube;

pub use youtube::YoutubeCatalog;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// The first match for a search query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Title.
    pub title: String,
    /// Duration in seconds, 0 when unknown.
    pub duration: u64,
    /// Canonical URL of the media.
    pub url: String,
    /// Thumbnail URL, possibly empty.
    pub thumbnail: String,
}

/// Trait for song search providers.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Search the catalog and return the first match.
    ///
    /// Returns [`crate::LydError::NoResults`] when nothing matched.
    async fn search(&self, query: &str) -> Result<SearchResult>;
}
