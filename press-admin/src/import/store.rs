//! Destination collections and the persistence seam used by the importer

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use press_common::Result;
use serde::Serialize;

/// Destination collection for imported content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Posts,
    Pages,
}

impl Collection {
    /// Backing table name
    pub fn table(&self) -> &'static str {
        match self {
            Collection::Posts => "posts",
            Collection::Pages => "pages",
        }
    }
}

/// Fields of a record about to be created
#[derive(Debug, Clone, PartialEq)]
pub struct NewContent {
    pub collection: Collection,
    pub title: String,
    pub slug: String,
    pub content: String,
    /// Stored for posts only
    pub excerpt: Option<String>,
    pub featured_image: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub author_id: String,
}

/// A stored post or page
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRecord {
    pub id: String,
    pub collection: Collection,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub featured_image: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub author_id: String,
}

/// Post/page storage as seen by the importer
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Record with this slug in the collection, if any
    async fn find_by_slug(&self, collection: Collection, slug: &str)
        -> Result<Option<ContentRecord>>;

    /// Create a new record
    async fn create(&self, content: NewContent) -> Result<ContentRecord>;
}
