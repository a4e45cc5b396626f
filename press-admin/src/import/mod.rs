//! Content import pipeline
//!
//! XML bytes flow one way through four stages:
//! 1. [`feed`] parses XML into an untyped node tree
//! 2. [`classify`] detects WXR vs. generic feeds and collects the items
//! 3. [`mapper`] extracts canonical fields per item
//! 4. [`materialize`] stores each item and builds the [`ImportReport`]
//!
//! Only unparseable XML and a feed without items abort the batch. Every
//! other problem is confined to its item and shows up in the report.

pub mod classify;
pub mod feed;
pub mod mapper;
pub mod materialize;
pub mod report;
pub mod store;

pub use classify::{ClassifiedItem, FeedKind};
pub use feed::FeedNode;
pub use mapper::MappedContent;
pub use materialize::ImportTarget;
pub use report::ImportReport;
pub use store::{Collection, ContentRecord, ContentStore, NewContent};

use thiserror::Error;
use tracing::info;

/// Errors that abort a whole import batch
#[derive(Debug, Error)]
pub enum ImportError {
    /// The upload is not well-formed XML
    #[error("{0}")]
    MalformedInput(String),

    /// Neither the WXR layout nor any known container held items
    #[error("Could not find recognizable content items in XML")]
    NoRecognizableItems,
}

/// Run the whole pipeline over an XML document
pub async fn run_import(
    xml: &str,
    target: ImportTarget,
    store: &dyn ContentStore,
    author_id: &str,
) -> Result<ImportReport, ImportError> {
    let root = feed::parse_feed(xml)?;
    let items = classify::classify(&root)?;

    let kind = items
        .first()
        .map(|item| item.kind().as_str())
        .unwrap_or("none");
    info!(
        format = kind,
        items = items.len(),
        target = target.as_str(),
        "Importing feed"
    );

    let report = materialize::materialize(&items, target, store, author_id).await;

    info!(
        imported = report.total_imported(),
        imported_posts = report.imported_posts,
        imported_pages = report.imported_pages,
        skipped = report.skipped,
        errors = report.errors.len(),
        "Import finished"
    );

    Ok(report)
}
