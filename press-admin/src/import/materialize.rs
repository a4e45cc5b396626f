//! Import materialization
//!
//! Turns classified items into stored posts and pages, one item at a time.
//! Items without a title, body or usable slug are skipped. A storage failure
//! is recorded against its item and the batch carries on.

use chrono::{DateTime, Utc};
use press_common::{create_slug, time};
use tracing::{debug, warn};

use super::classify::ClassifiedItem;
use super::mapper::{map_item, MappedContent};
use super::report::ImportReport;
use super::store::{Collection, ContentStore, NewContent};

/// Longest generated meta description, in characters
pub const META_DESCRIPTION_MAX_CHARS: usize = 160;

/// Where the caller wants items to go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImportTarget {
    /// Route by the WXR post type; everything else becomes a post
    #[default]
    Auto,
    Posts,
    Pages,
}

impl ImportTarget {
    /// Parse a form value; anything unrecognised means `Auto`
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_lowercase()).as_deref() {
            Some("posts") => ImportTarget::Posts,
            Some("pages") => ImportTarget::Pages,
            _ => ImportTarget::Auto,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ImportTarget::Auto => "auto",
            ImportTarget::Posts => "posts",
            ImportTarget::Pages => "pages",
        }
    }
}

/// What happened to one item
#[derive(Debug, Clone, PartialEq, Eq)]
enum ItemOutcome {
    Imported(Collection),
    Skipped,
}

/// Destination collection for a mapped item
pub fn destination(target: ImportTarget, mapped: &MappedContent) -> Collection {
    match target {
        ImportTarget::Posts => Collection::Posts,
        ImportTarget::Pages => Collection::Pages,
        ImportTarget::Auto => match mapped.post_type_hint.as_deref() {
            Some(hint) if hint.eq_ignore_ascii_case("page") => Collection::Pages,
            _ => Collection::Posts,
        },
    }
}

/// Whether a status token means published
pub fn is_published(status: Option<&str>) -> bool {
    status.is_some_and(|s| s.eq_ignore_ascii_case("publish") || s.eq_ignore_ascii_case("published"))
}

/// Effective publication timestamp
///
/// Unpublished items never get one. Published items keep their own date,
/// or `now` when the feed had none.
pub fn effective_published_at(
    published: bool,
    mapped_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    if published {
        Some(mapped_at.unwrap_or(now))
    } else {
        None
    }
}

/// Meta description from the first characters of the excerpt
pub fn meta_description(excerpt: Option<&str>) -> Option<String> {
    excerpt
        .map(|e| e.chars().take(META_DESCRIPTION_MAX_CHARS).collect::<String>())
        .filter(|d| !d.is_empty())
}

/// Low-order digits of the current epoch milliseconds
fn time_suffix() -> String {
    let millis = Utc::now().timestamp_millis().to_string();
    millis[millis.len().saturating_sub(6)..].to_string()
}

/// Find a slug not yet used in the collection
///
/// Taken slugs get `-<time digits>-<n>` appended until one is free. This is
/// check-then-insert: a concurrent writer can still claim the same slug, in
/// which case the table's unique constraint rejects the later insert.
pub async fn resolve_unique_slug(
    store: &dyn ContentStore,
    collection: Collection,
    base: &str,
) -> press_common::Result<String> {
    let mut candidate = base.to_string();
    let mut counter = 1u32;

    while store.find_by_slug(collection, &candidate).await?.is_some() {
        candidate = format!("{}-{}-{}", base, time_suffix(), counter);
        counter += 1;
    }

    Ok(candidate)
}

async fn import_item(
    item: &ClassifiedItem<'_>,
    target: ImportTarget,
    store: &dyn ContentStore,
    author_id: &str,
) -> press_common::Result<ItemOutcome> {
    let mapped = map_item(item);

    let (Some(title), Some(content)) = (non_blank(&mapped.title), non_blank(&mapped.content)) else {
        return Ok(ItemOutcome::Skipped);
    };

    let collection = destination(target, &mapped);

    let slug_source = non_blank(&mapped.slug_seed).unwrap_or(title);
    let base_slug = create_slug(slug_source);
    if base_slug.is_empty() {
        return Ok(ItemOutcome::Skipped);
    }

    let slug = resolve_unique_slug(store, collection, &base_slug).await?;

    let published = is_published(mapped.status.as_deref());
    let published_at = effective_published_at(published, mapped.published_at, time::now());

    let record = store
        .create(NewContent {
            collection,
            title: title.to_string(),
            slug,
            content: content.to_string(),
            excerpt: match collection {
                Collection::Posts => mapped.excerpt.clone(),
                Collection::Pages => None,
            },
            featured_image: mapped.featured_image.clone(),
            meta_title: Some(title.to_string()),
            meta_description: meta_description(mapped.excerpt.as_deref()),
            published,
            published_at,
            author_id: author_id.to_string(),
        })
        .await?;

    debug!(
        collection = collection.table(),
        slug = %record.slug,
        published,
        "Imported item"
    );

    Ok(ItemOutcome::Imported(collection))
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Store every item, sequentially, and report the outcome
pub async fn materialize(
    items: &[ClassifiedItem<'_>],
    target: ImportTarget,
    store: &dyn ContentStore,
    author_id: &str,
) -> ImportReport {
    let mut report = ImportReport::new();

    for (index, item) in items.iter().enumerate() {
        match import_item(item, target, store, author_id).await {
            Ok(ItemOutcome::Imported(collection)) => report.record_imported(collection),
            Ok(ItemOutcome::Skipped) => report.record_skipped(),
            Err(e) => {
                warn!(item = index, error = %e, "Failed to import item");
                report.record_failure(e.to_string());
            }
        }
    }

    report
}
