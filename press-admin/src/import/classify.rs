//! Feed classification
//!
//! Decides whether a parsed feed is a WordPress export (WXR) or a generic
//! XML feed and pulls out the content items.

use super::feed::{as_sequence, FeedNode};
use super::ImportError;

/// Item fields that only WordPress exports carry
const WXR_ITEM_FIELDS: &[&str] = &["wp:post_name", "wp:post_type", "wp:post_date", "wp:status"];

/// Container paths searched for generic feeds, in priority order.
/// The last segment names the item element.
const GENERIC_ITEM_PATHS: &[&[&str]] = &[
    &["posts", "post"],
    &["pages", "page"],
    &["items", "item"],
    &["rss", "channel", "item"],
    &["entry"],
    &["articles", "article"],
    &["post"],
    &["page"],
    &["item"],
];

/// Feed format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedKind {
    Wxr,
    Generic,
}

impl FeedKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedKind::Wxr => "wxr",
            FeedKind::Generic => "generic",
        }
    }
}

/// A content item tagged with the format it came from
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClassifiedItem<'a> {
    Wxr(&'a FeedNode),
    Generic(&'a FeedNode),
}

impl<'a> ClassifiedItem<'a> {
    pub fn kind(&self) -> FeedKind {
        match self {
            ClassifiedItem::Wxr(_) => FeedKind::Wxr,
            ClassifiedItem::Generic(_) => FeedKind::Generic,
        }
    }

    pub fn raw(&self) -> &'a FeedNode {
        match self {
            ClassifiedItem::Wxr(node) | ClassifiedItem::Generic(node) => node,
        }
    }
}

/// Whether the feed is a WordPress WXR export
///
/// True when `rss > channel > item` holds at least one item carrying
/// WordPress post fields under the `wp:` prefix.
pub fn is_wxr(root: &FeedNode) -> bool {
    let Some(channel) = root.get_path(&["rss", "channel"]) else {
        return false;
    };

    as_sequence(channel, "item")
        .iter()
        .any(|item| WXR_ITEM_FIELDS.iter().any(|field| item.get(field).is_some()))
}

/// Items found at a container path, or none
fn items_at<'a>(root: &'a FeedNode, path: &[&str]) -> Vec<&'a FeedNode> {
    let Some((item_key, containers)) = path.split_last() else {
        return Vec::new();
    };

    match root.get_path(containers) {
        Some(container) => as_sequence(container, item_key),
        None => Vec::new(),
    }
}

/// Classify a parsed feed into its content items
///
/// Fails with `NoRecognizableItems` when neither the WXR layout nor any
/// generic container yields an item; there is nothing to import then.
pub fn classify(root: &FeedNode) -> Result<Vec<ClassifiedItem<'_>>, ImportError> {
    if is_wxr(root) {
        let items = items_at(root, &["rss", "channel", "item"]);
        return Ok(items.into_iter().map(ClassifiedItem::Wxr).collect());
    }

    GENERIC_ITEM_PATHS
        .iter()
        .map(|path| items_at(root, path))
        .find(|items| !items.is_empty())
        .map(|items| items.into_iter().map(ClassifiedItem::Generic).collect())
        .ok_or(ImportError::NoRecognizableItems)
}
