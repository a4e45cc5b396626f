//! Field mapping from feed items to canonical content
//!
//! Each canonical field has an ordered list of source keys per format. The
//! first key with a non-empty value wins. Mapping is deliberately lossy:
//! unknown fields are ignored and nothing here fails.

use chrono::{DateTime, Utc};
use press_common::time::parse_date_like;

use super::classify::ClassifiedItem;
use super::feed::{first_string, FeedNode};

/// WordPress export field priorities
pub mod wxr_fields {
    pub const TITLE: &[&str] = &["title"];
    pub const CONTENT: &[&str] = &["content:encoded", "description"];
    pub const EXCERPT: &[&str] = &["excerpt:encoded"];
    pub const SLUG: &[&str] = &["wp:post_name", "link", "guid"];
    pub const STATUS: &[&str] = &["wp:status"];
    pub const POST_TYPE: &[&str] = &["wp:post_type"];
    pub const DATE: &[&str] = &["pubDate", "wp:post_date"];
    pub const IMAGE: &[&str] = &["featured_image", "wp:attachment_url"];
}

/// Generic feed field priorities
pub mod generic_fields {
    pub const TITLE: &[&str] = &["title", "name", "headline"];
    pub const CONTENT: &[&str] = &["content:encoded", "content", "body", "description", "html"];
    pub const EXCERPT: &[&str] = &["excerpt", "summary", "description_short"];
    pub const SLUG: &[&str] = &["slug", "link", "permalink", "guid"];
    pub const STATUS: &[&str] = &["status", "post_status", "state"];
    pub const DATE: &[&str] = &["date", "pubDate", "published", "created_at"];
    pub const IMAGE: &[&str] = &["featured_image", "thumbnail", "image", "wp:attachment_url"];
}

/// Format-independent content extracted from one feed item
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MappedContent {
    pub title: Option<String>,
    /// HTML body
    pub content: Option<String>,
    pub excerpt: Option<String>,
    /// Explicit slug, permalink or guid to derive the slug from
    pub slug_seed: Option<String>,
    /// Raw status token such as "publish" or "draft"
    pub status: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub featured_image: Option<String>,
    /// WordPress post type ("post", "page", ...); WXR only
    pub post_type_hint: Option<String>,
}

/// First candidate whose value parses as a date-time
pub fn first_date(node: &FeedNode, keys: &[&str]) -> Option<DateTime<Utc>> {
    keys.iter()
        .filter_map(|key| first_string(node, &[*key]))
        .find_map(|value| parse_date_like(&value))
}

/// Map a WordPress WXR `<item>`
pub fn map_wxr(node: &FeedNode) -> MappedContent {
    MappedContent {
        title: first_string(node, wxr_fields::TITLE),
        content: first_string(node, wxr_fields::CONTENT),
        excerpt: first_string(node, wxr_fields::EXCERPT),
        slug_seed: first_string(node, wxr_fields::SLUG),
        status: first_string(node, wxr_fields::STATUS),
        published_at: first_date(node, wxr_fields::DATE),
        featured_image: first_string(node, wxr_fields::IMAGE),
        post_type_hint: first_string(node, wxr_fields::POST_TYPE),
    }
}

/// Map an item from an arbitrary XML feed
pub fn map_generic(node: &FeedNode) -> MappedContent {
    MappedContent {
        title: first_string(node, generic_fields::TITLE),
        content: first_string(node, generic_fields::CONTENT),
        excerpt: first_string(node, generic_fields::EXCERPT),
        slug_seed: first_string(node, generic_fields::SLUG),
        status: first_string(node, generic_fields::STATUS),
        published_at: first_date(node, generic_fields::DATE),
        featured_image: first_string(node, generic_fields::IMAGE),
        post_type_hint: None,
    }
}

/// Map a classified item with the mapper for its format
pub fn map_item(item: &ClassifiedItem<'_>) -> MappedContent {
    match item {
        ClassifiedItem::Wxr(node) => map_wxr(node),
        ClassifiedItem::Generic(node) => map_generic(node),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::feed::parse_feed;
    use chrono::Datelike;

    fn item(xml: &str) -> FeedNode {
        let root = parse_feed(xml).unwrap();
        root.get("item").cloned().unwrap()
    }

    #[test]
    fn test_wxr_full_item() {
        let node = item(
            r#"<item>
                <title>Hello</title>
                <link>https://blog.example.com/hello/</link>
                <pubDate>Mon, 15 Feb 2021 10:30:00 +0000</pubDate>
                <guid isPermaLink="false">https://blog.example.com/?p=1</guid>
                <description></description>
                <content:encoded><![CDATA[<p>Hi</p>]]></content:encoded>
                <excerpt:encoded><![CDATA[Short]]></excerpt:encoded>
                <wp:post_name>hello-there</wp:post_name>
                <wp:status>publish</wp:status>
                <wp:post_type>post</wp:post_type>
                <wp:post_date>2021-02-15 10:30:00</wp:post_date>
            </item>"#,
        );

        let mapped = map_wxr(&node);
        assert_eq!(mapped.title.as_deref(), Some("Hello"));
        assert_eq!(mapped.content.as_deref(), Some("<p>Hi</p>"));
        assert_eq!(mapped.excerpt.as_deref(), Some("Short"));
        assert_eq!(mapped.slug_seed.as_deref(), Some("hello-there"));
        assert_eq!(mapped.status.as_deref(), Some("publish"));
        assert_eq!(mapped.post_type_hint.as_deref(), Some("post"));
        assert_eq!(mapped.published_at.map(|d| d.year()), Some(2021));
        assert_eq!(mapped.featured_image, None);
    }

    #[test]
    fn test_wxr_falls_back_to_description_and_link() {
        let node = item(
            r#"<item>
                <title>T</title>
                <description>Plain body</description>
                <link>https://blog.example.com/t/</link>
                <wp:post_name></wp:post_name>
            </item>"#,
        );

        let mapped = map_wxr(&node);
        assert_eq!(mapped.content.as_deref(), Some("Plain body"));
        assert_eq!(mapped.slug_seed.as_deref(), Some("https://blog.example.com/t/"));
    }

    #[test]
    fn test_wxr_skips_unparseable_date() {
        let node = item(
            r#"<item>
                <pubDate>not a date</pubDate>
                <wp:post_date>2018-05-06 07:08:09</wp:post_date>
            </item>"#,
        );
        assert_eq!(map_wxr(&node).published_at.map(|d| d.year()), Some(2018));

        let draft = item("<item><wp:post_date>0000-00-00 00:00:00</wp:post_date></item>");
        assert_eq!(map_wxr(&draft).published_at, None);
    }

    #[test]
    fn test_generic_prefers_content_over_description() {
        let node = item(
            "<item><title>T</title><content>Main</content><description>Other</description></item>",
        );
        assert_eq!(map_generic(&node).content.as_deref(), Some("Main"));
    }

    #[test]
    fn test_generic_title_fallbacks() {
        let node = item("<item><title>  </title><headline>Head</headline><name>Named</name></item>");
        assert_eq!(map_generic(&node).title.as_deref(), Some("Named"));
    }

    #[test]
    fn test_generic_remaining_fields() {
        let node = item(
            r#"<item>
                <headline>H</headline>
                <html>&lt;b&gt;x&lt;/b&gt;</html>
                <summary>Sum</summary>
                <permalink>/a/b</permalink>
                <state>Published</state>
                <published>garbage</published>
                <created_at>2022-01-02T03:04:05Z</created_at>
                <thumbnail>https://img.example.com/t.png</thumbnail>
            </item>"#,
        );

        let mapped = map_generic(&node);
        assert_eq!(mapped.title.as_deref(), Some("H"));
        assert_eq!(mapped.content.as_deref(), Some("<b>x</b>"));
        assert_eq!(mapped.excerpt.as_deref(), Some("Sum"));
        assert_eq!(mapped.slug_seed.as_deref(), Some("/a/b"));
        assert_eq!(mapped.status.as_deref(), Some("Published"));
        assert_eq!(mapped.published_at.map(|d| d.year()), Some(2022));
        assert_eq!(
            mapped.featured_image.as_deref(),
            Some("https://img.example.com/t.png")
        );
        assert_eq!(mapped.post_type_hint, None);
    }

    #[test]
    fn test_generic_ignores_post_type() {
        let node = item("<item><title>T</title><wp:post_type>page</wp:post_type></item>");
        assert_eq!(map_generic(&node).post_type_hint, None);
    }

    #[test]
    fn test_empty_node_maps_to_nothing() {
        let node = FeedNode::Text("loose text".into());
        assert_eq!(map_generic(&node), MappedContent::default());
    }
}
