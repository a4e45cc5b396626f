//! Integration tests for the press-admin HTTP API
//!
//! Drives the full router against an in-memory database.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use press_admin::db::SqliteContentStore;
use press_admin::import::Collection;
use press_admin::{build_router, AppState};
use press_common::db::{create_schema, ensure_admin_user};
use serde_json::Value;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tower::util::ServiceExt;

const ADMIN_EMAIL: &str = "admin@example.com";
const BOUNDARY: &str = "press-test-boundary";
const SESSION: &str = "admin-auth=authenticated";

const WXR_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"
     xmlns:content="http://purl.org/rss/1.0/modules/content/"
     xmlns:excerpt="http://wordpress.org/export/1.2/excerpt/"
     xmlns:wp="http://wordpress.org/export/1.2/">
  <channel>
    <title>My Blog</title>
    <item>
      <title>Hello World</title>
      <link>https://example.com/2024/01/hello-world/</link>
      <pubDate>Mon, 15 Jan 2024 10:30:00 +0000</pubDate>
      <content:encoded><![CDATA[<p>First post body</p>]]></content:encoded>
      <excerpt:encoded><![CDATA[A short summary]]></excerpt:encoded>
      <wp:post_name>hello-world</wp:post_name>
      <wp:post_type>post</wp:post_type>
      <wp:status>publish</wp:status>
    </item>
    <item>
      <title>About</title>
      <content:encoded><![CDATA[<p>About us</p>]]></content:encoded>
      <wp:post_name>about</wp:post_name>
      <wp:post_type>page</wp:post_type>
      <wp:status>draft</wp:status>
    </item>
  </channel>
</rss>"#;

const GENERIC_FEED: &str = r#"<posts>
  <post><title>One</title><content>Body one</content><status>published</status></post>
  <post><title>Two</title><content>Body two</content></post>
  <post><title>Three</title><body>Body three</body></post>
  <post><content>No title here</content></post>
</posts>"#;

async fn create_test_app() -> (Router, SqlitePool) {
    create_test_app_with_limit(1024 * 1024).await
}

async fn create_test_app_with_limit(max_upload_bytes: usize) -> (Router, SqlitePool) {
    // One connection keeps every query on the same in-memory database
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");

    create_schema(&pool).await.expect("Failed to create schema");
    ensure_admin_user(&pool, ADMIN_EMAIL)
        .await
        .expect("Failed to seed admin");

    let state = AppState::new(pool.clone(), ADMIN_EMAIL, max_upload_bytes);
    (build_router(state), pool)
}

/// Multipart body with an optional file part and an optional target part
fn multipart_body(file: Option<(&str, &str)>, target: Option<&str>) -> String {
    let mut body = String::new();

    if let Some((file_name, content)) = file {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: text/xml\r\n\r\n{content}\r\n"
        ));
    }

    if let Some(target) = target {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"target\"\r\n\r\n{target}\r\n"
        ));
    }

    body.push_str(&format!("--{BOUNDARY}--\r\n"));
    body
}

fn import_request(body: String, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/admin/import")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );

    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }

    builder.body(Body::from(body)).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

async fn import(app: &Router, file_name: &str, xml: &str, target: Option<&str>) -> (StatusCode, Value) {
    let body = multipart_body(Some((file_name, xml)), target);
    send(app, import_request(body, Some(SESSION))).await
}

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _pool) = create_test_app().await;

    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, json) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["module"], "press-admin");
    assert!(json["uptime_seconds"].is_u64());
}

#[tokio::test]
async fn test_import_requires_session() {
    let (app, pool) = create_test_app().await;

    let body = multipart_body(Some(("feed.xml", WXR_FEED)), None);
    let (status, json) = send(&app, import_request(body, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"], "Unauthorized");

    let body = multipart_body(Some(("feed.xml", WXR_FEED)), None);
    let (status, _) = send(&app, import_request(body, Some("admin-auth=nope"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let posts = SqliteContentStore::new(pool).list(Collection::Posts).await.unwrap();
    assert!(posts.is_empty());
}

#[tokio::test]
async fn test_session_requires_existing_admin() {
    let (app, pool) = create_test_app().await;
    sqlx::query("DELETE FROM users").execute(&pool).await.unwrap();

    let (status, json) = import(&app, "feed.xml", WXR_FEED, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"], "Unauthorized");
}

#[tokio::test]
async fn test_auth_check_and_signout() {
    let (app, _pool) = create_test_app().await;

    let request = Request::builder()
        .uri("/api/auth/check")
        .header(header::COOKIE, SESSION)
        .body(Body::empty())
        .unwrap();
    let (status, json) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["email"], ADMIN_EMAIL);
    assert_eq!(json["name"], "Admin User");

    let request = Request::builder()
        .uri("/api/auth/check")
        .body(Body::empty())
        .unwrap();
    let (status, json) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"], "Not authenticated");

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/signout")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("admin-auth=;"));
    assert!(cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_missing_file_rejected() {
    let (app, _pool) = create_test_app().await;

    let body = multipart_body(None, Some("posts"));
    let (status, json) = send(&app, import_request(body, Some(SESSION))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "No file uploaded");
}

#[tokio::test]
async fn test_non_xml_file_rejected() {
    let (app, _pool) = create_test_app().await;

    let (status, json) = import(&app, "export.json", "{}", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Only .xml files are allowed");
}

#[tokio::test]
async fn test_malformed_xml_is_batch_fatal() {
    let (app, pool) = create_test_app().await;

    let (status, json) = import(&app, "broken.xml", "<rss><channel><item>", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());
    assert!(json.get("importedPosts").is_none());

    let posts = SqliteContentStore::new(pool).list(Collection::Posts).await.unwrap();
    assert!(posts.is_empty());
}

#[tokio::test]
async fn test_feed_without_items_is_batch_fatal() {
    let (app, _pool) = create_test_app().await;

    let (status, json) = import(&app, "empty.xml", "<root><foo>bar</foo></root>", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Could not find recognizable content items in XML");
    assert!(json.get("skipped").is_none());
}

#[tokio::test]
async fn test_wxr_import_end_to_end() {
    let (app, pool) = create_test_app().await;

    let (status, json) = import(&app, "wordpress.xml", WXR_FEED, Some("auto")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["importedPosts"], 1);
    assert_eq!(json["importedPages"], 1);
    assert_eq!(json["skipped"], 0);
    assert_eq!(json["errors"], serde_json::json!([]));

    let store = SqliteContentStore::new(pool);

    let posts = store.list(Collection::Posts).await.unwrap();
    assert_eq!(posts.len(), 1);
    let post = &posts[0];
    assert_eq!(post.title, "Hello World");
    assert_eq!(post.slug, "hello-world");
    assert_eq!(post.content, "<p>First post body</p>");
    assert_eq!(post.excerpt.as_deref(), Some("A short summary"));
    assert_eq!(post.meta_title.as_deref(), Some("Hello World"));
    assert_eq!(post.meta_description.as_deref(), Some("A short summary"));
    assert!(post.published);
    assert_eq!(
        post.published_at.map(|dt| dt.to_rfc3339()),
        Some("2024-01-15T10:30:00+00:00".to_string())
    );

    let pages = store.list(Collection::Pages).await.unwrap();
    assert_eq!(pages.len(), 1);
    let page = &pages[0];
    assert_eq!(page.slug, "about");
    assert!(!page.published);
    assert_eq!(page.published_at, None);
    assert_eq!(page.author_id, post.author_id);
}

#[tokio::test]
async fn test_generic_import_counts_skips() {
    let (app, pool) = create_test_app().await;

    let (status, json) = import(&app, "posts.xml", GENERIC_FEED, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["importedPosts"], 3);
    assert_eq!(json["importedPages"], 0);
    assert_eq!(json["skipped"], 1);
    assert_eq!(json["errors"], serde_json::json!([]));

    let posts = SqliteContentStore::new(pool).list(Collection::Posts).await.unwrap();
    let slugs: Vec<_> = posts.iter().map(|p| p.slug.as_str()).collect();
    assert_eq!(slugs, vec!["one", "two", "three"]);
    assert!(posts[0].published && posts[0].published_at.is_some());
    assert!(!posts[1].published && posts[1].published_at.is_none());
}

#[tokio::test]
async fn test_reimport_creates_distinct_slugs() {
    let (app, pool) = create_test_app().await;

    let (first, _) = import(&app, "wordpress.xml", WXR_FEED, None).await;
    let (second, json) = import(&app, "wordpress.xml", WXR_FEED, None).await;
    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::OK);
    assert_eq!(json["importedPosts"], 1);
    assert_eq!(json["importedPages"], 1);

    let posts = SqliteContentStore::new(pool).list(Collection::Posts).await.unwrap();
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].slug, "hello-world");
    assert_ne!(posts[1].slug, posts[0].slug);
    assert!(posts[1].slug.starts_with("hello-world-"));
    assert!(posts[1].slug.ends_with("-1"));
}

#[tokio::test]
async fn test_forced_target_overrides_post_type() {
    let (app, pool) = create_test_app().await;

    let (status, json) = import(&app, "wordpress.XML", WXR_FEED, Some("POSTS")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["importedPosts"], 2);
    assert_eq!(json["importedPages"], 0);

    let store = SqliteContentStore::new(pool);
    assert_eq!(store.list(Collection::Posts).await.unwrap().len(), 2);
    assert!(store.list(Collection::Pages).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_oversized_upload_rejected() {
    let (app, pool) = create_test_app_with_limit(64).await;

    let (status, json) = import(&app, "wordpress.xml", WXR_FEED, None).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(json["error"], "File is too large");

    let posts = SqliteContentStore::new(pool).list(Collection::Posts).await.unwrap();
    assert!(posts.is_empty());
}

#[tokio::test]
async fn test_entities_decoded_in_imported_titles() {
    let (app, pool) = create_test_app().await;

    let feed = "<posts><post><title>Fish &amp; Chips&nbsp;Shop</title><content>Menu</content></post></posts>";
    let (status, json) = import(&app, "menu.xml", feed, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["importedPosts"], 1);

    let posts = SqliteContentStore::new(pool).list(Collection::Posts).await.unwrap();
    assert_eq!(posts[0].title, "Fish & Chips&nbsp;Shop");
}
