//! Post and page persistence
//!
//! SQLite implementation of [`ContentStore`]. Slugs are UNIQUE per table,
//! so an insert that loses a slug race fails instead of duplicating.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use press_common::{Error, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::import::{Collection, ContentRecord, ContentStore, NewContent};

/// Content store backed by the shared SQLite pool
#[derive(Clone)]
pub struct SqliteContentStore {
    pool: SqlitePool,
}

impl SqliteContentStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All records of a collection, oldest first
    pub async fn list(&self, collection: Collection) -> Result<Vec<ContentRecord>> {
        let sql = format!(
            "SELECT {} FROM {} ORDER BY created_at, rowid",
            select_columns(collection),
            collection.table()
        );

        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(|row| record_from_row(collection, row)).collect()
    }
}

/// Column list shared by the queries; pages have no excerpt
fn select_columns(collection: Collection) -> &'static str {
    match collection {
        Collection::Posts => {
            "id, title, slug, content, excerpt, featured_image, meta_title, \
             meta_description, published, published_at, author_id"
        }
        Collection::Pages => {
            "id, title, slug, content, NULL AS excerpt, featured_image, meta_title, \
             meta_description, published, published_at, author_id"
        }
    }
}

fn record_from_row(collection: Collection, row: &SqliteRow) -> Result<ContentRecord> {
    let published_at: Option<String> = row.try_get("published_at")?;
    let published_at = published_at
        .map(|s| {
            DateTime::parse_from_rfc3339(&s)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| Error::Internal(format!("Failed to parse published_at: {}", e)))
        })
        .transpose()?;

    Ok(ContentRecord {
        id: row.try_get("id")?,
        collection,
        title: row.try_get("title")?,
        slug: row.try_get("slug")?,
        content: row.try_get("content")?,
        excerpt: row.try_get("excerpt")?,
        featured_image: row.try_get("featured_image")?,
        meta_title: row.try_get("meta_title")?,
        meta_description: row.try_get("meta_description")?,
        published: row.try_get::<i64, _>("published")? != 0,
        published_at,
        author_id: row.try_get("author_id")?,
    })
}

#[async_trait]
impl ContentStore for SqliteContentStore {
    async fn find_by_slug(
        &self,
        collection: Collection,
        slug: &str,
    ) -> Result<Option<ContentRecord>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE slug = ?",
            select_columns(collection),
            collection.table()
        );

        let row = sqlx::query(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| record_from_row(collection, &row)).transpose()
    }

    async fn create(&self, content: NewContent) -> Result<ContentRecord> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        let published_at = content.published_at.map(|dt| dt.to_rfc3339());

        match content.collection {
            Collection::Posts => {
                sqlx::query(
                    r#"
                    INSERT INTO posts (
                        id, title, slug, content, excerpt, featured_image,
                        meta_title, meta_description, published, featured,
                        published_at, author_id, created_at, updated_at
                    ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?, ?, ?)
                    "#,
                )
                .bind(&id)
                .bind(&content.title)
                .bind(&content.slug)
                .bind(&content.content)
                .bind(&content.excerpt)
                .bind(&content.featured_image)
                .bind(&content.meta_title)
                .bind(&content.meta_description)
                .bind(content.published)
                .bind(&published_at)
                .bind(&content.author_id)
                .bind(&now)
                .bind(&now)
                .execute(&self.pool)
                .await?;
            }
            Collection::Pages => {
                sqlx::query(
                    r#"
                    INSERT INTO pages (
                        id, title, slug, content, featured_image,
                        meta_title, meta_description, published,
                        published_at, author_id, created_at, updated_at
                    ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                    "#,
                )
                .bind(&id)
                .bind(&content.title)
                .bind(&content.slug)
                .bind(&content.content)
                .bind(&content.featured_image)
                .bind(&content.meta_title)
                .bind(&content.meta_description)
                .bind(content.published)
                .bind(&published_at)
                .bind(&content.author_id)
                .bind(&now)
                .bind(&now)
                .execute(&self.pool)
                .await?;
            }
        }

        Ok(ContentRecord {
            id,
            collection: content.collection,
            title: content.title,
            slug: content.slug,
            content: content.content,
            excerpt: match content.collection {
                Collection::Posts => content.excerpt,
                Collection::Pages => None,
            },
            featured_image: content.featured_image,
            meta_title: content.meta_title,
            meta_description: content.meta_description,
            published: content.published,
            published_at: content.published_at,
            author_id: content.author_id,
        })
    }
}
