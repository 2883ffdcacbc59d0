//! Blog post repository

use super::SlugLookup;
use crate::db::{
    impl_from_row, like_pattern, parse_column, with_driver, DynDatabasePool, LastInsertId,
};
use crate::models::{BlogFilter, BlogPost, ListParams};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::Row;
use std::sync::Arc;

const SELECT_POSTS: &str = r#"
    SELECT b.id, b.slug, b.title, b.excerpt, b.content, b.content_html, b.cover_image,
           b.category, b.author_id, u.name AS author_name, b.status, b.published_at,
           b.created_at, b.updated_at
    FROM blog_posts b
    LEFT JOIN users u ON u.id = b.author_id
"#;

// Bind order: status x2, category x2, search x3
const FILTER_POSTS: &str = r#"
    WHERE (? IS NULL OR b.status = ?)
      AND (? IS NULL OR b.category = ?)
      AND (? IS NULL OR b.title LIKE ? OR b.excerpt LIKE ?)
"#;

/// Blog post repository trait
#[async_trait]
pub trait BlogRepository: SlugLookup {
    async fn create(&self, post: &BlogPost) -> Result<BlogPost>;

    async fn get_by_id(&self, id: i64) -> Result<Option<BlogPost>>;

    async fn get_by_slug(&self, slug: &str) -> Result<Option<BlogPost>>;

    /// Persist every editable column of `post`
    async fn update(&self, post: &BlogPost) -> Result<BlogPost>;

    async fn delete(&self, id: i64) -> Result<()>;

    /// List posts matching `filter`, newest publication first
    async fn list(&self, filter: &BlogFilter, params: &ListParams) -> Result<(Vec<BlogPost>, i64)>;

    async fn count(&self, filter: &BlogFilter) -> Result<i64>;

    /// Distinct categories of published posts, alphabetically
    async fn published_categories(&self) -> Result<Vec<String>>;
}

pub struct SqlxBlogRepository {
    pool: DynDatabasePool,
}

impl SqlxBlogRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn BlogRepository> {
        Arc::new(Self::new(pool))
    }
}

impl_from_row!(BlogPost, |row| {
    Ok(BlogPost {
        id: row.try_get("id")?,
        slug: row.try_get("slug")?,
        title: row.try_get("title")?,
        excerpt: row.try_get("excerpt")?,
        content: row.try_get("content")?,
        content_html: row.try_get("content_html")?,
        cover_image: row.try_get("cover_image")?,
        category: row.try_get("category")?,
        author_id: row.try_get("author_id")?,
        author_name: row.try_get("author_name")?,
        status: parse_column(row.try_get("status")?, "status")?,
        published_at: row.try_get("published_at")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
});

#[async_trait]
impl SlugLookup for SqlxBlogRepository {
    async fn exists_by_slug(&self, slug: &str, exclude_id: Option<i64>) -> Result<bool> {
        let count: i64 = with_driver!(self.pool, |conn| {
            sqlx::query_scalar(
                "SELECT COUNT(*) FROM blog_posts WHERE slug = ? AND (? IS NULL OR id <> ?)",
            )
            .bind(slug)
            .bind(exclude_id)
            .bind(exclude_id)
            .fetch_one(conn)
            .await
            .context("Failed to check blog slug")?
        });
        Ok(count > 0)
    }
}

#[async_trait]
impl BlogRepository for SqlxBlogRepository {
    async fn create(&self, post: &BlogPost) -> Result<BlogPost> {
        let id = with_driver!(self.pool, |conn| {
            sqlx::query(
                r#"
                INSERT INTO blog_posts (slug, title, excerpt, content, content_html, cover_image,
                    category, author_id, status, published_at, created_at, updated_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&post.slug)
            .bind(&post.title)
            .bind(&post.excerpt)
            .bind(&post.content)
            .bind(&post.content_html)
            .bind(&post.cover_image)
            .bind(&post.category)
            .bind(post.author_id)
            .bind(post.status.to_string())
            .bind(post.published_at)
            .bind(post.created_at)
            .bind(post.updated_at)
            .execute(conn)
            .await
            .context("Failed to create blog post")?
            .last_id()
        });

        self.get_by_id(id)
            .await?
            .context("Blog post missing after insert")
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<BlogPost>> {
        let sql = format!("{} WHERE b.id = ?", SELECT_POSTS);
        with_driver!(self.pool, |conn| {
            sqlx::query_as(&sql)
                .bind(id)
                .fetch_optional(conn)
                .await
                .context("Failed to get blog post by ID")
        })
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<BlogPost>> {
        let sql = format!("{} WHERE b.slug = ?", SELECT_POSTS);
        with_driver!(self.pool, |conn| {
            sqlx::query_as(&sql)
                .bind(slug)
                .fetch_optional(conn)
                .await
                .context("Failed to get blog post by slug")
        })
    }

    async fn update(&self, post: &BlogPost) -> Result<BlogPost> {
        with_driver!(self.pool, |conn| {
            sqlx::query(
                r#"
                UPDATE blog_posts
                SET slug = ?, title = ?, excerpt = ?, content = ?, content_html = ?,
                    cover_image = ?, category = ?, status = ?, published_at = ?, updated_at = ?
                WHERE id = ?
                "#,
            )
            .bind(&post.slug)
            .bind(&post.title)
            .bind(&post.excerpt)
            .bind(&post.content)
            .bind(&post.content_html)
            .bind(&post.cover_image)
            .bind(&post.category)
            .bind(post.status.to_string())
            .bind(post.published_at)
            .bind(post.updated_at)
            .bind(post.id)
            .execute(conn)
            .await
            .context("Failed to update blog post")?;
        });

        self.get_by_id(post.id)
            .await?
            .context("Blog post missing after update")
    }

    async fn delete(&self, id: i64) -> Result<()> {
        with_driver!(self.pool, |conn| {
            sqlx::query("DELETE FROM blog_posts WHERE id = ?")
                .bind(id)
                .execute(conn)
                .await
                .context("Failed to delete blog post")?;
        });
        Ok(())
    }

    async fn list(&self, filter: &BlogFilter, params: &ListParams) -> Result<(Vec<BlogPost>, i64)> {
        let status = filter.status.map(|s| s.to_string());
        let search = like_pattern(filter.search.as_deref());
        let sql = format!(
            "{} {} ORDER BY COALESCE(b.published_at, b.created_at) DESC, b.id DESC LIMIT ? OFFSET ?",
            SELECT_POSTS, FILTER_POSTS
        );

        let posts: Vec<BlogPost> = with_driver!(self.pool, |conn| {
            sqlx::query_as(&sql)
                .bind(&status)
                .bind(&status)
                .bind(&filter.category)
                .bind(&filter.category)
                .bind(&search)
                .bind(&search)
                .bind(&search)
                .bind(params.limit())
                .bind(params.offset())
                .fetch_all(conn)
                .await
                .context("Failed to list blog posts")?
        });

        let total = self.count(filter).await?;
        Ok((posts, total))
    }

    async fn count(&self, filter: &BlogFilter) -> Result<i64> {
        let status = filter.status.map(|s| s.to_string());
        let search = like_pattern(filter.search.as_deref());
        let sql = format!("SELECT COUNT(*) FROM blog_posts b {}", FILTER_POSTS);

        with_driver!(self.pool, |conn| {
            sqlx::query_scalar(&sql)
                .bind(&status)
                .bind(&status)
                .bind(&filter.category)
                .bind(&filter.category)
                .bind(&search)
                .bind(&search)
                .bind(&search)
                .fetch_one(conn)
                .await
                .context("Failed to count blog posts")
        })
    }

    async fn published_categories(&self) -> Result<Vec<String>> {
        with_driver!(self.pool, |conn| {
            sqlx::query_scalar(
                r#"
                SELECT DISTINCT category FROM blog_posts
                WHERE status = 'published' AND category IS NOT NULL AND category <> ''
                ORDER BY category
                "#,
            )
            .fetch_all(conn)
            .await
            .context("Failed to list blog categories")
        })
    }
}
