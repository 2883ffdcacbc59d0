//! Blog service
//!
//! Markdown is rendered to `content_html` on every write. A post gets its
//! `published_at` the first time it becomes `published` and keeps it after.

use crate::db::repositories::BlogRepository;
use crate::models::{
    BlogFilter, BlogPost, CreateBlogInput, ListParams, PagedResult, PostStatus, UpdateBlogInput,
};
use crate::models::clean_optional;
use crate::services::markdown::{MarkdownRenderer, EXCERPT_CHARS};
use crate::services::validation::{self, merge_optional, slug_for_create, slug_for_update};
use crate::services::ServiceError;
use anyhow::Context;
use chrono::Utc;
use std::sync::Arc;

const MAX_TITLE_CHARS: usize = 200;

pub struct BlogService {
    repo: Arc<dyn BlogRepository>,
    markdown: MarkdownRenderer,
}

impl BlogService {
    pub fn new(repo: Arc<dyn BlogRepository>) -> Self {
        Self {
            repo,
            markdown: MarkdownRenderer::new(),
        }
    }

    /// Published posts for the public site, newest first
    pub async fn list_published(
        &self,
        category: Option<String>,
        search: Option<String>,
        params: &ListParams,
    ) -> Result<PagedResult<BlogPost>, ServiceError> {
        let filter = BlogFilter {
            category: clean_optional(category),
            search,
            ..BlogFilter::published()
        };
        self.list(&filter, params).await
    }

    pub async fn list(
        &self,
        filter: &BlogFilter,
        params: &ListParams,
    ) -> Result<PagedResult<BlogPost>, ServiceError> {
        let (posts, total) = self
            .repo
            .list(filter, params)
            .await
            .context("Failed to list blog posts")?;
        Ok(PagedResult::new(posts, total, params))
    }

    /// A published post by slug. Drafts are reported as missing.
    pub async fn get_published(&self, slug: &str) -> Result<BlogPost, ServiceError> {
        self.repo
            .get_by_slug(slug)
            .await
            .context("Failed to get blog post by slug")?
            .filter(BlogPost::is_published)
            .ok_or(ServiceError::NotFound("Blog post"))
    }

    pub async fn get_by_id(&self, id: i64) -> Result<BlogPost, ServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get blog post")?
            .ok_or(ServiceError::NotFound("Blog post"))
    }

    pub async fn categories(&self) -> Result<Vec<String>, ServiceError> {
        Ok(self
            .repo
            .published_categories()
            .await
            .context("Failed to list categories")?)
    }

    pub async fn count(&self, filter: &BlogFilter) -> Result<i64, ServiceError> {
        Ok(self.repo.count(filter).await.context("Failed to count blog posts")?)
    }

    pub async fn create(
        &self,
        author_id: i64,
        input: CreateBlogInput,
    ) -> Result<BlogPost, ServiceError> {
        let title = validation::required(&input.title, "Title", MAX_TITLE_CHARS)?;
        if input.content.trim().is_empty() {
            return Err(ServiceError::validation("Content is required"));
        }

        let slug = slug_for_create(&*self.repo, input.slug.as_deref(), &title).await?;
        let status = input.status.unwrap_or_default();
        let now = Utc::now();

        let post = BlogPost {
            id: 0,
            slug,
            title,
            excerpt: self.excerpt_or_derived(clean_optional(input.excerpt), &input.content),
            content_html: self.markdown.render(&input.content),
            content: input.content,
            cover_image: clean_optional(input.cover_image),
            category: clean_optional(input.category),
            author_id: Some(author_id),
            author_name: None,
            status,
            published_at: (status == PostStatus::Published).then_some(now),
            created_at: now,
            updated_at: now,
        };

        let created = self.repo.create(&post).await.context("Failed to create blog post")?;
        tracing::info!(post_id = created.id, slug = %created.slug, status = %created.status, "Blog post created");
        Ok(created)
    }

    pub async fn update(&self, id: i64, input: UpdateBlogInput) -> Result<BlogPost, ServiceError> {
        let existing = self.get_by_id(id).await?;

        let title = match input.title {
            Some(title) => validation::required(&title, "Title", MAX_TITLE_CHARS)?,
            None => existing.title.clone(),
        };
        let slug = slug_for_update(&*self.repo, id, &existing.slug, input.slug.as_deref())
            .await?
            .unwrap_or_else(|| existing.slug.clone());

        let content = match input.content {
            Some(content) if content.trim().is_empty() => {
                return Err(ServiceError::validation("Content is required"));
            }
            Some(content) => content,
            None => existing.content.clone(),
        };

        let excerpt = match input.excerpt {
            None => existing.excerpt.clone(),
            Some(excerpt) => self.excerpt_or_derived(clean_optional(Some(excerpt)), &content),
        };

        let status = input.status.unwrap_or(existing.status);
        let now = Utc::now();
        let published_at = match (existing.published_at, status) {
            (Some(at), _) => Some(at),
            (None, PostStatus::Published) => Some(now),
            (None, PostStatus::Draft) => None,
        };

        let post = BlogPost {
            slug,
            title,
            excerpt,
            content_html: self.markdown.render(&content),
            content,
            cover_image: merge_optional(existing.cover_image.clone(), input.cover_image),
            category: merge_optional(existing.category.clone(), input.category),
            status,
            published_at,
            updated_at: now,
            ..existing
        };

        let updated = self.repo.update(&post).await.context("Failed to update blog post")?;
        tracing::info!(post_id = id, status = %updated.status, "Blog post updated");
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        self.get_by_id(id).await?;
        self.repo.delete(id).await.context("Failed to delete blog post")?;
        tracing::info!(post_id = id, "Blog post deleted");
        Ok(())
    }

    fn excerpt_or_derived(&self, excerpt: Option<String>, content: &str) -> Option<String> {
        excerpt.or_else(|| {
            let derived = self.markdown.excerpt(content, EXCERPT_CHARS);
            (!derived.is_empty()).then_some(derived)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxBlogRepository;
    use crate::db::{create_test_pool, migrations, DynDatabasePool};

    async fn setup() -> (DynDatabasePool, BlogService, i64) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        sqlx::query(
            "INSERT INTO users (name, email, password_hash, role, status, created_at, updated_at) \
             VALUES ('Ed', 'ed@zuree.com', 'x', 'editor', 'active', ?, ?)",
        )
        .bind(Utc::now())
        .bind(Utc::now())
        .execute(pool.as_sqlite().unwrap())
        .await
        .unwrap();

        let service = BlogService::new(SqlxBlogRepository::boxed(pool.clone()));
        (pool, service, 1)
    }

    fn draft(title: &str) -> CreateBlogInput {
        CreateBlogInput {
            title: title.to_string(),
            content: "Our **fiber** network now reaches Abuja.".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_renders_markdown_and_derives_excerpt() {
        let (_pool, service, author) = setup().await;

        let post = service.create(author, draft("Fiber in Abuja")).await.unwrap();
        assert_eq!(post.slug, "fiber-in-abuja");
        assert!(post.content_html.contains("<strong>fiber</strong>"));
        assert_eq!(post.excerpt.as_deref(), Some("Our fiber network now reaches Abuja."));
        assert_eq!(post.status, PostStatus::Draft);
        assert!(post.published_at.is_none());
        assert_eq!(post.author_name.as_deref(), Some("Ed"));
    }

    #[tokio::test]
    async fn test_create_requires_title_and_content() {
        let (_pool, service, author) = setup().await;

        let no_title = draft("   ");
        assert!(matches!(service.create(author, no_title).await, Err(ServiceError::Validation(_))));

        let no_content = CreateBlogInput {
            content: "\n".into(),
            ..draft("Empty")
        };
        assert!(matches!(service.create(author, no_content).await, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_duplicate_titles_get_suffixed_slugs() {
        let (_pool, service, author) = setup().await;

        let first = service.create(author, draft("5G Launch")).await.unwrap();
        let second = service.create(author, draft("5G Launch")).await.unwrap();
        assert_eq!(first.slug, "5g-launch");
        assert_eq!(second.slug, "5g-launch-2");
    }

    #[tokio::test]
    async fn test_update_to_taken_slug_is_conflict() {
        let (_pool, service, author) = setup().await;
        service.create(author, draft("One")).await.unwrap();
        let two = service.create(author, draft("Two")).await.unwrap();

        let result = service
            .update(
                two.id,
                UpdateBlogInput {
                    slug: Some("one".into()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_published_at_is_set_once() {
        let (_pool, service, author) = setup().await;
        let post = service.create(author, draft("Launch")).await.unwrap();

        let publish = UpdateBlogInput {
            status: Some(PostStatus::Published),
            ..Default::default()
        };
        let published = service.update(post.id, publish.clone()).await.unwrap();
        let first_at = published.published_at.expect("published_at set");

        let unpublished = service
            .update(
                post.id,
                UpdateBlogInput {
                    status: Some(PostStatus::Draft),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(unpublished.published_at, Some(first_at));

        let republished = service.update(post.id, publish).await.unwrap();
        assert_eq!(republished.published_at, Some(first_at));
    }

    #[tokio::test]
    async fn test_public_reads_hide_drafts() {
        let (_pool, service, author) = setup().await;
        let hidden = service.create(author, draft("Hidden")).await.unwrap();
        service
            .create(
                author,
                CreateBlogInput {
                    status: Some(PostStatus::Published),
                    category: Some("Networks".into()),
                    ..draft("Visible")
                },
            )
            .await
            .unwrap();

        assert!(matches!(
            service.get_published(&hidden.slug).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(service.get_published("visible").await.is_ok());

        let page = service
            .list_published(None, None, &ListParams::default())
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].slug, "visible");

        assert_eq!(service.categories().await.unwrap(), vec!["Networks".to_string()]);
    }

    #[tokio::test]
    async fn test_update_clears_optional_fields() {
        let (_pool, service, author) = setup().await;
        let post = service
            .create(
                author,
                CreateBlogInput {
                    category: Some("Networks".into()),
                    cover_image: Some("https://cdn.zuree.com/a.jpg".into()),
                    ..draft("Clearable")
                },
            )
            .await
            .unwrap();

        let updated = service
            .update(
                post.id,
                UpdateBlogInput {
                    category: Some("".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.category, None);
        assert_eq!(updated.cover_image.as_deref(), Some("https://cdn.zuree.com/a.jpg"));
    }

    #[tokio::test]
    async fn test_delete_post() {
        let (_pool, service, author) = setup().await;
        let post = service.create(author, draft("Gone")).await.unwrap();

        service.delete(post.id).await.unwrap();
        assert!(matches!(service.get_by_id(post.id).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(service.delete(post.id).await, Err(ServiceError::NotFound(_))));
    }
}
