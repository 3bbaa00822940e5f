use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::entities::blog_post;
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

#[derive(Clone)]
pub struct BlogService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct BlogPostInput {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Slug is required"))]
    pub slug: String,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub image: Option<String>,
    pub category: Option<String>,
    pub author: Option<String>,
    #[serde(default)]
    pub is_published: bool,
}

impl BlogService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    /// Published posts, newest first. Storefront surface.
    #[instrument(skip(self))]
    pub async fn list_published(&self) -> Result<Vec<blog_post::Model>, ServiceError> {
        Ok(blog_post::Entity::find()
            .filter(blog_post::Column::IsPublished.eq(true))
            .order_by_desc(blog_post::Column::PublishedAt)
            .all(&*self.db)
            .await?)
    }

    /// Published post by slug; drafts are invisible here.
    #[instrument(skip(self))]
    pub async fn get_published_by_slug(&self, slug: &str) -> Result<blog_post::Model, ServiceError> {
        blog_post::Entity::find()
            .filter(blog_post::Column::Slug.eq(slug))
            .filter(blog_post::Column::IsPublished.eq(true))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("No post with slug '{slug}'")))
    }

    /// Every post, drafts included. Admin surface.
    #[instrument(skip(self))]
    pub async fn list_all(&self) -> Result<Vec<blog_post::Model>, ServiceError> {
        Ok(blog_post::Entity::find()
            .order_by_desc(blog_post::Column::CreatedAt)
            .all(&*self.db)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: Uuid) -> Result<blog_post::Model, ServiceError> {
        blog_post::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Blog post {id} not found")))
    }

    #[instrument(skip(self, input), fields(slug = %input.slug))]
    pub async fn create(&self, input: BlogPostInput) -> Result<blog_post::Model, ServiceError> {
        input.validate()?;
        let existing = blog_post::Entity::find()
            .filter(blog_post::Column::Slug.eq(input.slug.clone()))
            .one(&*self.db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::InvalidInput(format!(
                "Slug '{}' is already in use",
                input.slug
            )));
        }

        let now = Utc::now();
        let was_published = input.is_published;
        let model = blog_post::ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(input.title),
            slug: Set(input.slug),
            excerpt: Set(input.excerpt),
            content: Set(input.content),
            image: Set(input.image),
            category: Set(input.category),
            author: Set(input.author),
            is_published: Set(input.is_published),
            published_at: Set(input.is_published.then_some(now)),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let post = model.insert(&*self.db).await?;
        if was_published {
            self.event_sender
                .send_or_log(Event::BlogPublished(post.id))
                .await;
        }
        Ok(post)
    }

    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        id: Uuid,
        input: BlogPostInput,
    ) -> Result<blog_post::Model, ServiceError> {
        input.validate()?;
        let existing = self.get_by_id(id).await?;
        let newly_published = input.is_published && !existing.is_published;

        let mut active: blog_post::ActiveModel = existing.into();
        active.title = Set(input.title);
        active.slug = Set(input.slug);
        active.excerpt = Set(input.excerpt);
        active.content = Set(input.content);
        active.image = Set(input.image);
        active.category = Set(input.category);
        active.author = Set(input.author);
        active.is_published = Set(input.is_published);
        if newly_published {
            active.published_at = Set(Some(Utc::now()));
        }
        active.updated_at = Set(Utc::now());

        let post = active.update(&*self.db).await?;
        if newly_published {
            self.event_sender
                .send_or_log(Event::BlogPublished(post.id))
                .await;
        }
        Ok(post)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = blog_post::Entity::delete_by_id(id).exec(&*self.db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!("Blog post {id} not found")));
        }
        Ok(())
    }
}
