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

use crate::entities::product;
use crate::entities::review::{self, ReviewStatus};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

/// Customer reviews. Submissions land as pending and only approved reviews
/// are visible on the storefront or counted in product aggregates.
#[derive(Clone)]
pub struct ReviewService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewInput {
    pub product_id: Uuid,
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    pub heading: Option<String>,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i32,
    #[validate(length(min = 1, message = "Comment is required"))]
    pub comment: String,
}

impl ReviewService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    #[instrument(skip(self))]
    pub async fn approved_for_product(
        &self,
        product_id: Uuid,
    ) -> Result<Vec<review::Model>, ServiceError> {
        Ok(review::Entity::find()
            .filter(review::Column::ProductId.eq(product_id))
            .filter(review::Column::Status.eq(ReviewStatus::Approved))
            .order_by_desc(review::Column::CreatedAt)
            .all(&*self.db)
            .await?)
    }

    #[instrument(skip(self, input), fields(product_id = %input.product_id))]
    pub async fn submit(&self, input: ReviewInput) -> Result<review::Model, ServiceError> {
        input.validate()?;
        product::Entity::find_by_id(input.product_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Product {} not found", input.product_id))
            })?;

        let model = review::ActiveModel {
            id: Set(Uuid::new_v4()),
            product_id: Set(input.product_id),
            name: Set(input.name),
            email: Set(input.email),
            heading: Set(input.heading),
            rating: Set(input.rating),
            comment: Set(input.comment),
            status: Set(ReviewStatus::Pending),
            created_at: Set(Utc::now()),
        };
        let saved = model.insert(&*self.db).await?;
        self.event_sender
            .send_or_log(Event::ReviewSubmitted {
                product_id: saved.product_id,
            })
            .await;
        Ok(saved)
    }

    /// All reviews regardless of status, newest first. Admin surface.
    #[instrument(skip(self))]
    pub async fn list_all(&self) -> Result<Vec<review::Model>, ServiceError> {
        Ok(review::Entity::find()
            .order_by_desc(review::Column::CreatedAt)
            .all(&*self.db)
            .await?)
    }

    /// Sets the moderation status and refreshes the product's rating
    /// aggregates from its approved reviews.
    #[instrument(skip(self))]
    pub async fn moderate(
        &self,
        id: Uuid,
        status: ReviewStatus,
    ) -> Result<review::Model, ServiceError> {
        let existing = review::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Review {id} not found")))?;
        let product_id = existing.product_id;

        let mut active: review::ActiveModel = existing.into();
        active.status = Set(status);
        let saved = active.update(&*self.db).await?;

        self.refresh_product_aggregates(product_id).await?;
        Ok(saved)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let existing = review::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Review {id} not found")))?;
        let product_id = existing.product_id;
        review::Entity::delete_by_id(id).exec(&*self.db).await?;
        self.refresh_product_aggregates(product_id).await?;
        Ok(())
    }

    async fn refresh_product_aggregates(&self, product_id: Uuid) -> Result<(), ServiceError> {
        let approved = review::Entity::find()
            .filter(review::Column::ProductId.eq(product_id))
            .filter(review::Column::Status.eq(ReviewStatus::Approved))
            .all(&*self.db)
            .await?;

        let (rating, count) = if approved.is_empty() {
            (None, Some(0))
        } else {
            let sum: i32 = approved.iter().map(|r| r.rating).sum();
            let avg = f64::from(sum) / approved.len() as f64;
            // one decimal place, as displayed on product cards
            (Some((avg * 10.0).round() / 10.0), Some(approved.len() as i32))
        };

        if let Some(prod) = product::Entity::find_by_id(product_id).one(&*self.db).await? {
            let mut active: product::ActiveModel = prod.into();
            active.rating = Set(rating);
            active.review_count = Set(count);
            active.updated_at = Set(Utc::now());
            active.update(&*self.db).await?;
        }
        Ok(())
    }
}
