use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    entities::product::{self, Entity as Product},
    errors::ServiceError,
    events::{Event, EventSender},
    shop::{PriceSource, ProductRef},
};

/// Catalog reads for the browsing surfaces plus admin CRUD.
#[derive(Clone)]
pub struct CatalogService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ProductFilter {
    /// Exact category match
    pub category: Option<String>,
    /// Case-insensitive title substring
    pub search: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProductInput {
    pub title: String,
    pub handle: String,
    pub price: Decimal,
    pub original_price: Option<Decimal>,
    pub image: String,
    #[serde(default)]
    pub images: Vec<String>,
    pub tag: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub details: Vec<String>,
    pub rating: Option<f64>,
    pub review_count: Option<i32>,
    #[serde(default = "default_in_stock")]
    pub in_stock: bool,
    #[serde(default)]
    pub sort_order: i32,
}

fn default_in_stock() -> bool {
    true
}

impl CatalogService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    /// Lists products in merchandising order (sort_order ascending).
    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        filter: ProductFilter,
    ) -> Result<Vec<product::Model>, ServiceError> {
        let mut query = Product::find().order_by_asc(product::Column::SortOrder);
        if let Some(category) = filter.category {
            query = query.filter(product::Column::Category.eq(category));
        }
        if let Some(search) = filter.search {
            query = query.filter(product::Column::Title.contains(&search));
        }
        Ok(query.all(&*self.db).await?)
    }

    pub async fn get_by_handle(&self, handle: &str) -> Result<product::Model, ServiceError> {
        Product::find()
            .filter(product::Column::Handle.eq(handle))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product '{}' not found", handle)))
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<product::Model, ServiceError> {
        Product::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", id)))
    }

    #[instrument(skip(self, input))]
    pub async fn create_product(&self, input: ProductInput) -> Result<product::Model, ServiceError> {
        if Product::find()
            .filter(product::Column::Handle.eq(input.handle.clone()))
            .one(&*self.db)
            .await?
            .is_some()
        {
            return Err(ServiceError::ValidationError(format!(
                "Handle '{}' is already in use",
                input.handle
            )));
        }

        let id = Uuid::new_v4();
        let now = Utc::now();
        let model = product::ActiveModel {
            id: Set(id),
            title: Set(input.title),
            handle: Set(input.handle),
            price: Set(input.price),
            original_price: Set(input.original_price),
            image: Set(input.image),
            images: Set(serde_json::json!(input.images)),
            tag: Set(input.tag),
            category: Set(input.category),
            description: Set(input.description),
            sizes: Set(serde_json::json!(input.sizes)),
            colors: Set(serde_json::json!(input.colors)),
            details: Set(serde_json::json!(input.details)),
            rating: Set(input.rating),
            review_count: Set(input.review_count),
            in_stock: Set(input.in_stock),
            sort_order: Set(input.sort_order),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let created = model.insert(&*self.db).await?;

        self.event_sender.send_or_log(Event::ProductCreated(id)).await;
        info!(%id, handle = %created.handle, "product created");
        Ok(created)
    }

    #[instrument(skip(self, input))]
    pub async fn update_product(
        &self,
        id: Uuid,
        input: ProductInput,
    ) -> Result<product::Model, ServiceError> {
        let existing = self.get_by_id(id).await?;
        // The handle stays immutable once set; cart and order line items
        // reference it in stored snapshots.
        if existing.handle != input.handle {
            return Err(ServiceError::ValidationError(
                "Product handle cannot be changed".to_string(),
            ));
        }

        let mut active: product::ActiveModel = existing.into();
        active.title = Set(input.title);
        active.price = Set(input.price);
        active.original_price = Set(input.original_price);
        active.image = Set(input.image);
        active.images = Set(serde_json::json!(input.images));
        active.tag = Set(input.tag);
        active.category = Set(input.category);
        active.description = Set(input.description);
        active.sizes = Set(serde_json::json!(input.sizes));
        active.colors = Set(serde_json::json!(input.colors));
        active.details = Set(serde_json::json!(input.details));
        active.rating = Set(input.rating);
        active.review_count = Set(input.review_count);
        active.in_stock = Set(input.in_stock);
        active.sort_order = Set(input.sort_order);
        active.updated_at = Set(Utc::now());
        let updated = active.update(&*self.db).await?;

        self.event_sender.send_or_log(Event::ProductUpdated(id)).await;
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: Uuid) -> Result<(), ServiceError> {
        let existing = self.get_by_id(id).await?;
        existing.delete(&*self.db).await?;
        self.event_sender.send_or_log(Event::ProductDeleted(id)).await;
        Ok(())
    }

    /// Snapshot view used by cart sessions.
    pub fn to_product_ref(model: &product::Model) -> ProductRef {
        ProductRef {
            id: model.id,
            title: model.title.clone(),
            handle: model.handle.clone(),
            price: model.price,
            image: model.image.clone(),
        }
    }
}

#[async_trait]
impl PriceSource for CatalogService {
    /// One batched query for all distinct product ids referenced by a cart.
    async fn products_by_ids(&self, ids: &[Uuid]) -> Result<Vec<ProductRef>, ServiceError> {
        let models = Product::find()
            .filter(product::Column::Id.is_in(ids.iter().copied()))
            .all(&*self.db)
            .await?;
        Ok(models.iter().map(Self::to_product_ref).collect())
    }
}
