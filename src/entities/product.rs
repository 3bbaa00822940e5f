use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Catalog product.
///
/// The handle is the URL slug; it is unique and must stay stable once cart or
/// order line items reference the product (line items snapshot price/title/
/// image at add time, they are not live-linked).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    #[sea_orm(unique)]
    pub handle: String,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub price: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))", nullable)]
    pub original_price: Option<Decimal>,
    pub image: String,
    #[sea_orm(column_type = "Json")]
    pub images: Json,
    #[sea_orm(nullable)]
    pub tag: Option<String>,
    #[sea_orm(nullable)]
    pub category: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    #[sea_orm(column_type = "Json")]
    pub sizes: Json,
    #[sea_orm(column_type = "Json")]
    pub colors: Json,
    #[sea_orm(column_type = "Json")]
    pub details: Json,
    #[sea_orm(nullable)]
    pub rating: Option<f64>,
    #[sea_orm(nullable)]
    pub review_count: Option<i32>,
    pub in_stock: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::review::Entity")]
    Reviews,
}

impl Related<super::review::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reviews.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
