use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Store-wide settings. A single row; each section is a JSON document with a
/// typed view in `models::settings`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "store_settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(column_type = "Json")]
    pub general: Json,
    #[sea_orm(column_type = "Json")]
    pub shipping: Json,
    #[sea_orm(column_type = "Json")]
    pub notifications: Json,
    #[sea_orm(column_type = "Json")]
    pub social: Json,
    #[sea_orm(column_type = "Json")]
    pub payment: Json,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
