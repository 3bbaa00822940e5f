use std::sync::Arc;

use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, EntityTrait, Set};
use tracing::instrument;

use crate::entities::cms_content;
use crate::errors::ServiceError;

/// Key/value CMS store for editable page fragments (hero copy, about page,
/// policy text). Values are free-form JSON documents owned by the admin UI.
#[derive(Clone)]
pub struct ContentService {
    db: Arc<DatabaseConnection>,
}

impl ContentService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn get(&self, key: &str) -> Result<cms_content::Model, ServiceError> {
        cms_content::Entity::find_by_id(key.to_string())
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("No content for key '{key}'")))
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<cms_content::Model>, ServiceError> {
        Ok(cms_content::Entity::find().all(&*self.db).await?)
    }

    #[instrument(skip(self, value))]
    pub async fn upsert(
        &self,
        key: &str,
        value: serde_json::Value,
    ) -> Result<cms_content::Model, ServiceError> {
        let model = cms_content::ActiveModel {
            key: Set(key.to_string()),
            value: Set(value),
            updated_at: Set(Utc::now()),
        };
        cms_content::Entity::insert(model)
            .on_conflict(
                OnConflict::column(cms_content::Column::Key)
                    .update_columns([cms_content::Column::Value, cms_content::Column::UpdatedAt])
                    .to_owned(),
            )
            .exec(&*self.db)
            .await?;
        self.get(key).await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, key: &str) -> Result<(), ServiceError> {
        let result = cms_content::Entity::delete_by_id(key.to_string())
            .exec(&*self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!("No content for key '{key}'")));
        }
        Ok(())
    }
}
