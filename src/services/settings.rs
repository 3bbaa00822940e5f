use std::sync::Arc;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use serde::Deserialize;
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::store_settings;
use crate::errors::ServiceError;
use crate::models::settings::{
    GeneralSettings, NotificationSettings, PaymentSettings, ShippingSettings, SocialSettings,
    StoreSettings,
};

/// Reads and updates the single store-wide settings row, creating it with
/// defaults on first access.
#[derive(Clone)]
pub struct SettingsService {
    db: Arc<DatabaseConnection>,
}

/// Partial update; omitted sections are left as they are.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    pub general: Option<GeneralSettings>,
    pub shipping: Option<ShippingSettings>,
    pub notifications: Option<NotificationSettings>,
    pub social: Option<SocialSettings>,
    pub payment: Option<PaymentSettings>,
}

impl SettingsService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn get(&self) -> Result<StoreSettings, ServiceError> {
        match store_settings::Entity::find().one(&*self.db).await? {
            Some(row) => Ok(Self::decode(row)),
            None => {
                let created = self.insert_defaults().await?;
                Ok(Self::decode(created))
            }
        }
    }

    #[instrument(skip(self, update))]
    pub async fn update(&self, update: SettingsUpdate) -> Result<StoreSettings, ServiceError> {
        let current = match store_settings::Entity::find().one(&*self.db).await? {
            Some(row) => row,
            None => self.insert_defaults().await?,
        };

        let mut active: store_settings::ActiveModel = current.into();
        if let Some(general) = update.general {
            active.general = Set(serde_json::to_value(general)?);
        }
        if let Some(shipping) = update.shipping {
            active.shipping = Set(serde_json::to_value(shipping)?);
        }
        if let Some(notifications) = update.notifications {
            active.notifications = Set(serde_json::to_value(notifications)?);
        }
        if let Some(social) = update.social {
            active.social = Set(serde_json::to_value(social)?);
        }
        if let Some(payment) = update.payment {
            active.payment = Set(serde_json::to_value(payment)?);
        }
        active.updated_at = Set(Utc::now());

        let saved = active.update(&*self.db).await?;
        Ok(Self::decode(saved))
    }

    async fn insert_defaults(&self) -> Result<store_settings::Model, ServiceError> {
        let defaults = StoreSettings::default();
        let model = store_settings::ActiveModel {
            id: Set(Uuid::new_v4()),
            general: Set(serde_json::to_value(&defaults.general)?),
            shipping: Set(serde_json::to_value(&defaults.shipping)?),
            notifications: Set(serde_json::to_value(&defaults.notifications)?),
            social: Set(serde_json::to_value(&defaults.social)?),
            payment: Set(serde_json::to_value(&defaults.payment)?),
            updated_at: Set(Utc::now()),
        };
        Ok(model.insert(&*self.db).await?)
    }

    // Unknown or missing fields in a stored section fall back to defaults so
    // old rows survive section schema additions.
    fn decode(row: store_settings::Model) -> StoreSettings {
        StoreSettings {
            id: row.id,
            general: serde_json::from_value(row.general).unwrap_or_default(),
            shipping: serde_json::from_value(row.shipping).unwrap_or_default(),
            notifications: serde_json::from_value(row.notifications).unwrap_or_default(),
            social: serde_json::from_value(row.social).unwrap_or_default(),
            payment: serde_json::from_value(row.payment).unwrap_or_default(),
        }
    }
}
