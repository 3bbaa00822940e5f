use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Typed view over the single `store_settings` row. Sections keep the
/// camelCase field names the admin screens already use.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct StoreSettings {
    pub id: Uuid,
    pub general: GeneralSettings,
    pub shipping: ShippingSettings,
    pub notifications: NotificationSettings,
    pub social: SocialSettings,
    pub payment: PaymentSettings,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneralSettings {
    pub store_name: String,
    pub store_email: String,
    pub store_phone: String,
    pub store_address: String,
    pub currency: String,
    pub timezone: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ShippingSettings {
    pub free_shipping_threshold: Option<Decimal>,
    pub standard_shipping_rate: Option<Decimal>,
    pub express_shipping_rate: Option<Decimal>,
    pub processing_days: Option<String>,
    pub delivery_days: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationSettings {
    pub order_confirmation: bool,
    pub order_shipped: bool,
    pub order_delivered: bool,
    pub low_stock: bool,
    pub new_customer: bool,
    pub newsletter: bool,
}

/// Transactional mail is opt-out, marketing-adjacent prompts are opt-in.
impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            order_confirmation: true,
            order_shipped: true,
            order_delivered: true,
            low_stock: true,
            new_customer: false,
            newsletter: true,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct SocialSettings {
    pub instagram: String,
    pub facebook: String,
    pub whatsapp: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct PaymentSettings {
    pub cod_enabled: bool,
    pub upi_enabled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_confirmation_mail_is_on_by_default() {
        let defaults = NotificationSettings::default();
        assert!(defaults.order_confirmation);
        assert!(defaults.order_shipped);
        assert!(!defaults.new_customer);
    }
}
