use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Shipping address snapshot stored on the order. Field names keep the wire
/// shape the storefront client already sends.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub first_name: String,
    pub last_name: String,
    #[validate(email)]
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

/// One ordered line item, snapshotted at checkout. Decoupled from the live
/// product record on purpose: later catalog edits must not rewrite history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OrderItemSnapshot {
    pub id: Uuid,
    pub title: String,
    pub price: Decimal,
    pub quantity: u32,
    pub image: String,
    #[serde(rename = "selectedSize")]
    pub selected_size: String,
}

impl OrderItemSnapshot {
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}
