pub mod settings;
pub mod shipping;
pub mod tracking;

pub use shipping::{OrderItemSnapshot, ShippingAddress};
pub use tracking::{delivery_step_index, DeliveryStep, TrackingUpdate, DELIVERY_STEPS};
