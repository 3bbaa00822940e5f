use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::order::DeliveryStatus;

/// One append-only entry in an order's tracking log. The order's stored
/// `delivery_status` always matches the status of the latest entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TrackingUpdate {
    pub status: DeliveryStatus,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl TrackingUpdate {
    pub fn now(status: DeliveryStatus, message: impl Into<String>, location: Option<String>) -> Self {
        Self {
            status,
            message: message.into(),
            timestamp: Utc::now(),
            location,
        }
    }
}

/// One step on the delivery progress bar.
#[derive(Clone, Copy, Debug, Serialize, ToSchema)]
pub struct DeliveryStep {
    pub status: DeliveryStatus,
    pub label: &'static str,
    pub description: &'static str,
}

/// The six-step happy path rendered as the order progress bar. `pending`,
/// `cancelled` and `returned` are not positions on this line.
pub const DELIVERY_STEPS: [DeliveryStep; 6] = [
    DeliveryStep {
        status: DeliveryStatus::Confirmed,
        label: "Order Confirmed",
        description: "Your order has been placed successfully",
    },
    DeliveryStep {
        status: DeliveryStatus::Processing,
        label: "Processing",
        description: "We are preparing your order",
    },
    DeliveryStep {
        status: DeliveryStatus::Shipped,
        label: "Shipped",
        description: "Your order is on the way",
    },
    DeliveryStep {
        status: DeliveryStatus::InTransit,
        label: "In Transit",
        description: "Order is in transit to your city",
    },
    DeliveryStep {
        status: DeliveryStatus::OutForDelivery,
        label: "Out for Delivery",
        description: "Your order is out for delivery",
    },
    DeliveryStep {
        status: DeliveryStatus::Delivered,
        label: "Delivered",
        description: "Order has been delivered",
    },
];

/// Position of a status on the progress bar: -1 for `pending` (placed, not
/// yet confirmed), -2 for the terminated side-states, else the zero-based
/// index within [`DELIVERY_STEPS`].
pub fn delivery_step_index(status: DeliveryStatus) -> i32 {
    match status {
        DeliveryStatus::Pending => -1,
        DeliveryStatus::Cancelled | DeliveryStatus::Returned => -2,
        other => DELIVERY_STEPS
            .iter()
            .position(|step| step.status == other)
            .map(|i| i as i32)
            .unwrap_or(-1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_is_before_the_progress_bar() {
        assert_eq!(delivery_step_index(DeliveryStatus::Pending), -1);
    }

    #[test]
    fn terminated_states_are_off_the_progress_bar() {
        assert_eq!(delivery_step_index(DeliveryStatus::Cancelled), -2);
        assert_eq!(delivery_step_index(DeliveryStatus::Returned), -2);
    }

    #[test]
    fn happy_path_indexes_are_zero_based_and_ordered() {
        assert_eq!(delivery_step_index(DeliveryStatus::Confirmed), 0);
        assert_eq!(delivery_step_index(DeliveryStatus::Processing), 1);
        assert_eq!(delivery_step_index(DeliveryStatus::Shipped), 2);
        assert_eq!(delivery_step_index(DeliveryStatus::InTransit), 3);
        assert_eq!(delivery_step_index(DeliveryStatus::OutForDelivery), 4);
        assert_eq!(delivery_step_index(DeliveryStatus::Delivered), 5);
    }
}
