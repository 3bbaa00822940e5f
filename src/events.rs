use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::entities::order::DeliveryStatus;

/// Domain events emitted by the service layer. Consumed by a logging
/// processor; nothing downstream depends on delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    OrderCreated(Uuid),
    OrderPaid { order_id: Uuid, payment_id: String },
    OrderCancelled(Uuid),
    DeliveryStatusChanged {
        order_id: Uuid,
        old_status: DeliveryStatus,
        new_status: DeliveryStatus,
    },
    CouponRedeemed { code: String },
    ProductCreated(Uuid),
    ProductUpdated(Uuid),
    ProductDeleted(Uuid),
    ReviewSubmitted { product_id: Uuid },
    BlogPublished(Uuid),
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event, logging instead of failing when the channel is closed.
    /// Event delivery is best-effort; business operations never fail on it.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!("Event dropped: {}", e);
        }
    }
}

/// Drains the event channel, logging each event.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    while let Some(event) = rx.recv().await {
        match &event {
            Event::OrderPaid { order_id, .. } => info!(%order_id, "order paid"),
            Event::OrderCancelled(order_id) => info!(%order_id, "order cancelled"),
            Event::DeliveryStatusChanged {
                order_id,
                old_status,
                new_status,
            } => info!(%order_id, %old_status, %new_status, "delivery status changed"),
            other => debug!(?other, "event"),
        }
    }
    debug!("event channel closed");
}
