use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    entities::order::{self, DeliveryStatus, Entity as Order, PaymentStatus},
    errors::ServiceError,
    events::{Event, EventSender},
    models::{OrderItemSnapshot, ShippingAddress, TrackingUpdate},
};

/// Order persistence and lifecycle writes.
///
/// Every status mutation overwrites `delivery_status` and appends one entry
/// to the tracking log in the same row update; the two columns are never
/// written independently. Transitions are not validated against the current
/// state; the model trusts the admin caller, so an order can be moved
/// backwards on the progress line.
#[derive(Clone)]
pub struct OrderService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

#[derive(Debug, Clone)]
pub struct CreateOrderInput {
    pub user_id: Uuid,
    pub razorpay_order_id: String,
    pub amount: Decimal,
    pub discount_amount: Decimal,
    pub coupon_code: Option<String>,
    pub shipping_address: ShippingAddress,
    pub items: Vec<OrderItemSnapshot>,
}

/// Payment verification outcome applied to an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentOutcome {
    Paid,
    Failed,
}

impl OrderService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    /// Inserts a pending order with item/address snapshots and a single
    /// seeded tracking entry.
    #[instrument(skip(self, input), fields(user_id = %input.user_id))]
    pub async fn create_order(&self, input: CreateOrderInput) -> Result<order::Model, ServiceError> {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let initial_tracking = vec![TrackingUpdate::now(
            DeliveryStatus::Pending,
            "Order placed, awaiting payment",
            None,
        )];

        let model = order::ActiveModel {
            id: Set(id),
            user_id: Set(input.user_id),
            razorpay_order_id: Set(input.razorpay_order_id),
            razorpay_payment_id: Set(None),
            amount: Set(input.amount),
            discount_amount: Set(input.discount_amount),
            coupon_code: Set(input.coupon_code),
            payment_status: Set(PaymentStatus::Pending),
            delivery_status: Set(DeliveryStatus::Pending),
            tracking_number: Set(None),
            courier_name: Set(None),
            estimated_delivery: Set(None),
            tracking_updates: Set(serde_json::to_value(&initial_tracking)?),
            shipping_address: Set(serde_json::to_value(&input.shipping_address)?),
            items: Set(serde_json::to_value(&input.items)?),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let created = model.insert(&*self.db).await?;

        self.event_sender.send_or_log(Event::OrderCreated(id)).await;
        info!(%id, razorpay_order_id = %created.razorpay_order_id, "order created");
        Ok(created)
    }

    /// Applies a payment verification outcome, keyed by the gateway order id.
    /// `paid` confirms the order; `failed` cancels it. This is the only
    /// transition the payment flow triggers; everything else is
    /// admin-initiated.
    #[instrument(skip(self))]
    pub async fn update_payment(
        &self,
        razorpay_order_id: &str,
        razorpay_payment_id: &str,
        outcome: PaymentOutcome,
    ) -> Result<order::Model, ServiceError> {
        let current = Order::find()
            .filter(order::Column::RazorpayOrderId.eq(razorpay_order_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Order for {} not found", razorpay_order_id))
            })?;

        let (payment_status, delivery_status, message) = match outcome {
            PaymentOutcome::Paid => (
                PaymentStatus::Paid,
                DeliveryStatus::Confirmed,
                "Payment successful! Order confirmed",
            ),
            PaymentOutcome::Failed => (
                PaymentStatus::Failed,
                DeliveryStatus::Cancelled,
                "Payment failed. Order cancelled",
            ),
        };

        let mut log = self.decode_tracking(&current)?;
        log.push(TrackingUpdate::now(delivery_status, message, None));

        let order_id = current.id;
        let mut active: order::ActiveModel = current.into();
        active.razorpay_payment_id = Set(Some(razorpay_payment_id.to_string()));
        active.payment_status = Set(payment_status);
        active.delivery_status = Set(delivery_status);
        active.tracking_updates = Set(serde_json::to_value(&log)?);
        active.updated_at = Set(Utc::now());
        let updated = active.update(&*self.db).await?;

        match outcome {
            PaymentOutcome::Paid => {
                self.event_sender
                    .send_or_log(Event::OrderPaid {
                        order_id,
                        payment_id: razorpay_payment_id.to_string(),
                    })
                    .await
            }
            PaymentOutcome::Failed => {
                self.event_sender
                    .send_or_log(Event::OrderCancelled(order_id))
                    .await
            }
        }
        Ok(updated)
    }

    /// Admin delivery update: overwrite the status and append a log entry.
    #[instrument(skip(self, message))]
    pub async fn update_delivery_status(
        &self,
        order_id: Uuid,
        delivery_status: DeliveryStatus,
        message: String,
        location: Option<String>,
    ) -> Result<order::Model, ServiceError> {
        let current = self.get_order(order_id).await?;
        let old_status = current.delivery_status;

        let mut log = self.decode_tracking(&current)?;
        log.push(TrackingUpdate::now(delivery_status, message, location));

        let mut active: order::ActiveModel = current.into();
        active.delivery_status = Set(delivery_status);
        active.tracking_updates = Set(serde_json::to_value(&log)?);
        active.updated_at = Set(Utc::now());
        let updated = active.update(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::DeliveryStatusChanged {
                order_id,
                old_status,
                new_status: delivery_status,
            })
            .await;
        Ok(updated)
    }

    /// Sets courier metadata without touching the status or the log.
    #[instrument(skip(self))]
    pub async fn set_tracking_info(
        &self,
        order_id: Uuid,
        tracking_number: String,
        courier_name: String,
        estimated_delivery: Option<String>,
    ) -> Result<order::Model, ServiceError> {
        let current = self.get_order(order_id).await?;
        let mut active: order::ActiveModel = current.into();
        active.tracking_number = Set(Some(tracking_number));
        active.courier_name = Set(Some(courier_name));
        active.estimated_delivery = Set(estimated_delivery);
        active.updated_at = Set(Utc::now());
        Ok(active.update(&*self.db).await?)
    }

    pub async fn get_order(&self, id: Uuid) -> Result<order::Model, ServiceError> {
        Order::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", id)))
    }

    pub async fn orders_for_user(&self, user_id: Uuid) -> Result<Vec<order::Model>, ServiceError> {
        Ok(Order::find()
            .filter(order::Column::UserId.eq(user_id))
            .order_by_desc(order::Column::CreatedAt)
            .all(&*self.db)
            .await?)
    }

    pub async fn all_orders(&self) -> Result<Vec<order::Model>, ServiceError> {
        Ok(Order::find()
            .order_by_desc(order::Column::CreatedAt)
            .all(&*self.db)
            .await?)
    }

    /// Decodes the append-only tracking log from its JSON column.
    pub fn decode_tracking(
        &self,
        order: &order::Model,
    ) -> Result<Vec<TrackingUpdate>, ServiceError> {
        Ok(serde_json::from_value(order.tracking_updates.clone())?)
    }
}
