use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::errors::ServiceError;
use crate::models::shipping::{OrderItemSnapshot, ShippingAddress};
use crate::services::coupons::CouponService;
use crate::services::emails::EmailService;
use crate::services::orders::{CreateOrderInput, OrderService, PaymentOutcome};
use crate::services::payments::RazorpayClient;
use crate::services::settings::SettingsService;

/// Orchestrates the two-phase checkout: create a gateway order alongside a
/// pending local order, then settle the local order from the signed payment
/// callback.
#[derive(Clone)]
pub struct CheckoutService {
    orders: Arc<OrderService>,
    coupons: Arc<CouponService>,
    settings: Arc<SettingsService>,
    emails: Arc<EmailService>,
    gateway: Arc<RazorpayClient>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BeginCheckoutInput {
    pub user_id: Uuid,
    #[validate]
    pub shipping_address: ShippingAddress,
    #[validate(length(min = 1, message = "Cart is empty"))]
    pub items: Vec<OrderItemSnapshot>,
    pub coupon_code: Option<String>,
}

/// Everything the hosted payment widget needs to open.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSession {
    pub order_id: Uuid,
    pub razorpay_order_id: String,
    /// Amount in paise, as the widget expects.
    pub amount: i64,
    pub currency: String,
    pub key_id: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompletePaymentInput {
    #[validate(length(min = 1))]
    pub razorpay_order_id: String,
    #[validate(length(min = 1))]
    pub razorpay_payment_id: String,
    #[validate(length(min = 1))]
    pub razorpay_signature: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentResult {
    pub verified: bool,
    pub order_id: Uuid,
    pub message: String,
}

impl CheckoutService {
    pub fn new(
        orders: Arc<OrderService>,
        coupons: Arc<CouponService>,
        settings: Arc<SettingsService>,
        emails: Arc<EmailService>,
        gateway: Arc<RazorpayClient>,
    ) -> Self {
        Self {
            orders,
            coupons,
            settings,
            emails,
            gateway,
        }
    }

    /// Prices the cart server-side (subtotal from submitted snapshots, coupon
    /// discount, shipping from store settings), creates the gateway order
    /// first and only then the pending local order, so a local row always has
    /// a gateway id to settle against.
    #[instrument(skip(self, input), fields(user_id = %input.user_id))]
    pub async fn begin_checkout(
        &self,
        input: BeginCheckoutInput,
    ) -> Result<CheckoutSession, ServiceError> {
        input.validate()?;

        let subtotal: Decimal = input.items.iter().map(|i| i.line_total()).sum();
        if subtotal <= Decimal::ZERO {
            return Err(ServiceError::InvalidInput(
                "Order total must be positive".to_string(),
            ));
        }

        let mut discount = Decimal::ZERO;
        let mut coupon_code = None;
        if let Some(code) = input
            .coupon_code
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
        {
            let validation = self.coupons.validate(code, subtotal).await?;
            if !validation.valid {
                return Err(ServiceError::InvalidInput(validation.message));
            }
            discount = validation.discount_amount.unwrap_or_default();
            coupon_code = validation.coupon.map(|c| c.code);
        }

        let shipping = self.shipping_charge(subtotal).await?;
        let total = subtotal - discount + shipping;
        if total <= Decimal::ZERO {
            return Err(ServiceError::InvalidInput(
                "Order total must be positive".to_string(),
            ));
        }

        let receipt = format!("rcpt_{}", Uuid::new_v4().simple());
        let gateway_order = self.gateway.create_order(total, "INR", &receipt).await?;

        let order = self
            .orders
            .create_order(CreateOrderInput {
                user_id: input.user_id,
                razorpay_order_id: gateway_order.id.clone(),
                amount: total,
                discount_amount: discount,
                coupon_code,
                shipping_address: input.shipping_address,
                items: input.items,
            })
            .await?;

        info!(order_id = %order.id, %total, "checkout session opened");
        Ok(CheckoutSession {
            order_id: order.id,
            razorpay_order_id: gateway_order.id,
            amount: gateway_order.amount,
            currency: gateway_order.currency,
            key_id: self.gateway.key_id().to_string(),
        })
    }

    /// Verifies the checkout signature and settles the order either way: a
    /// valid signature confirms it, an invalid one marks the payment failed
    /// and cancels it.
    #[instrument(skip(self, input), fields(razorpay_order_id = %input.razorpay_order_id))]
    pub async fn complete_payment(
        &self,
        input: CompletePaymentInput,
    ) -> Result<PaymentResult, ServiceError> {
        input.validate()?;

        let verified = self.gateway.verify_signature(
            &input.razorpay_order_id,
            &input.razorpay_payment_id,
            &input.razorpay_signature,
        );

        if !verified {
            warn!("payment signature mismatch");
            let order = self
                .orders
                .update_payment(
                    &input.razorpay_order_id,
                    &input.razorpay_payment_id,
                    PaymentOutcome::Failed,
                )
                .await?;
            return Ok(PaymentResult {
                verified: false,
                order_id: order.id,
                message: "Payment verification failed".to_string(),
            });
        }

        let order = self
            .orders
            .update_payment(
                &input.razorpay_order_id,
                &input.razorpay_payment_id,
                PaymentOutcome::Paid,
            )
            .await?;

        if let Some(code) = order.coupon_code.as_deref() {
            self.coupons.increment_usage(code).await?;
        }

        match self.settings.get().await {
            Ok(settings) => self.emails.send_order_confirmation(&order, &settings).await,
            Err(e) => warn!(order_id = %order.id, "settings unavailable, skipping emails: {e}"),
        }

        Ok(PaymentResult {
            verified: true,
            order_id: order.id,
            message: "Payment verified".to_string(),
        })
    }

    /// Free above the configured threshold, otherwise the standard rate.
    /// Unconfigured means free.
    async fn shipping_charge(&self, subtotal: Decimal) -> Result<Decimal, ServiceError> {
        let shipping = self.settings.get().await?.shipping;
        if let Some(threshold) = shipping.free_shipping_threshold {
            if subtotal >= threshold {
                return Ok(Decimal::ZERO);
            }
        }
        Ok(shipping.standard_shipping_rate.unwrap_or(Decimal::ZERO))
    }
}
