use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    entities::coupon::{self, Entity as Coupon},
    errors::ServiceError,
    events::{Event, EventSender},
};

/// Coupon lookup, validation and admin management.
#[derive(Clone)]
pub struct CouponService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

/// Validation result handed back to the checkout surface. Always a structured
/// result, never an error: an invalid coupon is a normal outcome.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CouponValidation {
    pub valid: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon: Option<coupon::Model>,
}

impl CouponValidation {
    fn invalid(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: message.into(),
            discount_amount: None,
            coupon: None,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CouponInput {
    pub code: String,
    pub discount_percent: i32,
    pub min_order_value: Decimal,
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub usage_limit: Option<i32>,
}

fn default_active() -> bool {
    true
}

/// Pure rule evaluation against an already-fetched coupon.
fn evaluate(coupon: &coupon::Model, cart_total: Decimal, now: DateTime<Utc>) -> CouponValidation {
    if let Some(expires_at) = coupon.expires_at {
        if expires_at < now {
            return CouponValidation::invalid("This coupon has expired");
        }
    }
    if let Some(limit) = coupon.usage_limit {
        if coupon.used_count >= limit {
            return CouponValidation::invalid("This coupon has reached its usage limit");
        }
    }
    if cart_total < coupon.min_order_value {
        return CouponValidation::invalid(format!(
            "Minimum order value of ₹{} required",
            coupon.min_order_value.normalize()
        ));
    }

    let discount_amount =
        (cart_total * Decimal::from(coupon.discount_percent) / dec!(100)).round();
    CouponValidation {
        valid: true,
        message: format!("{}% discount applied!", coupon.discount_percent),
        discount_amount: Some(discount_amount),
        coupon: Some(coupon.clone()),
    }
}

impl CouponService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    /// Looks up an active coupon by upper-cased code and checks expiry, usage
    /// limit and minimum order value against the given cart total.
    #[instrument(skip(self))]
    pub async fn validate(
        &self,
        code: &str,
        cart_total: Decimal,
    ) -> Result<CouponValidation, ServiceError> {
        let coupon = Coupon::find()
            .filter(coupon::Column::Code.eq(code.to_uppercase()))
            .filter(coupon::Column::IsActive.eq(true))
            .one(&*self.db)
            .await?;

        Ok(match coupon {
            None => CouponValidation::invalid("Invalid coupon code"),
            Some(coupon) => evaluate(&coupon, cart_total, Utc::now()),
        })
    }

    /// Increments the redemption counter for a code.
    ///
    /// Read-modify-write, not a DB-side increment: concurrent redemptions can
    /// under-count (lost update). Acceptable for coupon counters; a limit
    /// overshoot of one or two is harmless.
    #[instrument(skip(self))]
    pub async fn increment_usage(&self, code: &str) -> Result<(), ServiceError> {
        let coupon = Coupon::find()
            .filter(coupon::Column::Code.eq(code.to_uppercase()))
            .one(&*self.db)
            .await?;

        let Some(coupon) = coupon else {
            warn!(code, "usage increment for unknown coupon");
            return Ok(());
        };

        let used = coupon.used_count;
        let mut active: coupon::ActiveModel = coupon.into();
        active.used_count = Set(used + 1);
        active.update(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::CouponRedeemed {
                code: code.to_uppercase(),
            })
            .await;
        Ok(())
    }

    pub async fn list(&self) -> Result<Vec<coupon::Model>, ServiceError> {
        Ok(Coupon::find()
            .order_by_desc(coupon::Column::CreatedAt)
            .all(&*self.db)
            .await?)
    }

    #[instrument(skip(self, input))]
    pub async fn create(&self, input: CouponInput) -> Result<coupon::Model, ServiceError> {
        if input.discount_percent < 1 || input.discount_percent > 100 {
            return Err(ServiceError::ValidationError(
                "discount_percent must be between 1 and 100".to_string(),
            ));
        }

        let model = coupon::ActiveModel {
            id: Set(Uuid::new_v4()),
            code: Set(input.code.to_uppercase()),
            discount_percent: Set(input.discount_percent),
            min_order_value: Set(input.min_order_value),
            expires_at: Set(input.expires_at),
            is_active: Set(input.is_active),
            usage_limit: Set(input.usage_limit),
            used_count: Set(0),
            created_at: Set(Utc::now()),
        };
        let created = model.insert(&*self.db).await?;
        info!(code = %created.code, "coupon created");
        Ok(created)
    }

    pub async fn set_active(&self, id: Uuid, is_active: bool) -> Result<coupon::Model, ServiceError> {
        let coupon = Coupon::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Coupon {} not found", id)))?;
        let mut active: coupon::ActiveModel = coupon.into();
        active.is_active = Set(is_active);
        Ok(active.update(&*self.db).await?)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let coupon = Coupon::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Coupon {} not found", id)))?;
        coupon.delete(&*self.db).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn winter10() -> coupon::Model {
        coupon::Model {
            id: Uuid::new_v4(),
            code: "WINTER10".into(),
            discount_percent: 10,
            min_order_value: dec!(1000),
            expires_at: None,
            is_active: true,
            usage_limit: None,
            used_count: 0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn valid_coupon_computes_rounded_discount() {
        let result = evaluate(&winter10(), dec!(2000), Utc::now());
        assert!(result.valid);
        assert_eq!(result.discount_amount, Some(dec!(200)));
    }

    #[test]
    fn below_minimum_order_is_invalid_with_minimum_in_message() {
        let result = evaluate(&winter10(), dec!(500), Utc::now());
        assert!(!result.valid);
        assert!(result.message.contains("1000"));
        assert!(result.discount_amount.is_none());
    }

    #[test]
    fn expired_coupon_is_invalid_regardless_of_total() {
        let mut coupon = winter10();
        coupon.expires_at = Some(Utc::now() - Duration::days(1));
        let result = evaluate(&coupon, dec!(100000), Utc::now());
        assert!(!result.valid);
        assert!(result.message.contains("expired"));
    }

    #[test]
    fn exhausted_usage_limit_is_invalid() {
        let mut coupon = winter10();
        coupon.usage_limit = Some(5);
        coupon.used_count = 5;
        let result = evaluate(&coupon, dec!(2000), Utc::now());
        assert!(!result.valid);
        assert!(result.message.contains("usage limit"));
    }

    #[test]
    fn discount_rounds_to_whole_rupees() {
        let mut coupon = winter10();
        coupon.discount_percent = 15;
        // 15% of 1333 = 199.95 → 200
        let result = evaluate(&coupon, dec!(1333), Utc::now());
        assert_eq!(result.discount_amount, Some(dec!(200)));
    }
}
