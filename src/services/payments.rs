use hmac::{Hmac, Mac};
use rust_decimal::{prelude::ToPrimitive, Decimal};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::instrument;
use utoipa::ToSchema;

use crate::errors::ServiceError;

type HmacSha256 = Hmac<Sha256>;

/// Minimal Razorpay Orders API client plus checkout signature verification.
#[derive(Clone)]
pub struct RazorpayClient {
    key_id: String,
    key_secret: String,
    base_url: String,
    http: reqwest::Client,
}

/// Gateway order as returned by the order-creation call. `amount` is in the
/// smallest currency unit (paise).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GatewayOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
}

#[derive(Serialize)]
struct CreateOrderBody<'a> {
    amount: i64,
    currency: &'a str,
    receipt: &'a str,
}

impl RazorpayClient {
    pub fn new(key_id: impl Into<String>, key_secret: impl Into<String>) -> Self {
        Self::with_base_url(key_id, key_secret, "https://api.razorpay.com")
    }

    pub fn with_base_url(
        key_id: impl Into<String>,
        key_secret: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            key_id: key_id.into(),
            key_secret: key_secret.into(),
            base_url: base_url.into(),
            http: reqwest::Client::new(),
        }
    }

    /// Public key id, handed to the hosted checkout widget.
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Creates a gateway order sized in paise. The rupee amount is converted
    /// here, once, to an integer so no fractional rounding ambiguity reaches
    /// the gateway.
    #[instrument(skip(self))]
    pub async fn create_order(
        &self,
        amount: Decimal,
        currency: &str,
        receipt: &str,
    ) -> Result<GatewayOrder, ServiceError> {
        if amount <= Decimal::ZERO {
            return Err(ServiceError::InvalidInput("Invalid amount".to_string()));
        }
        let amount_paise = (amount * dec!(100))
            .round()
            .to_i64()
            .ok_or_else(|| ServiceError::InvalidInput("Amount out of range".to_string()))?;

        let response = self
            .http
            .post(format!("{}/v1/orders", self.base_url))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&CreateOrderBody {
                amount: amount_paise,
                currency,
                receipt,
            })
            .send()
            .await
            .map_err(|e| ServiceError::GatewayError(format!("order creation failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::GatewayError(format!(
                "order creation rejected ({status}): {body}"
            )));
        }

        response
            .json::<GatewayOrder>()
            .await
            .map_err(|e| ServiceError::GatewayError(format!("malformed gateway response: {e}")))
    }

    /// Recomputes the checkout signature (HMAC-SHA256 over
    /// `"{order_id}|{payment_id}"` under the key secret, hex-encoded) and
    /// compares it to the one the widget returned.
    pub fn verify_signature(&self, order_id: &str, payment_id: &str, signature: &str) -> bool {
        let mut mac = match HmacSha256::new_from_slice(self.key_secret.as_bytes()) {
            Ok(mac) => mac,
            Err(_) => return false,
        };
        mac.update(format!("{order_id}|{payment_id}").as_bytes());
        let expected = hex::encode(mac.finalize().into_bytes());
        expected == signature
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> RazorpayClient {
        RazorpayClient::new("rzp_test_key", "test_secret")
    }

    fn sign(secret: &str, order_id: &str, payment_id: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(format!("{order_id}|{payment_id}").as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn correct_signature_verifies() {
        let sig = sign("test_secret", "order_abc", "pay_123");
        assert!(client().verify_signature("order_abc", "pay_123", &sig));
    }

    #[test]
    fn any_single_character_mutation_fails() {
        let sig = sign("test_secret", "order_abc", "pay_123");
        for i in 0..sig.len() {
            let mut mutated = sig.clone().into_bytes();
            mutated[i] = if mutated[i] == b'0' { b'1' } else { b'0' };
            let mutated = String::from_utf8(mutated).unwrap();
            if mutated != sig {
                assert!(!client().verify_signature("order_abc", "pay_123", &mutated));
            }
        }
    }

    #[test]
    fn signature_is_bound_to_both_identifiers() {
        let sig = sign("test_secret", "order_abc", "pay_123");
        assert!(!client().verify_signature("order_xyz", "pay_123", &sig));
        assert!(!client().verify_signature("order_abc", "pay_999", &sig));
    }
}
