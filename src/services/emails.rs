use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::entities::order;
use crate::errors::ServiceError;
use crate::models::settings::StoreSettings;
use crate::models::shipping::{OrderItemSnapshot, ShippingAddress};

/// Transactional email sender backed by the Resend HTTP API.
///
/// Every send is best-effort: a failed or unconfigured email is logged and
/// swallowed so checkout never fails on notification problems.
#[derive(Clone)]
pub struct EmailService {
    api_key: Option<String>,
    base_url: String,
    from: String,
    http: reqwest::Client,
}

#[derive(Serialize)]
struct SendEmailBody<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    subject: String,
    html: String,
}

impl EmailService {
    pub fn new(api_key: Option<String>, base_url: impl Into<String>, from: impl Into<String>) -> Self {
        Self {
            api_key,
            base_url: base_url.into(),
            from: from.into(),
            http: reqwest::Client::new(),
        }
    }

    /// Sends the customer confirmation and, if enabled in settings, a copy to
    /// the store inbox. A customer-send failure does not suppress the store
    /// copy.
    #[instrument(skip(self, paid_order, settings), fields(order_id = %paid_order.id))]
    pub async fn send_order_confirmation(&self, paid_order: &order::Model, settings: &StoreSettings) {
        let address: ShippingAddress = match serde_json::from_value(paid_order.shipping_address.clone())
        {
            Ok(a) => a,
            Err(e) => {
                warn!(order_id = %paid_order.id, "unreadable shipping address, skipping emails: {e}");
                return;
            }
        };
        let items: Vec<OrderItemSnapshot> =
            serde_json::from_value(paid_order.items.clone()).unwrap_or_default();

        let subject = format!("Order confirmed: {}", short_id(paid_order));
        let html = confirmation_html(paid_order, &address, &items);
        if let Err(e) = self.send(&address.email, subject, html).await {
            warn!(order_id = %paid_order.id, "customer confirmation email failed: {e}");
        }

        if settings.notifications.order_confirmation && !settings.general.store_email.is_empty() {
            let subject = format!(
                "New order {}: ₹{}",
                short_id(paid_order),
                paid_order.amount.round_dp(2)
            );
            let html = admin_notification_html(paid_order, &address, &items);
            if let Err(e) = self.send(&settings.general.store_email, subject, html).await {
                warn!(order_id = %paid_order.id, "store notification email failed: {e}");
            }
        }
    }

    async fn send(&self, to: &str, subject: String, html: String) -> Result<(), ServiceError> {
        let Some(api_key) = &self.api_key else {
            info!(to, "email sending not configured, skipping");
            return Ok(());
        };

        let response = self
            .http
            .post(format!("{}/emails", self.base_url))
            .bearer_auth(api_key)
            .json(&SendEmailBody {
                from: &self.from,
                to: vec![to],
                subject,
                html,
            })
            .send()
            .await
            .map_err(|e| ServiceError::EmailError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::EmailError(format!("{status}: {body}")));
        }
        Ok(())
    }
}

fn short_id(o: &order::Model) -> String {
    format!("#{}", &o.id.simple().to_string()[..8].to_uppercase())
}

fn items_rows(items: &[OrderItemSnapshot]) -> String {
    items
        .iter()
        .map(|i| {
            format!(
                "<tr><td>{} (size {})</td><td>x{}</td><td>₹{}</td></tr>",
                i.title,
                i.selected_size,
                i.quantity,
                i.line_total().round_dp(2)
            )
        })
        .collect()
}

fn confirmation_html(
    o: &order::Model,
    address: &ShippingAddress,
    items: &[OrderItemSnapshot],
) -> String {
    let discount_row = if o.discount_amount > Decimal::ZERO {
        format!(
            "<p>Discount{}: -₹{}</p>",
            o.coupon_code
                .as_deref()
                .map(|c| format!(" ({c})"))
                .unwrap_or_default(),
            o.discount_amount.round_dp(2)
        )
    } else {
        String::new()
    };
    format!(
        "<h2>Thank you for your order, {first_name}!</h2>\
         <p>Your order {id} is confirmed.</p>\
         <table>{rows}</table>\
         {discount_row}\
         <p><strong>Total paid: ₹{amount}</strong></p>\
         <p>Shipping to: {address}, {city}, {state} {zip}</p>",
        first_name = address.first_name,
        id = short_id(o),
        rows = items_rows(items),
        amount = o.amount.round_dp(2),
        address = address.address,
        city = address.city,
        state = address.state,
        zip = address.zip,
    )
}

fn admin_notification_html(
    o: &order::Model,
    address: &ShippingAddress,
    items: &[OrderItemSnapshot],
) -> String {
    format!(
        "<h2>New order {id}</h2>\
         <p>{first} {last} &lt;{email}&gt;, {phone}</p>\
         <table>{rows}</table>\
         <p><strong>Total: ₹{amount}</strong> (discount ₹{discount})</p>\
         <p>Ship to: {addr}, {city}, {state} {zip}</p>",
        id = short_id(o),
        first = address.first_name,
        last = address.last_name,
        email = address.email,
        phone = address.phone,
        rows = items_rows(items),
        amount = o.amount.round_dp(2),
        discount = o.discount_amount.round_dp(2),
        addr = address.address,
        city = address.city,
        state = address.state,
        zip = address.zip,
    )
}
