//! Stripe Checkout Sessions client.
//!
//! Uses the form-encoded Stripe REST API directly with `reqwest`. Only the
//! two calls the checkout workflow needs are implemented: creating a session
//! (with one-shot percentage coupons) and retrieving it for confirmation.

use std::collections::HashMap;
use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::instrument;

use super::PaymentError;

const STRIPE_API_BASE: &str = "https://api.stripe.com/v1";

/// A line item for a checkout session, priced in cents.
#[derive(Debug, Clone)]
pub struct SessionLineItem {
    pub name: String,
    pub image: Option<String>,
    pub unit_amount: i64,
    pub quantity: i64,
}

/// Parameters for creating a checkout session.
#[derive(Debug, Clone)]
pub struct CreateSessionParams {
    pub line_items: Vec<SessionLineItem>,
    pub success_url: String,
    pub cancel_url: String,
    /// Percentage for a one-shot Stripe coupon, when a local coupon applied.
    pub discount_percentage: Option<i64>,
    /// Opaque metadata echoed back on retrieval (user id, coupon code, cart).
    pub metadata: HashMap<String, String>,
}

/// A checkout session as returned by the Stripe API.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    /// `paid`, `unpaid`, or `no_payment_required`.
    pub payment_status: String,
    pub amount_total: Option<i64>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl CheckoutSession {
    /// Whether the session has been paid.
    #[must_use]
    pub fn is_paid(&self) -> bool {
        self.payment_status == "paid"
    }
}

#[derive(Debug, Deserialize)]
struct StripeCoupon {
    id: String,
}

/// Client for the Stripe Checkout API.
#[derive(Clone)]
pub struct StripeClient {
    inner: Arc<StripeClientInner>,
}

struct StripeClientInner {
    client: reqwest::Client,
    base_url: String,
    secret_key: SecretString,
}

impl StripeClient {
    /// Create a new Stripe client.
    #[must_use]
    pub fn new(secret_key: SecretString) -> Self {
        Self::with_base_url(secret_key, STRIPE_API_BASE.to_owned())
    }

    /// Create a client against a non-default API base (tests).
    #[must_use]
    pub fn with_base_url(secret_key: SecretString, base_url: String) -> Self {
        Self {
            inner: Arc::new(StripeClientInner {
                client: reqwest::Client::new(),
                base_url,
                secret_key,
            }),
        }
    }

    /// Create a checkout session.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError` if the API call fails or responds non-2xx.
    #[instrument(skip(self, params), fields(lines = params.line_items.len()))]
    pub async fn create_checkout_session(
        &self,
        params: &CreateSessionParams,
    ) -> Result<CheckoutSession, PaymentError> {
        let mut form: Vec<(String, String)> = vec![
            ("mode".to_owned(), "payment".to_owned()),
            ("payment_method_types[0]".to_owned(), "card".to_owned()),
            ("success_url".to_owned(), params.success_url.clone()),
            ("cancel_url".to_owned(), params.cancel_url.clone()),
        ];

        for (i, item) in params.line_items.iter().enumerate() {
            form.push((
                format!("line_items[{i}][price_data][currency]"),
                "usd".to_owned(),
            ));
            form.push((
                format!("line_items[{i}][price_data][product_data][name]"),
                item.name.clone(),
            ));
            if let Some(image) = &item.image {
                form.push((
                    format!("line_items[{i}][price_data][product_data][images][0]"),
                    image.clone(),
                ));
            }
            form.push((
                format!("line_items[{i}][price_data][unit_amount]"),
                item.unit_amount.to_string(),
            ));
            form.push((format!("line_items[{i}][quantity]"), item.quantity.to_string()));
        }

        if let Some(percentage) = params.discount_percentage {
            let coupon = self.create_coupon(percentage).await?;
            form.push(("discounts[0][coupon]".to_owned(), coupon));
        }

        for (key, value) in &params.metadata {
            form.push((format!("metadata[{key}]"), value.clone()));
        }

        self.post_form("/checkout/sessions", &form).await
    }

    /// Retrieve an existing checkout session by ID.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError` if the API call fails or responds non-2xx.
    #[instrument(skip(self))]
    pub async fn retrieve_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<CheckoutSession, PaymentError> {
        let url = format!("{}/checkout/sessions/{session_id}", self.inner.base_url);
        let response = self
            .inner
            .client
            .get(url)
            .bearer_auth(self.inner.secret_key.expose_secret())
            .send()
            .await?;

        Self::decode(response).await
    }

    /// Create a one-shot percentage coupon and return its ID.
    async fn create_coupon(&self, percent_off: i64) -> Result<String, PaymentError> {
        let form = vec![
            ("percent_off".to_owned(), percent_off.to_string()),
            ("duration".to_owned(), "once".to_owned()),
        ];

        let coupon: StripeCoupon = self.post_form("/coupons", &form).await?;
        Ok(coupon.id)
    }

    async fn post_form<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        form: &[(String, String)],
    ) -> Result<T, PaymentError> {
        let url = format!("{}{path}", self.inner.base_url);
        let response = self
            .inner
            .client
            .post(url)
            .bearer_auth(self.inner.secret_key.expose_secret())
            .form(form)
            .send()
            .await?;

        Self::decode(response).await
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, PaymentError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Stripe API returned non-success status"
            );
            return Err(PaymentError::Provider { status, body });
        }

        serde_json::from_str(&body).map_err(|e| PaymentError::InvalidResponse(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_session_paid_status() {
        let session = CheckoutSession {
            id: "cs_test_123".to_owned(),
            payment_status: "paid".to_owned(),
            amount_total: Some(20000),
            metadata: HashMap::new(),
        };
        assert!(session.is_paid());

        let unpaid = CheckoutSession {
            payment_status: "unpaid".to_owned(),
            ..session
        };
        assert!(!unpaid.is_paid());
    }

    #[test]
    fn test_session_decodes_without_metadata() {
        let session: CheckoutSession = serde_json::from_str(
            r#"{"id": "cs_test_1", "payment_status": "unpaid", "amount_total": 1500}"#,
        )
        .unwrap();
        assert_eq!(session.id, "cs_test_1");
        assert!(session.metadata.is_empty());
    }
}
