//! Razorpay Orders client and payment-signature verification.
//!
//! Orders carry the cart snapshot in their `notes` map; the frontend callback
//! is authenticated by an HMAC-SHA256 signature over `order_id|payment_id`
//! computed with the shared key secret.

use std::collections::HashMap;
use std::sync::Arc;

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::instrument;

use super::PaymentError;

const RAZORPAY_API_BASE: &str = "https://api.razorpay.com/v1";

type HmacSha256 = Hmac<Sha256>;

/// Parameters for creating a Razorpay order.
#[derive(Debug, Clone, Serialize)]
pub struct CreateOrderParams {
    /// Amount in the smallest currency unit.
    pub amount: i64,
    pub currency: String,
    pub receipt: String,
    /// Opaque notes echoed back on fetch (user id, coupon code, cart).
    pub notes: HashMap<String, String>,
}

/// A Razorpay order as returned by the API.
#[derive(Debug, Clone, Deserialize)]
pub struct RazorpayOrder {
    pub id: String,
    /// Amount in the smallest currency unit.
    pub amount: i64,
    pub currency: String,
    #[serde(default)]
    pub notes: HashMap<String, String>,
}

/// Client for the Razorpay Orders API.
#[derive(Clone)]
pub struct RazorpayClient {
    inner: Arc<RazorpayClientInner>,
}

struct RazorpayClientInner {
    client: reqwest::Client,
    base_url: String,
    key_id: String,
    key_secret: SecretString,
}

impl RazorpayClient {
    /// Create a new Razorpay client.
    #[must_use]
    pub fn new(key_id: String, key_secret: SecretString) -> Self {
        Self::with_base_url(key_id, key_secret, RAZORPAY_API_BASE.to_owned())
    }

    /// Create a client against a non-default API base (tests).
    #[must_use]
    pub fn with_base_url(key_id: String, key_secret: SecretString, base_url: String) -> Self {
        Self {
            inner: Arc::new(RazorpayClientInner {
                client: reqwest::Client::new(),
                base_url,
                key_id,
                key_secret,
            }),
        }
    }

    /// The public key id, exposed to the frontend for the checkout widget.
    #[must_use]
    pub fn key_id(&self) -> &str {
        &self.inner.key_id
    }

    /// Create an order.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError` if the API call fails or responds non-2xx.
    #[instrument(skip(self, params), fields(amount = params.amount))]
    pub async fn create_order(
        &self,
        params: &CreateOrderParams,
    ) -> Result<RazorpayOrder, PaymentError> {
        let url = format!("{}/orders", self.inner.base_url);
        let response = self
            .inner
            .client
            .post(url)
            .basic_auth(
                &self.inner.key_id,
                Some(self.inner.key_secret.expose_secret()),
            )
            .json(params)
            .send()
            .await?;

        Self::decode(response).await
    }

    /// Fetch an order by ID.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError` if the API call fails or responds non-2xx.
    #[instrument(skip(self))]
    pub async fn fetch_order(&self, order_id: &str) -> Result<RazorpayOrder, PaymentError> {
        let url = format!("{}/orders/{order_id}", self.inner.base_url);
        let response = self
            .inner
            .client
            .get(url)
            .basic_auth(
                &self.inner.key_id,
                Some(self.inner.key_secret.expose_secret()),
            )
            .send()
            .await?;

        Self::decode(response).await
    }

    /// Verify a payment-confirmation signature from the frontend callback.
    #[must_use]
    pub fn verify_payment_signature(
        &self,
        order_id: &str,
        payment_id: &str,
        signature: &str,
    ) -> bool {
        verify_signature(
            self.inner.key_secret.expose_secret().as_bytes(),
            order_id,
            payment_id,
            signature,
        )
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
                "Razorpay API returned non-success status"
            );
            return Err(PaymentError::Provider { status, body });
        }

        serde_json::from_str(&body).map_err(|e| PaymentError::InvalidResponse(e.to_string()))
    }
}

/// Recompute the HMAC-SHA256 of `order_id|payment_id` and compare it against
/// the hex signature the frontend relayed from the checkout widget.
///
/// The comparison runs in constant time via `Mac::verify_slice`, so a
/// forged signature cannot be refined byte-by-byte from timing.
#[must_use]
pub fn verify_signature(secret: &[u8], order_id: &str, payment_id: &str, signature: &str) -> bool {
    let Ok(provided) = hex::decode(signature) else {
        return false;
    };

    let Ok(mut mac) = HmacSha256::new_from_slice(secret) else {
        return false;
    };
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());

    mac.verify_slice(&provided).is_ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test_key_secret";

    fn sign(order_id: &str, payment_id: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(SECRET).unwrap();
        mac.update(format!("{order_id}|{payment_id}").as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn test_valid_signature_accepted() {
        let signature = sign("order_abc", "pay_xyz");
        assert!(verify_signature(SECRET, "order_abc", "pay_xyz", &signature));
    }

    #[test]
    fn test_tampered_signature_rejected() {
        let mut signature = sign("order_abc", "pay_xyz");
        // Flip the last hex digit.
        let last = signature.pop().unwrap();
        signature.push(if last == '0' { '1' } else { '0' });
        assert!(!verify_signature(SECRET, "order_abc", "pay_xyz", &signature));
    }

    #[test]
    fn test_signature_for_different_order_rejected() {
        let signature = sign("order_abc", "pay_xyz");
        assert!(!verify_signature(SECRET, "order_other", "pay_xyz", &signature));
    }

    #[test]
    fn test_non_hex_signature_rejected() {
        assert!(!verify_signature(SECRET, "order_abc", "pay_xyz", "not-hex!"));
    }

    #[test]
    fn test_order_decodes_without_notes() {
        let order: RazorpayOrder = serde_json::from_str(
            r#"{"id": "order_1", "amount": 20000, "currency": "INR"}"#,
        )
        .unwrap();
        assert_eq!(order.amount, 20000);
        assert!(order.notes.is_empty());
    }
}
