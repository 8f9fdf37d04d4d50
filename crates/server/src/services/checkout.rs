//! Checkout workflow: turn a client-supplied cart snapshot into a payment
//! provider session or a placed order.
//!
//! Three paths share this module:
//!
//! - **Stripe**: build line items from the client's prices (the snapshot is
//!   NOT re-priced against the catalog; the provider session is the source of
//!   truth for what gets charged), stash the snapshot in session metadata,
//!   and create the order when the session comes back `paid`.
//! - **Razorpay**: re-validate every line server-side, create a provider
//!   order carrying the snapshot in its notes, and create the local order
//!   once the HMAC-signed confirmation arrives.
//! - **Cash on delivery**: no provider; the order is created synchronously.
//!
//! Every confirmation path creates the order, its items, and the stock
//! decrement in a single transaction.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use thiserror::Error;
use tracing::instrument;
use uuid::Uuid;

use voltmart_core::{Money, OrderId, OrderStatus, PaymentMode, ProductId, UserId};

use crate::db::RepositoryError;
use crate::db::cart::CartRepository;
use crate::db::orders::{CreateOrder, NewOrderItem, OrderRepository};
use crate::models::User;
use crate::payments::razorpay::CreateOrderParams;
use crate::payments::stripe::{CreateSessionParams, SessionLineItem};
use crate::payments::{PaymentError, RazorpayClient, StripeClient};
use crate::services::coupons::{CouponError, CouponService, qualifies_for_award};
use crate::services::email::{NotificationQueue, OrderNotification, format_address_line};

/// A cart line exactly as the client submitted it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutLine {
    #[serde(alias = "_id")]
    pub id: ProductId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub sale_price: Option<Decimal>,
    #[serde(default)]
    pub image: Option<String>,
}

impl CheckoutLine {
    /// Unit price a shopper pays for this line: sale price when present.
    #[must_use]
    pub fn resolve_unit_price(&self) -> Option<Decimal> {
        self.sale_price.or(self.price)
    }

    fn display_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| "item".to_owned())
    }
}

/// The minimal line snapshot serialized into provider metadata/notes and
/// read back on confirmation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotLine {
    pub id: ProductId,
    pub quantity: i64,
    pub price: Decimal,
}

/// A line that passed server-side validation (Razorpay and COD paths).
#[derive(Debug, Clone)]
pub struct ValidatedLine {
    pub id: ProductId,
    pub name: String,
    pub quantity: i64,
    /// Resolved unit price in dollars.
    pub unit_price: Decimal,
    /// Resolved unit price in cents.
    pub unit_amount: Money,
}

/// Errors from the checkout workflow.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The client sent no products.
    #[error("invalid or empty products array")]
    EmptyCart,

    /// The user has no usable checkout address.
    #[error("user address is required for checkout")]
    AddressRequired,

    /// A line failed price/quantity validation.
    #[error("invalid product price or quantity for {0}")]
    InvalidLine(String),

    /// The provider session has not been paid.
    #[error("payment not completed")]
    NotPaid,

    /// The payment confirmation signature did not verify.
    #[error("invalid signature")]
    InvalidSignature,

    /// Provider metadata/notes came back malformed.
    #[error("invalid provider metadata: {0}")]
    Metadata(String),

    /// Provider call failed.
    #[error(transparent)]
    Payment(#[from] PaymentError),

    /// Database operation failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Coupon operation failed.
    #[error(transparent)]
    Coupon(#[from] CouponError),
}

/// Response for a created Stripe session.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StripeSessionResponse {
    pub id: String,
    /// Discounted total in dollars.
    pub total_amount: Decimal,
}

/// Response for a created Razorpay order.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RazorpayOrderResponse {
    pub id: String,
    pub total_amount: Decimal,
    pub key_id: String,
}

/// Response after a confirmed payment created an order.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderConfirmation {
    pub success: bool,
    pub message: String,
    pub order_id: OrderId,
}

/// Checkout workflow service.
pub struct CheckoutService<'a> {
    pool: &'a PgPool,
    stripe: &'a StripeClient,
    razorpay: &'a RazorpayClient,
    notifications: &'a NotificationQueue,
    client_url: &'a str,
}

impl<'a> CheckoutService<'a> {
    /// Create a new checkout service.
    #[must_use]
    pub const fn new(
        pool: &'a PgPool,
        stripe: &'a StripeClient,
        razorpay: &'a RazorpayClient,
        notifications: &'a NotificationQueue,
        client_url: &'a str,
    ) -> Self {
        Self {
            pool,
            stripe,
            razorpay,
            notifications,
            client_url,
        }
    }

    // =========================================================================
    // Stripe path
    // =========================================================================

    /// Create a Stripe checkout session from the client cart snapshot.
    ///
    /// Awards a fresh 10% coupon when the discounted total reaches the award
    /// threshold, replacing any coupon the user already held.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCart` on an empty snapshot, or payment /
    /// repository errors from the provider call and coupon bookkeeping.
    #[instrument(skip(self, lines, coupon_code), fields(user_id = %user_id, lines = lines.len()))]
    pub async fn create_stripe_session(
        &self,
        user_id: UserId,
        lines: &[CheckoutLine],
        coupon_code: Option<&str>,
    ) -> Result<StripeSessionResponse, CheckoutError> {
        if lines.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let (line_items, subtotal) = stripe_line_items(lines)?;

        let coupons = CouponService::new(self.pool);
        let coupon = match coupon_code.filter(|c| !c.is_empty()) {
            Some(code) => coupons.find_applied(code, user_id).await?,
            None => None,
        };

        let total = discounted_total(subtotal, coupon.as_ref().map(|c| c.discount_percentage));

        let snapshot: Vec<SnapshotLine> = lines
            .iter()
            .map(|l| SnapshotLine {
                id: l.id,
                quantity: l.quantity.unwrap_or(1),
                price: l.price.unwrap_or_default(),
            })
            .collect();

        let mut metadata = HashMap::new();
        metadata.insert("userId".to_owned(), user_id.to_string());
        metadata.insert(
            "couponCode".to_owned(),
            coupon_code.unwrap_or_default().to_owned(),
        );
        metadata.insert(
            "products".to_owned(),
            serde_json::to_string(&snapshot)
                .map_err(|e| CheckoutError::Metadata(e.to_string()))?,
        );

        let params = CreateSessionParams {
            line_items,
            success_url: format!(
                "{}/purchase-success?session_id={{CHECKOUT_SESSION_ID}}",
                self.client_url
            ),
            cancel_url: format!("{}/purchase-cancel", self.client_url),
            discount_percentage: coupon.as_ref().map(|c| i64::from(c.discount_percentage)),
            metadata,
        };

        let session = self.stripe.create_checkout_session(&params).await?;

        if qualifies_for_award(total) {
            let awarded = coupons.award(user_id).await?;
            tracing::info!(code = %awarded.code, "Awarded checkout coupon");
        }

        Ok(StripeSessionResponse {
            id: session.id,
            total_amount: total.as_dollars(),
        })
    }

    /// Confirm a paid Stripe session and create the order from the metadata
    /// snapshot.
    ///
    /// Replays are harmless: a session that already produced an order returns
    /// that order instead of creating a second one.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::NotPaid` when the session isn't paid, or
    /// metadata / repository errors while creating the order.
    #[instrument(skip(self))]
    pub async fn confirm_stripe_session(
        &self,
        session_id: &str,
    ) -> Result<OrderConfirmation, CheckoutError> {
        let session = self.stripe.retrieve_checkout_session(session_id).await?;

        if !session.is_paid() {
            return Err(CheckoutError::NotPaid);
        }

        let orders = OrderRepository::new(self.pool);

        if let Some(existing) = orders.find_by_stripe_session(session_id).await? {
            tracing::info!(order_id = %existing.id, "Stripe session already recorded");
            return Ok(confirmation(existing.id));
        }

        let user_id: UserId = session
            .metadata
            .get("userId")
            .and_then(|v| v.parse::<i32>().ok())
            .map(UserId::new)
            .ok_or_else(|| CheckoutError::Metadata("missing userId".to_owned()))?;

        let snapshot: Vec<SnapshotLine> = session
            .metadata
            .get("products")
            .map(|raw| serde_json::from_str(raw))
            .transpose()
            .map_err(|e| CheckoutError::Metadata(e.to_string()))?
            .ok_or_else(|| CheckoutError::Metadata("missing products".to_owned()))?;

        if let Some(code) = session.metadata.get("couponCode").filter(|c| !c.is_empty()) {
            CouponService::new(self.pool).consume(code, user_id).await?;
        }

        let amount_total = session
            .amount_total
            .ok_or_else(|| CheckoutError::Metadata("missing amount_total".to_owned()))?;

        let order = CreateOrder {
            user_id,
            total_amount: Money::from_cents(amount_total).as_dollars(),
            status: OrderStatus::Pending,
            mode: PaymentMode::Online,
            address: None,
            razorpay_order_id: None,
            razorpay_payment_id: None,
            stripe_session_id: Some(session_id.to_owned()),
        };

        let items = snapshot_items(&snapshot)?;

        let created = match orders.create_with_items(&order, &items).await {
            Ok(created) => created,
            // Lost a race with a concurrent confirmation for the same session.
            Err(RepositoryError::Conflict(_)) => {
                let existing = orders
                    .find_by_stripe_session(session_id)
                    .await?
                    .ok_or(RepositoryError::NotFound)?;
                return Ok(confirmation(existing.id));
            }
            Err(e) => return Err(e.into()),
        };

        Ok(confirmation(created.id))
    }

    // =========================================================================
    // Razorpay path
    // =========================================================================

    /// Create a Razorpay order from the cart snapshot.
    ///
    /// Unlike the Stripe path, every line is re-validated server-side. The
    /// user's cart is cleared and the owner notification enqueued as soon as
    /// the provider order exists, before payment confirmation.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCart`, `AddressRequired`, or
    /// `InvalidLine` on validation failure, or provider/repository errors.
    #[instrument(skip(self, user, lines), fields(user_id = %user.id, lines = lines.len()))]
    pub async fn create_razorpay_order(
        &self,
        user: &User,
        lines: &[CheckoutLine],
    ) -> Result<RazorpayOrderResponse, CheckoutError> {
        if lines.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        if !user.has_checkout_address() {
            return Err(CheckoutError::AddressRequired);
        }

        let validated = validate_lines(lines)?;
        let total: Money = validated
            .iter()
            .map(|l| l.unit_amount.times(l.quantity))
            .sum();

        let snapshot: Vec<SnapshotLine> = validated
            .iter()
            .map(|l| SnapshotLine {
                id: l.id,
                quantity: l.quantity,
                price: l.unit_price,
            })
            .collect();

        let mut notes = HashMap::new();
        notes.insert("userId".to_owned(), user.id.to_string());
        notes.insert(
            "products".to_owned(),
            serde_json::to_string(&snapshot)
                .map_err(|e| CheckoutError::Metadata(e.to_string()))?,
        );

        let params = CreateOrderParams {
            amount: total.cents(),
            currency: "INR".to_owned(),
            receipt: format!("receipt_{}", Uuid::new_v4().simple()),
            notes,
        };

        let provider_order = self.razorpay.create_order(&params).await?;

        // Cart is cleared before provider confirmation; an abandoned payment
        // leaves the shopper with an empty cart.
        CartRepository::new(self.pool).clear(user.id).await?;

        self.notifications.enqueue(OrderNotification {
            customer_name: user.name.clone(),
            order_ref: provider_order.id.clone(),
            items_summary: items_summary(&validated),
            total_amount: total.as_dollars(),
            address_line: format_address_line(user.address.as_ref()),
            payment_mode: "Online Payment".to_owned(),
        });

        Ok(RazorpayOrderResponse {
            id: provider_order.id,
            total_amount: total.as_dollars(),
            key_id: self.razorpay.key_id().to_owned(),
        })
    }

    /// Confirm a Razorpay payment callback and create the order.
    ///
    /// The signature over `order_id|payment_id` is verified in constant time
    /// before anything is read or written.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::InvalidSignature` on a tampered callback, or
    /// metadata / repository errors while creating the order.
    #[instrument(skip(self, user, signature), fields(user_id = %user.id))]
    pub async fn confirm_razorpay_payment(
        &self,
        user: &User,
        order_id: &str,
        payment_id: &str,
        signature: &str,
    ) -> Result<OrderConfirmation, CheckoutError> {
        if !self
            .razorpay
            .verify_payment_signature(order_id, payment_id, signature)
        {
            return Err(CheckoutError::InvalidSignature);
        }

        let provider_order = self.razorpay.fetch_order(order_id).await?;

        let user_id: UserId = provider_order
            .notes
            .get("userId")
            .and_then(|v| v.parse::<i32>().ok())
            .map(UserId::new)
            .ok_or_else(|| CheckoutError::Metadata("missing userId".to_owned()))?;

        let snapshot: Vec<SnapshotLine> = provider_order
            .notes
            .get("products")
            .map(|raw| serde_json::from_str(raw))
            .transpose()
            .map_err(|e| CheckoutError::Metadata(e.to_string()))?
            .ok_or_else(|| CheckoutError::Metadata("missing products".to_owned()))?;

        if let Some(code) = provider_order
            .notes
            .get("couponCode")
            .filter(|c| !c.is_empty())
        {
            CouponService::new(self.pool).consume(code, user_id).await?;
        }

        let order = CreateOrder {
            user_id,
            total_amount: Money::from_cents(provider_order.amount).as_dollars(),
            status: OrderStatus::Processing,
            mode: PaymentMode::Online,
            address: user.address.clone(),
            razorpay_order_id: Some(order_id.to_owned()),
            razorpay_payment_id: Some(payment_id.to_owned()),
            stripe_session_id: None,
        };

        let items = snapshot_items(&snapshot)?;
        let created = OrderRepository::new(self.pool)
            .create_with_items(&order, &items)
            .await?;

        Ok(confirmation(created.id))
    }

    // =========================================================================
    // Cash on delivery
    // =========================================================================

    /// Place an order paid on delivery.
    ///
    /// No provider is involved; the order is created synchronously with the
    /// same validation the Razorpay path applies. An empty snapshot performs
    /// no writes.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCart`, `AddressRequired`, or
    /// `InvalidLine` on validation failure, or repository errors.
    #[instrument(skip(self, user, lines), fields(user_id = %user.id, lines = lines.len()))]
    pub async fn place_cod_order(
        &self,
        user: &User,
        lines: &[CheckoutLine],
    ) -> Result<OrderConfirmation, CheckoutError> {
        if lines.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        if !user.has_checkout_address() {
            return Err(CheckoutError::AddressRequired);
        }

        let validated = validate_lines(lines)?;
        let total: Money = validated
            .iter()
            .map(|l| l.unit_amount.times(l.quantity))
            .sum();

        let order = CreateOrder {
            user_id: user.id,
            total_amount: total.as_dollars(),
            status: OrderStatus::Pending,
            mode: PaymentMode::Cod,
            address: user.address.clone(),
            razorpay_order_id: None,
            razorpay_payment_id: None,
            stripe_session_id: None,
        };

        let items: Vec<NewOrderItem> = validated
            .iter()
            .map(|l| {
                i32::try_from(l.quantity)
                    .map(|quantity| NewOrderItem {
                        product_id: l.id,
                        quantity,
                        price: l.unit_price,
                    })
                    .map_err(|_| CheckoutError::InvalidLine(l.name.clone()))
            })
            .collect::<Result<_, _>>()?;

        let created = OrderRepository::new(self.pool)
            .create_with_items(&order, &items)
            .await?;

        self.notifications.enqueue(OrderNotification {
            customer_name: user.name.clone(),
            order_ref: created.id.to_string(),
            items_summary: items_summary(&validated),
            total_amount: total.as_dollars(),
            address_line: format_address_line(user.address.as_ref()),
            payment_mode: "Cash on Delivery".to_owned(),
        });

        CartRepository::new(self.pool).clear(user.id).await?;

        Ok(OrderConfirmation {
            success: true,
            message: "Order placed successfully with Cash on Delivery".to_owned(),
            order_id: created.id,
        })
    }
}

// =============================================================================
// Pure helpers
// =============================================================================

/// Build Stripe line items from client prices and compute the subtotal.
///
/// Each line's unit price is rounded to cents before the quantity multiply,
/// so the aggregate matches what the provider will charge per line.
///
/// # Errors
///
/// Returns `CheckoutError::InvalidLine` when a line has no usable price.
pub fn stripe_line_items(
    lines: &[CheckoutLine],
) -> Result<(Vec<SessionLineItem>, Money), CheckoutError> {
    let mut items = Vec::with_capacity(lines.len());
    let mut subtotal = Money::ZERO;

    for line in lines {
        let unit = line
            .price
            .and_then(Money::from_price)
            .ok_or_else(|| CheckoutError::InvalidLine(line.display_name()))?;
        let quantity = line.quantity.unwrap_or(1);

        subtotal += unit.times(quantity);
        items.push(SessionLineItem {
            name: line.display_name(),
            image: line.image.clone().map(ensure_https),
            unit_amount: unit.cents(),
            quantity,
        });
    }

    Ok((items, subtotal))
}

/// Validate lines for the Razorpay and COD paths: resolved unit price must be
/// positive and the quantity at least 1.
///
/// # Errors
///
/// Returns `CheckoutError::InvalidLine` naming the offending item.
pub fn validate_lines(lines: &[CheckoutLine]) -> Result<Vec<ValidatedLine>, CheckoutError> {
    lines
        .iter()
        .map(|line| {
            let unit_price = line
                .resolve_unit_price()
                .filter(|p| p.is_sign_positive() && !p.is_zero())
                .ok_or_else(|| CheckoutError::InvalidLine(line.display_name()))?;
            let quantity = line.quantity.unwrap_or(1);
            if quantity < 1 {
                return Err(CheckoutError::InvalidLine(line.display_name()));
            }
            let unit_amount = Money::from_price(unit_price)
                .ok_or_else(|| CheckoutError::InvalidLine(line.display_name()))?;

            Ok(ValidatedLine {
                id: line.id,
                name: line.display_name(),
                quantity,
                unit_price,
                unit_amount,
            })
        })
        .collect()
}

/// Apply an optional percentage discount to a subtotal.
#[must_use]
pub fn discounted_total(subtotal: Money, discount_percentage: Option<i32>) -> Money {
    match discount_percentage {
        Some(pct) => subtotal.apply_discount_percent(i64::from(pct)),
        None => subtotal,
    }
}

/// Upgrade plain-http image URLs before they reach the provider.
fn ensure_https(url: String) -> String {
    url.strip_prefix("http://")
        .map_or(url.clone(), |rest| format!("https://{rest}"))
}

fn items_summary(lines: &[ValidatedLine]) -> String {
    lines
        .iter()
        .map(|l| l.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn snapshot_items(snapshot: &[SnapshotLine]) -> Result<Vec<NewOrderItem>, CheckoutError> {
    snapshot
        .iter()
        .map(|line| {
            i32::try_from(line.quantity)
                .map(|quantity| NewOrderItem {
                    product_id: line.id,
                    quantity,
                    price: line.price,
                })
                .map_err(|_| CheckoutError::Metadata("quantity out of range".to_owned()))
        })
        .collect()
}

fn confirmation(order_id: OrderId) -> OrderConfirmation {
    OrderConfirmation {
        success: true,
        message: "Payment successful, order created, and coupon deactivated if used.".to_owned(),
        order_id,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn line(price: &str, quantity: i64) -> CheckoutLine {
        CheckoutLine {
            id: ProductId::new(1),
            name: Some("Ceiling Fan".to_owned()),
            quantity: Some(quantity),
            price: Some(price.parse().unwrap()),
            sale_price: None,
            image: None,
        }
    }

    #[test]
    fn test_stripe_subtotal_rounds_per_line() {
        // 0.333 rounds to 33 cents per unit BEFORE the quantity multiply:
        // 33 * 3 = 99, not round(99.9) = 100.
        let (_, subtotal) = stripe_line_items(&[line("0.333", 3)]).unwrap();
        assert_eq!(subtotal.cents(), 99);
    }

    #[test]
    fn test_stripe_subtotal_sums_lines() {
        let (items, subtotal) =
            stripe_line_items(&[line("5.00", 2), line("2.50", 1)]).unwrap();
        assert_eq!(subtotal.cents(), 1250);
        assert_eq!(items.len(), 2);
        assert_eq!(items.first().unwrap().unit_amount, 500);
    }

    #[test]
    fn test_ten_percent_coupon_on_thousand_cents() {
        let (_, subtotal) = stripe_line_items(&[line("10.00", 1)]).unwrap();
        assert_eq!(subtotal.cents(), 1000);
        assert_eq!(discounted_total(subtotal, Some(10)).cents(), 900);
    }

    #[test]
    fn test_stripe_line_without_price_rejected() {
        let bad = CheckoutLine {
            price: None,
            ..line("1.00", 1)
        };
        assert!(matches!(
            stripe_line_items(&[bad]),
            Err(CheckoutError::InvalidLine(_))
        ));
    }

    #[test]
    fn test_missing_quantity_defaults_to_one() {
        let one = CheckoutLine {
            quantity: None,
            ..line("4.00", 1)
        };
        let (items, subtotal) = stripe_line_items(&[one]).unwrap();
        assert_eq!(subtotal.cents(), 400);
        assert_eq!(items.first().unwrap().quantity, 1);
    }

    #[test]
    fn test_validate_lines_prefers_sale_price() {
        let discounted = CheckoutLine {
            sale_price: Some("3.00".parse().unwrap()),
            ..line("4.00", 2)
        };
        let validated = validate_lines(&[discounted]).unwrap();
        let first = validated.first().unwrap();
        assert_eq!(first.unit_amount.cents(), 300);
        assert_eq!(first.unit_price, "3.00".parse().unwrap());
    }

    #[test]
    fn test_validate_lines_rejects_nonpositive_price() {
        let free = CheckoutLine {
            price: Some(Decimal::ZERO),
            ..line("0", 1)
        };
        assert!(matches!(
            validate_lines(&[free]),
            Err(CheckoutError::InvalidLine(_))
        ));

        let negative = CheckoutLine {
            price: Some("-1.00".parse().unwrap()),
            ..line("1.00", 1)
        };
        assert!(matches!(
            validate_lines(&[negative]),
            Err(CheckoutError::InvalidLine(_))
        ));
    }

    #[test]
    fn test_validate_lines_rejects_zero_quantity() {
        assert!(matches!(
            validate_lines(&[line("1.00", 0)]),
            Err(CheckoutError::InvalidLine(_))
        ));
    }

    #[test]
    fn test_ensure_https_upgrades_plain_http() {
        assert_eq!(
            ensure_https("http://cdn.example.com/fan.jpg".to_owned()),
            "https://cdn.example.com/fan.jpg"
        );
        assert_eq!(
            ensure_https("https://cdn.example.com/fan.jpg".to_owned()),
            "https://cdn.example.com/fan.jpg"
        );
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let snapshot = vec![SnapshotLine {
            id: ProductId::new(7),
            quantity: 2,
            price: "49.99".parse().unwrap(),
        }];
        let raw = serde_json::to_string(&snapshot).unwrap();
        let parsed: Vec<SnapshotLine> = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed.first().unwrap().id, ProductId::new(7));
        assert_eq!(parsed.first().unwrap().quantity, 2);
    }

    #[test]
    fn test_snapshot_items_converts_quantities() {
        let snapshot = vec![SnapshotLine {
            id: ProductId::new(7),
            quantity: 3,
            price: "9.99".parse().unwrap(),
        }];
        let items = snapshot_items(&snapshot).unwrap();
        assert_eq!(items.first().unwrap().quantity, 3);

        let overflow = vec![SnapshotLine {
            id: ProductId::new(7),
            quantity: i64::MAX,
            price: "9.99".parse().unwrap(),
        }];
        assert!(matches!(
            snapshot_items(&overflow),
            Err(CheckoutError::Metadata(_))
        ));
    }
}
