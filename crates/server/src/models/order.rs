//! Order models and the legacy response shaping the SPA expects.
//!
//! The frontend predates the relational schema and renders a nested
//! `products` array per order (the old document shape). [`OrderView`]
//! reconstructs that shape from the relational join.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value as JsonValue;

use voltmart_core::{OrderId, OrderItemId, OrderStatus, PaymentMode, ProductId, ReturnStatus, UserId};

use super::Product;

/// A confirmed purchase record.
///
/// Immutable once created except for `status` and the return fields.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub mode: PaymentMode,
    /// Address snapshot taken at checkout time.
    pub address: Option<JsonValue>,
    pub razorpay_order_id: Option<String>,
    pub razorpay_payment_id: Option<String>,
    pub stripe_session_id: Option<String>,
    pub return_status: Option<ReturnStatus>,
    pub return_reason: Option<String>,
    pub return_description: Option<String>,
    pub return_requested_at: Option<DateTime<Utc>>,
    pub is_return_requested: bool,
    pub created_at: DateTime<Utc>,
}

/// A line item snapshot: product, quantity, and price at purchase time.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: i32,
    /// Denormalized price-at-purchase, kept for historical accuracy even
    /// when the catalog price later changes.
    pub price: Decimal,
}

/// One line of an order as the frontend renders it.
#[derive(Debug, Clone, Serialize)]
pub struct OrderLineView {
    pub product: Product,
    pub quantity: i32,
    pub price: Decimal,
}

/// Return-request compatibility object (the old embedded document shape).
#[derive(Debug, Clone, Serialize)]
pub struct ReturnRequestView {
    pub status: Option<ReturnStatus>,
    pub reason: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "return")]
    pub requested: bool,
}

/// An order with its lines reshaped into the legacy `products` array.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    #[serde(flatten)]
    pub order: Order,
    pub products: Vec<OrderLineView>,
    /// Present on admin return listings only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_request: Option<ReturnRequestView>,
    /// Present on admin listings only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<OrderUserView>,
}

/// Minimal user info attached to admin order listings.
#[derive(Debug, Clone, Serialize)]
pub struct OrderUserView {
    pub name: String,
    pub email: String,
}

impl OrderView {
    /// Shape an order and its joined lines for the customer history listing.
    #[must_use]
    pub fn for_customer(order: Order, lines: Vec<OrderLineView>) -> Self {
        Self {
            order,
            products: lines,
            return_request: None,
            user: None,
        }
    }

    /// Shape an order for admin listings, attaching the owning user.
    #[must_use]
    pub fn for_admin(order: Order, lines: Vec<OrderLineView>, user: OrderUserView) -> Self {
        Self {
            order,
            products: lines,
            return_request: None,
            user: Some(user),
        }
    }

    /// Attach the legacy return-request object (admin return listings).
    #[must_use]
    pub fn with_return_request(mut self) -> Self {
        self.return_request = Some(ReturnRequestView {
            status: self.order.return_status,
            reason: self.order.return_reason.clone(),
            description: self.order.return_description.clone(),
            requested: self.order.is_return_requested,
        });
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_order() -> Order {
        Order {
            id: OrderId::new(1),
            user_id: UserId::new(2),
            total_amount: Decimal::new(14999, 2),
            status: OrderStatus::Processing,
            mode: PaymentMode::Online,
            address: None,
            razorpay_order_id: Some("order_abc".to_owned()),
            razorpay_payment_id: Some("pay_abc".to_owned()),
            stripe_session_id: None,
            return_status: Some(ReturnStatus::Requested),
            return_reason: Some("damaged".to_owned()),
            return_description: None,
            return_requested_at: Some(Utc::now()),
            is_return_requested: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_customer_view_has_products_array() {
        let view = OrderView::for_customer(sample_order(), Vec::new());
        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("products").unwrap().is_array());
        // Flattened order fields sit at the top level.
        assert_eq!(json.get("totalAmount").unwrap().as_str(), Some("149.99"));
        assert!(json.get("returnRequest").is_none());
    }

    #[test]
    fn test_return_request_shape() {
        let view = OrderView::for_customer(sample_order(), Vec::new()).with_return_request();
        let json = serde_json::to_value(&view).unwrap();
        let rr = json.get("returnRequest").unwrap();
        assert_eq!(rr.get("status").unwrap().as_str(), Some("requested"));
        assert_eq!(rr.get("return").unwrap().as_bool(), Some(true));
    }
}
