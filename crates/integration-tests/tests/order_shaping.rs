//! Integration tests for the legacy response shapes the SPA expects.
//!
//! Orders render a nested `products` array and (on admin return listings) a
//! `returnRequest` object, both reconstructed from the relational join.

use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::json;

use voltmart_core::{
    OrderId, OrderStatus, PaymentMode, ProductId, ReturnStatus, UserId,
};
use voltmart_server::models::order::OrderUserView;
use voltmart_server::models::{Order, OrderLineView, OrderView, Product};

fn sample_product() -> Product {
    Product {
        id: ProductId::new(3),
        name: "LED Bulb Pack".to_owned(),
        description: "Bright, long-lasting LED bulbs.".to_owned(),
        price: Decimal::new(2999, 2),
        sale_price: Some(Decimal::new(1999, 2)),
        image: String::new(),
        category: "ledlights".to_owned(),
        quantity: 120,
        is_featured: false,
        close_out: false,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn sample_order(return_requested: bool) -> Order {
    Order {
        id: OrderId::new(11),
        user_id: UserId::new(2),
        total_amount: Decimal::new(3998, 2),
        status: OrderStatus::Processing,
        mode: PaymentMode::Online,
        address: Some(json!({"name": "John Doe", "city": "Pune"})),
        razorpay_order_id: Some("order_N9zXa".to_owned()),
        razorpay_payment_id: Some("pay_M8yWb".to_owned()),
        stripe_session_id: None,
        return_status: return_requested.then_some(ReturnStatus::Requested),
        return_reason: return_requested.then(|| "damaged".to_owned()),
        return_description: None,
        return_requested_at: return_requested.then(Utc::now),
        is_return_requested: return_requested,
        created_at: Utc::now(),
    }
}

fn sample_lines() -> Vec<OrderLineView> {
    vec![OrderLineView {
        product: sample_product(),
        quantity: 2,
        price: Decimal::new(1999, 2),
    }]
}

#[test]
fn test_customer_history_embeds_products_array() {
    let view = OrderView::for_customer(sample_order(false), sample_lines());
    let body = serde_json::to_value(&view).expect("serializes");

    // Order fields are flattened to the top level, camelCased.
    assert_eq!(body["totalAmount"], json!("39.98"));
    assert_eq!(body["mode"], json!("online"));

    // The nested line carries the full product plus line quantity/price.
    let line = &body["products"][0];
    assert_eq!(line["quantity"], json!(2));
    assert_eq!(line["price"], json!("19.99"));
    assert_eq!(line["product"]["name"], json!("LED Bulb Pack"));
    assert_eq!(line["product"]["salePrice"], json!("19.99"));

    // Customer views don't carry admin-only extras.
    assert!(body.get("returnRequest").is_none());
    assert!(body.get("user").is_none());
}

#[test]
fn test_admin_return_listing_carries_return_request_object() {
    let user = OrderUserView {
        name: "John Doe".to_owned(),
        email: "john@example.com".to_owned(),
    };
    let view = OrderView::for_admin(sample_order(true), sample_lines(), user)
        .with_return_request();
    let body = serde_json::to_value(&view).expect("serializes");

    let request = &body["returnRequest"];
    assert_eq!(request["status"], json!("requested"));
    assert_eq!(request["reason"], json!("damaged"));
    assert_eq!(request["return"], json!(true));

    assert_eq!(body["user"]["email"], json!("john@example.com"));
}

#[test]
fn test_price_at_purchase_survives_catalog_changes() {
    // The line price is the snapshot, independent of the product's current
    // sale price.
    let mut lines = sample_lines();
    lines.first_mut().expect("one line").product.sale_price = Some(Decimal::new(999, 2));

    let view = OrderView::for_customer(sample_order(false), lines);
    let body = serde_json::to_value(&view).expect("serializes");

    assert_eq!(body["products"][0]["price"], json!("19.99"));
    assert_eq!(body["products"][0]["product"]["salePrice"], json!("9.99"));
}
