//! Integration tests for checkout pricing.
//!
//! These verify the documented money behavior end to end: per-line cent
//! rounding, aggregate percentage discounts, and the coupon award boundary.

use rust_decimal::Decimal;

use voltmart_core::{Money, ProductId};
use voltmart_server::services::checkout::{
    CheckoutLine, discounted_total, stripe_line_items, validate_lines,
};
use voltmart_server::services::coupons::{AWARD_THRESHOLD, qualifies_for_award};

fn line(price: &str, quantity: i64) -> CheckoutLine {
    CheckoutLine {
        id: ProductId::new(1),
        name: Some("Ceiling Fan".to_owned()),
        quantity: Some(quantity),
        price: Some(price.parse().expect("valid decimal")),
        sale_price: None,
        image: None,
    }
}

// =============================================================================
// Discount Math
// =============================================================================

#[test]
fn test_ten_percent_coupon_on_subtotal_of_1000_cents_yields_900() {
    let (_, subtotal) = stripe_line_items(&[line("10.00", 1)]).expect("valid lines");
    assert_eq!(subtotal.cents(), 1000);

    let total = discounted_total(subtotal, Some(10));
    assert_eq!(total.cents(), 900);
}

#[test]
fn test_rounding_happens_per_line_before_discount() {
    // Three units at $0.335: each unit rounds to 34 cents first, so the
    // subtotal is 102, not round(100.5).
    let (_, subtotal) = stripe_line_items(&[line("0.335", 3)]).expect("valid lines");
    assert_eq!(subtotal.cents(), 102);
}

#[test]
fn test_multi_line_cart_sums_after_per_line_rounding() {
    let (items, subtotal) =
        stripe_line_items(&[line("19.99", 2), line("4.995", 1)]).expect("valid lines");

    // 1999 * 2 + round(499.5) = 3998 + 500
    assert_eq!(subtotal.cents(), 4498);
    assert_eq!(items.len(), 2);
}

#[test]
fn test_no_coupon_leaves_total_unchanged() {
    let subtotal = Money::from_cents(12345);
    assert_eq!(discounted_total(subtotal, None), subtotal);
}

// =============================================================================
// Coupon Award Boundary
// =============================================================================

#[test]
fn test_award_triggers_at_exactly_20000_cents() {
    assert_eq!(AWARD_THRESHOLD.cents(), 20000);
    assert!(qualifies_for_award(Money::from_cents(20000)));
}

#[test]
fn test_award_does_not_trigger_at_19999_cents() {
    assert!(!qualifies_for_award(Money::from_cents(19999)));
}

#[test]
fn test_award_checks_the_discounted_total() {
    // $222.21 with a 10% coupon lands at 19999 cents: no award.
    let (_, subtotal) = stripe_line_items(&[line("222.21", 1)]).expect("valid lines");
    let total = discounted_total(subtotal, Some(10));
    assert_eq!(total.cents(), 19999);
    assert!(!qualifies_for_award(total));

    // Without the coupon the same cart qualifies.
    assert!(qualifies_for_award(subtotal));
}

// =============================================================================
// Server-Side Line Validation (Razorpay / COD paths)
// =============================================================================

#[test]
fn test_sale_price_wins_over_list_price() {
    let discounted = CheckoutLine {
        sale_price: Some(Decimal::new(14999, 2)),
        ..line("199.99", 1)
    };

    let validated = validate_lines(&[discounted]).expect("valid line");
    assert_eq!(validated.first().expect("one line").unit_amount.cents(), 14999);
}

#[test]
fn test_invalid_lines_are_rejected() {
    let no_price = CheckoutLine {
        price: None,
        ..line("1.00", 1)
    };
    assert!(validate_lines(&[no_price]).is_err());

    let zero_quantity = line("1.00", 0);
    assert!(validate_lines(&[zero_quantity]).is_err());

    let free = CheckoutLine {
        price: Some(Decimal::ZERO),
        ..line("1.00", 1)
    };
    assert!(validate_lines(&[free]).is_err());
}

#[test]
fn test_quantity_defaults_to_one() {
    let implicit = CheckoutLine {
        quantity: None,
        ..line("2.00", 1)
    };

    let validated = validate_lines(&[implicit]).expect("valid line");
    assert_eq!(validated.first().expect("one line").quantity, 1);
}
