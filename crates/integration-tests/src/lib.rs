//! Integration tests for Voltmart.
//!
//! These tests exercise in-process logic end to end: checkout pricing,
//! payment-signature verification, and the legacy response shaping the SPA
//! depends on. Nothing here needs the network or a database.
//!
//! # Test Categories
//!
//! - `checkout_totals` - Cart pricing, discounts, and the coupon award boundary
//! - `razorpay_signature` - HMAC verification of payment confirmations
//! - `order_shaping` - Legacy `products`/`returnRequest` response shapes
