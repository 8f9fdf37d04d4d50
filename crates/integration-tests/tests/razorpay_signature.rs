//! Integration tests for Razorpay payment-signature verification.
//!
//! The confirmation callback is authenticated by an HMAC-SHA256 over
//! `order_id|payment_id`; these tests pin the exact message format and the
//! reject-on-tamper behavior.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use voltmart_server::payments::razorpay::verify_signature;

type HmacSha256 = Hmac<Sha256>;

const SECRET: &[u8] = b"rzp_test_secret_4Xq9";

fn sign_with(secret: &[u8], message: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret).expect("hmac accepts any key length");
    mac.update(message.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

#[test]
fn test_correctly_signed_callback_verifies() {
    let signature = sign_with(SECRET, "order_N9zXa|pay_M8yWb");
    assert!(verify_signature(SECRET, "order_N9zXa", "pay_M8yWb", &signature));
}

#[test]
fn test_message_is_order_id_pipe_payment_id() {
    // Signing the concatenation without the pipe must not verify.
    let signature = sign_with(SECRET, "order_N9zXapay_M8yWb");
    assert!(!verify_signature(SECRET, "order_N9zXa", "pay_M8yWb", &signature));
}

#[test]
fn test_tampered_signature_is_rejected() {
    let mut signature = sign_with(SECRET, "order_N9zXa|pay_M8yWb");

    // Corrupt one nibble.
    let tail = signature.pop().expect("nonempty signature");
    signature.push(if tail == 'f' { 'e' } else { 'f' });

    assert!(!verify_signature(SECRET, "order_N9zXa", "pay_M8yWb", &signature));
}

#[test]
fn test_signature_bound_to_both_ids() {
    let signature = sign_with(SECRET, "order_N9zXa|pay_M8yWb");

    assert!(!verify_signature(SECRET, "order_other", "pay_M8yWb", &signature));
    assert!(!verify_signature(SECRET, "order_N9zXa", "pay_other", &signature));
}

#[test]
fn test_wrong_secret_is_rejected() {
    let signature = sign_with(b"some_other_secret", "order_N9zXa|pay_M8yWb");
    assert!(!verify_signature(SECRET, "order_N9zXa", "pay_M8yWb", &signature));
}

#[test]
fn test_malformed_signatures_are_rejected() {
    assert!(!verify_signature(SECRET, "order_N9zXa", "pay_M8yWb", ""));
    assert!(!verify_signature(SECRET, "order_N9zXa", "pay_M8yWb", "zzzz"));
    assert!(!verify_signature(SECRET, "order_N9zXa", "pay_M8yWb", "deadbeef"));
}
