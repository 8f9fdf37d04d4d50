//! Payment provider clients.
//!
//! Thin HTTP clients over the Stripe and Razorpay REST APIs using `reqwest`.
//! Both providers receive the cart snapshot as opaque metadata/notes and hand
//! it back on confirmation, so the order-creation path never trusts local
//! state that might have changed mid-checkout.

pub mod razorpay;
pub mod stripe;

pub use razorpay::RazorpayClient;
pub use stripe::StripeClient;

use thiserror::Error;

/// Errors from payment provider calls.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Transport-level failure talking to the provider.
    #[error("provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider returned a non-success status.
    #[error("provider returned {status}: {body}")]
    Provider {
        status: reqwest::StatusCode,
        body: String,
    },

    /// The provider response could not be decoded.
    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
}
