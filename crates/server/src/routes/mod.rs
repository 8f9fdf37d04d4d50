//! HTTP route handlers for the storefront API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Liveness check
//! GET  /health/ready                    - Readiness check (probes the pool)
//!
//! # Auth
//! POST /api/auth/signup                 - Register (logs the user in)
//! POST /api/auth/login                  - Login
//! POST /api/auth/logout                 - Logout
//! GET  /api/auth/profile                - Current user
//!
//! # Products
//! GET  /api/products                    - All products (admin)
//! GET  /api/products/featured           - Featured listing (cached)
//! GET  /api/products/category/{category} - Category listing (excludes close-out)
//! GET  /api/products/clearance          - Close-out listing
//! GET  /api/products/recommended        - Random sample
//! GET  /api/products/search?name=       - Name search
//! GET  /api/products/pdp/{name}         - Product detail by name
//! POST /api/products                    - Create product (admin)
//! DELETE /api/products/{id}             - Delete product (admin)
//! PATCH /api/products/{id}              - Edit product (admin)
//! PATCH /api/products/{id}/toggle-featured - Flip featured flag (admin)
//! POST /api/products/update-quantity    - Stock pre-check
//! POST /api/products/claim-warranty     - File a warranty claim
//! GET  /api/products/warranty-claims    - Claims dashboard (admin)
//! PATCH /api/products/warranty-claims/{id} - Claim status transition (admin)
//!
//! # Cart
//! GET  /api/cart                        - Cart contents (products + quantities)
//! POST /api/cart                        - Add to cart
//! DELETE /api/cart                      - Remove one product / clear cart
//! PUT  /api/cart/{id}                   - Set line quantity (0 deletes)
//! POST /api/cart/billing-address        - Upsert billing address
//!
//! # Coupons
//! GET  /api/coupons                     - Current active coupon
//! POST /api/coupons/validate            - Validate a code
//!
//! # Payments
//! POST /api/payments/create-checkout-session          - Stripe session
//! POST /api/payments/checkout-success                 - Stripe confirmation
//! POST /api/payments/create-checkout-session-razorpay - Razorpay order
//! POST /api/payments/razorpay-success                 - Razorpay confirmation
//! POST /api/payments/place-order-cod                  - Cash on delivery
//!
//! # Orders
//! GET  /api/orders/history              - Customer order history
//! POST /api/orders/return               - Request a return
//! GET  /api/orders/returns              - Return requests (admin)
//! GET  /api/orders/all                  - Paginated order list (admin)
//! PATCH /api/orders/{id}/return-status  - Return status transition (admin)
//! PATCH /api/orders/{id}/status         - Order status transition (admin)
//!
//! # Analytics
//! GET  /api/analytics                   - Dashboard numbers (admin)
//! ```

pub mod analytics;
pub mod auth;
pub mod cart;
pub mod coupons;
pub mod orders;
pub mod payments;
pub mod products;

use axum::{
    Router,
    routing::{delete, get, patch, post, put},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/profile", get(auth::profile))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route("/featured", get(products::featured))
        .route("/category/{category}", get(products::by_category))
        .route("/clearance", get(products::clearance))
        .route("/recommended", get(products::recommended))
        .route("/search", get(products::search))
        .route("/pdp/{name}", get(products::pdp))
        .route("/update-quantity", post(products::check_quantity))
        .route("/claim-warranty", post(products::claim_warranty))
        .route("/warranty-claims", get(products::warranty_claims))
        .route(
            "/warranty-claims/{id}",
            patch(products::update_warranty_status),
        )
        .route("/{id}", delete(products::remove).patch(products::edit))
        .route("/{id}/toggle-featured", patch(products::toggle_featured))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::index).post(cart::add).delete(cart::remove))
        .route("/billing-address", post(cart::set_billing_address))
        .route("/{id}", put(cart::update_quantity))
}

/// Create the coupon routes router.
pub fn coupon_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(coupons::current))
        .route("/validate", post(coupons::validate))
}

/// Create the payment routes router.
pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/create-checkout-session",
            post(payments::create_checkout_session),
        )
        .route("/checkout-success", post(payments::checkout_success))
        .route(
            "/create-checkout-session-razorpay",
            post(payments::create_checkout_session_razorpay),
        )
        .route("/razorpay-success", post(payments::razorpay_success))
        .route("/place-order-cod", post(payments::place_order_cod))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/history", get(orders::history))
        .route("/return", post(orders::request_return))
        .route("/returns", get(orders::return_history))
        .route("/all", get(orders::all))
        .route("/{id}/return-status", patch(orders::change_return_status))
        .route("/{id}/status", patch(orders::change_status))
}

/// Create all API routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/auth", auth_routes())
        .nest("/api/products", product_routes())
        .nest("/api/cart", cart_routes())
        .nest("/api/coupons", coupon_routes())
        .nest("/api/payments", payment_routes())
        .nest("/api/orders", order_routes())
        .route("/api/analytics", get(analytics::dashboard))
}
