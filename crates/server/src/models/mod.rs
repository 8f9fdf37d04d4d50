//! Domain models for the Voltmart backend.
//!
//! These structs map directly to rows in the `shop` schema (via `sqlx::FromRow`)
//! and serialize in the camelCase shape the SPA frontend expects.

pub mod cart;
pub mod coupon;
pub mod order;
pub mod product;
pub mod session;
pub mod user;
pub mod warranty;

pub use cart::{CartItem, CartProduct};
pub use coupon::Coupon;
pub use order::{Order, OrderItem, OrderLineView, OrderView, ReturnRequestView};
pub use product::Product;
pub use session::{CurrentUser, session_keys};
pub use user::User;
pub use warranty::WarrantyClaim;
