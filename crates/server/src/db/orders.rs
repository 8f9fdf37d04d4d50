//! Order repository.
//!
//! Order creation, stock decrement, and line-item inserts run inside a single
//! transaction: a confirmed payment either produces a complete order or
//! nothing at all.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde_json::Value as JsonValue;
use sqlx::PgPool;

use voltmart_core::{OrderId, OrderStatus, PaymentMode, ProductId, ReturnStatus, UserId};

use super::RepositoryError;
use crate::models::order::OrderUserView;
use crate::models::{Order, OrderLineView, OrderView, Product};

const ORDER_COLUMNS: &str = "id, user_id, total_amount, status, mode, address, \
                             razorpay_order_id, razorpay_payment_id, stripe_session_id, \
                             return_status, return_reason, return_description, \
                             return_requested_at, is_return_requested, created_at";

/// Fields for creating an order.
#[derive(Debug, Clone)]
pub struct CreateOrder {
    pub user_id: UserId,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub mode: PaymentMode,
    pub address: Option<JsonValue>,
    pub razorpay_order_id: Option<String>,
    pub razorpay_payment_id: Option<String>,
    pub stripe_session_id: Option<String>,
}

/// A line item to insert alongside a new order.
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub quantity: i32,
    /// Price-at-purchase snapshot in dollars.
    pub price: Decimal,
}

/// One row of the daily sales aggregate.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DailySalesRow {
    pub day: NaiveDate,
    pub sales: i64,
    pub revenue: Decimal,
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create an order with its line items and decrement product stock, all
    /// in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` when the Stripe session id was
    /// already recorded (webhook replay).
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_with_items(
        &self,
        order: &CreateOrder,
        items: &[NewOrderItem],
    ) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query_as::<_, Order>(&format!(
            "INSERT INTO shop.order \
                 (user_id, total_amount, status, mode, address, \
                  razorpay_order_id, razorpay_payment_id, stripe_session_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(order.user_id)
        .bind(order.total_amount)
        .bind(order.status)
        .bind(order.mode)
        .bind(order.address.clone())
        .bind(order.razorpay_order_id.as_deref())
        .bind(order.razorpay_payment_id.as_deref())
        .bind(order.stripe_session_id.as_deref())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("order already recorded".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        for item in items {
            sqlx::query(
                "INSERT INTO shop.order_item (order_id, product_id, quantity, price) \
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(created.id)
            .bind(item.product_id)
            .bind(item.quantity)
            .bind(item.price)
            .execute(&mut *tx)
            .await?;

            sqlx::query("UPDATE shop.product SET quantity = quantity - $1 WHERE id = $2")
                .bind(item.quantity)
                .bind(item.product_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(created)
    }

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM shop.order WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(order)
    }

    /// Find an order previously created from a Stripe session (replay guard).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_stripe_session(
        &self,
        session_id: &str,
    ) -> Result<Option<Order>, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM shop.order WHERE stripe_session_id = $1"
        ))
        .bind(session_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(order)
    }

    /// A user's orders, newest first, with the legacy `products` shaping.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn history_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<OrderView>, RepositoryError> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM shop.order WHERE user_id = $1 \
             ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        let mut lines = self.lines_for_orders(&orders).await?;

        Ok(orders
            .into_iter()
            .map(|order| {
                let order_lines = lines.remove(&order.id).unwrap_or_default();
                OrderView::for_customer(order, order_lines)
            })
            .collect())
    }

    /// Record a return request on an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn request_return(
        &self,
        id: OrderId,
        reason: &str,
        description: &str,
        requested_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE shop.order SET \
                 return_status = $1, return_reason = $2, return_description = $3, \
                 return_requested_at = $4, is_return_requested = TRUE \
             WHERE id = $5",
        )
        .bind(ReturnStatus::Requested)
        .bind(reason)
        .bind(description)
        .bind(requested_at)
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// All orders with a pending-or-processed return request (admin view),
    /// including the owning user and the legacy `returnRequest` object.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn returns_requested(&self) -> Result<Vec<OrderView>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderWithUserRow>(
            "SELECT o.id, o.user_id, o.total_amount, o.status, o.mode, o.address, \
                    o.razorpay_order_id, o.razorpay_payment_id, o.stripe_session_id, \
                    o.return_status, o.return_reason, o.return_description, \
                    o.return_requested_at, o.is_return_requested, o.created_at, \
                    u.name AS user_name, u.email AS user_email \
             FROM shop.order o \
             JOIN shop.user u ON u.id = o.user_id \
             WHERE o.is_return_requested = TRUE \
             ORDER BY o.return_requested_at DESC",
        )
        .fetch_all(self.pool)
        .await?;

        let orders: Vec<Order> = rows.iter().map(|r| r.order.clone()).collect();
        let mut lines = self.lines_for_orders(&orders).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let order_lines = lines.remove(&row.order.id).unwrap_or_default();
                let user = OrderUserView {
                    name: row.user_name,
                    email: row.user_email,
                };
                OrderView::for_admin(row.order, order_lines, user).with_return_request()
            })
            .collect())
    }

    /// One page of all orders, newest first, plus the total row count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn paginated(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<OrderView>, i64), RepositoryError> {
        let rows = sqlx::query_as::<_, OrderWithUserRow>(
            "SELECT o.id, o.user_id, o.total_amount, o.status, o.mode, o.address, \
                    o.razorpay_order_id, o.razorpay_payment_id, o.stripe_session_id, \
                    o.return_status, o.return_reason, o.return_description, \
                    o.return_requested_at, o.is_return_requested, o.created_at, \
                    u.name AS user_name, u.email AS user_email \
             FROM shop.order o \
             JOIN shop.user u ON u.id = o.user_id \
             ORDER BY o.created_at DESC \
             LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM shop.order")
            .fetch_one(self.pool)
            .await?;

        let orders: Vec<Order> = rows.iter().map(|r| r.order.clone()).collect();
        let mut lines = self.lines_for_orders(&orders).await?;

        let views = rows
            .into_iter()
            .map(|row| {
                let order_lines = lines.remove(&row.order.id).unwrap_or_default();
                let user = OrderUserView {
                    name: row.user_name,
                    email: row.user_email,
                };
                OrderView::for_admin(row.order, order_lines, user)
            })
            .collect();

        Ok((views, total))
    }

    /// Update the return status of an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn set_return_status(
        &self,
        id: OrderId,
        status: ReturnStatus,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE shop.order SET return_status = $1 WHERE id = $2")
            .bind(status)
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Update the fulfillment status of an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn set_status(&self, id: OrderId, status: OrderStatus) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE shop.order SET status = $1 WHERE id = $2")
            .bind(status)
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Total sales count and revenue (analytics).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn sales_totals(&self) -> Result<(i64, Decimal), RepositoryError> {
        let row: (i64, Decimal) = sqlx::query_as(
            "SELECT COUNT(id), COALESCE(SUM(total_amount), 0) FROM shop.order",
        )
        .fetch_one(self.pool)
        .await?;

        Ok(row)
    }

    /// Per-day sales count and revenue over a date range (analytics).
    ///
    /// Days with no orders are absent; the analytics service zero-fills them.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn daily_sales(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<DailySalesRow>, RepositoryError> {
        let rows = sqlx::query_as::<_, DailySalesRow>(
            "SELECT (created_at AT TIME ZONE 'UTC')::date AS day, \
                    COUNT(id) AS sales, \
                    COALESCE(SUM(total_amount), 0) AS revenue \
             FROM shop.order \
             WHERE created_at >= $1 AND created_at <= $2 \
             GROUP BY day \
             ORDER BY day ASC",
        )
        .bind(start)
        .bind(end)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Fetch the joined line items for a set of orders, keyed by order ID.
    async fn lines_for_orders(
        &self,
        orders: &[Order],
    ) -> Result<HashMap<OrderId, Vec<OrderLineView>>, RepositoryError> {
        if orders.is_empty() {
            return Ok(HashMap::new());
        }

        let ids: Vec<i32> = orders.iter().map(|o| o.id.as_i32()).collect();

        let rows = sqlx::query_as::<_, OrderLineRow>(
            "SELECT oi.order_id AS line_order_id, oi.quantity AS line_quantity, \
                    oi.price AS line_price, \
                    p.id, p.name, p.description, p.price, p.sale_price, p.image, p.category, \
                    p.quantity, p.is_featured, p.close_out, p.created_at, p.updated_at \
             FROM shop.order_item oi \
             JOIN shop.product p ON p.id = oi.product_id \
             WHERE oi.order_id = ANY($1) \
             ORDER BY oi.id ASC",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let mut lines: HashMap<OrderId, Vec<OrderLineView>> = HashMap::new();
        for row in rows {
            lines
                .entry(row.line_order_id)
                .or_default()
                .push(OrderLineView {
                    product: row.product,
                    quantity: row.line_quantity,
                    price: row.line_price,
                });
        }

        Ok(lines)
    }
}

#[derive(sqlx::FromRow)]
struct OrderWithUserRow {
    #[sqlx(flatten)]
    order: Order,
    user_name: String,
    user_email: String,
}

#[derive(sqlx::FromRow)]
struct OrderLineRow {
    line_order_id: OrderId,
    line_quantity: i32,
    line_price: Decimal,
    #[sqlx(flatten)]
    product: Product,
}
