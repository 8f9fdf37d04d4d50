//! Admin dashboard analytics.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;

use crate::db::RepositoryError;
use crate::db::orders::{DailySalesRow, OrderRepository};
use crate::db::products::ProductRepository;
use crate::db::users::UserRepository;

/// Headline numbers for the dashboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub users: i64,
    pub products: i64,
    pub total_sales: i64,
    pub total_revenue: Decimal,
}

/// One day of the sales chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailySalesPoint {
    pub date: NaiveDate,
    pub sales: i64,
    pub revenue: Decimal,
}

/// Analytics service.
pub struct AnalyticsService<'a> {
    pool: &'a PgPool,
}

impl<'a> AnalyticsService<'a> {
    /// Create a new analytics service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Headline counts and revenue.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if any aggregate query fails.
    pub async fn summary(&self) -> Result<AnalyticsSummary, RepositoryError> {
        let users = UserRepository::new(self.pool).count().await?;
        let products = ProductRepository::new(self.pool).count().await?;
        let (total_sales, total_revenue) = OrderRepository::new(self.pool).sales_totals().await?;

        Ok(AnalyticsSummary {
            users,
            products,
            total_sales,
            total_revenue,
        })
    }

    /// Daily sales over a range, zero-filling days with no orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the aggregate query fails.
    pub async fn daily_sales(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<DailySalesPoint>, RepositoryError> {
        let rows = OrderRepository::new(self.pool).daily_sales(start, end).await?;

        Ok(fill_date_range(
            start.date_naive(),
            end.date_naive(),
            &rows,
        ))
    }
}

/// Expand sparse per-day aggregates into a dense series over the range.
fn fill_date_range(start: NaiveDate, end: NaiveDate, rows: &[DailySalesRow]) -> Vec<DailySalesPoint> {
    let mut points = Vec::new();
    let mut current = start;

    while current <= end {
        let found = rows.iter().find(|r| r.day == current);
        points.push(DailySalesPoint {
            date: current,
            sales: found.map_or(0, |r| r.sales),
            revenue: found.map_or(Decimal::ZERO, |r| r.revenue),
        });
        current += Duration::days(1);
    }

    points
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_fill_date_range_zero_fills_gaps() {
        let rows = vec![
            DailySalesRow {
                day: date("2026-08-02"),
                sales: 3,
                revenue: Decimal::new(45000, 2),
            },
            DailySalesRow {
                day: date("2026-08-04"),
                sales: 1,
                revenue: Decimal::new(9999, 2),
            },
        ];

        let points = fill_date_range(date("2026-08-01"), date("2026-08-04"), &rows);

        assert_eq!(points.len(), 4);
        assert_eq!(points.first().unwrap().sales, 0);
        assert_eq!(points.get(1).unwrap().sales, 3);
        assert_eq!(points.get(2).unwrap().revenue, Decimal::ZERO);
        assert_eq!(points.get(3).unwrap().revenue, Decimal::new(9999, 2));
    }

    #[test]
    fn test_fill_date_range_single_day() {
        let points = fill_date_range(date("2026-08-01"), date("2026-08-01"), &[]);
        assert_eq!(points.len(), 1);
        assert_eq!(points.first().unwrap().sales, 0);
    }
}
