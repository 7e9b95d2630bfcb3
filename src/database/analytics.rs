use async_trait::async_trait;
use chrono::{Duration, NaiveDate, NaiveTime};
use sqlx::{query_as, FromRow, PgPool};

use crate::{
    models::analytics::{AnalyticsSummary, DailySales},
    Result,
};

#[async_trait]
pub trait AnalyticsRepository {
    async fn summary(pool: &PgPool) -> Result<AnalyticsSummary>;
    /// Order counts and line revenue per UTC day, days without orders are omitted
    async fn daily_sales(start: NaiveDate, end: NaiveDate, pool: &PgPool)
        -> Result<Vec<DailySales>>;
}

pub struct AnalyticsDatabase;

#[derive(FromRow)]
struct SummaryRow {
    users: i64,
    products: i64,
    total_sales: i64,
    total_revenue: f64,
}

#[derive(FromRow)]
struct DailyRow {
    date: NaiveDate,
    sales: i64,
    revenue: f64,
}

#[async_trait]
impl AnalyticsRepository for AnalyticsDatabase {
    #[tracing::instrument(skip(pool), fields(repository = "analytics"))]
    async fn summary(pool: &PgPool) -> Result<AnalyticsSummary> {
        let row = query_as::<_, SummaryRow>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM customers) AS users,
                (SELECT COUNT(*) FROM products) AS products,
                (SELECT COUNT(*) FROM orders) AS total_sales,
                (
                    SELECT COALESCE(SUM((line->>'price')::float8 * (line->>'quantity')::float8), 0)
                    FROM orders, jsonb_array_elements(orders.products) AS line
                )::float8 AS total_revenue
            "#,
        )
        .fetch_one(pool)
        .await?;

        Ok(AnalyticsSummary {
            users: row.users,
            products: row.products,
            total_sales: row.total_sales,
            total_revenue: row.total_revenue,
        })
    }

    #[tracing::instrument(skip(pool), fields(repository = "analytics"))]
    async fn daily_sales(
        start: NaiveDate,
        end: NaiveDate,
        pool: &PgPool,
    ) -> Result<Vec<DailySales>> {
        let from = start.and_time(NaiveTime::MIN).and_utc();
        let until = (end + Duration::days(1)).and_time(NaiveTime::MIN).and_utc();

        let rows = query_as::<_, DailyRow>(
            r#"
            SELECT
                (o.created_at AT TIME ZONE 'UTC')::date AS date,
                COUNT(DISTINCT o.id) AS sales,
                COALESCE(SUM((line->>'price')::float8 * (line->>'quantity')::float8), 0)::float8 AS revenue
            FROM orders o
            LEFT JOIN LATERAL jsonb_array_elements(o.products) AS line ON TRUE
            WHERE o.created_at >= $1 AND o.created_at < $2
            GROUP BY 1
            ORDER BY 1
            "#,
        )
        .bind(from)
        .bind(until)
        .fetch_all(pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| DailySales {
                date: row.date,
                sales: row.sales,
                revenue: row.revenue,
            })
            .collect())
    }
}
