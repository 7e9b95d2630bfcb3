use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::{database::AnalyticsRepository, Result, StoreError};

const DEFAULT_RANGE_DAYS: i64 = 7;
const MAX_RANGE_DAYS: i64 = 366;

#[derive(Debug, Serialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub users: i64,
    pub products: i64,
    pub total_sales: i64,
    pub total_revenue: f64,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct DailySales {
    pub date: NaiveDate,
    pub sales: i64,
    pub revenue: f64,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub analytics_data: AnalyticsSummary,
    pub daily_sales_data: Vec<DailySales>,
}

impl DateRange {
    /// Resolves the requested range to inclusive bounds, defaulting to the
    /// week ending today
    pub fn resolve(&self, today: NaiveDate) -> Result<(NaiveDate, NaiveDate)> {
        let end = self.end_date.unwrap_or(today);
        let start = self
            .start_date
            .unwrap_or(end - Duration::days(DEFAULT_RANGE_DAYS - 1));

        if start > end {
            return Err(StoreError::BadRequest(
                "startDate must not be after endDate".to_owned(),
            ));
        }
        if (end - start).num_days() >= MAX_RANGE_DAYS {
            return Err(StoreError::BadRequest(format!(
                "Date range cannot exceed {} days",
                MAX_RANGE_DAYS
            )));
        }
        Ok((start, end))
    }
}

/// Emits one entry per day in `start..=end`, days without orders get zeroes
pub fn fill_missing_days(start: NaiveDate, end: NaiveDate, rows: &[DailySales]) -> Vec<DailySales> {
    start
        .iter_days()
        .take_while(|day| *day <= end)
        .map(|date| {
            rows.iter()
                .find(|row| row.date == date)
                .cloned()
                .unwrap_or(DailySales {
                    date,
                    sales: 0,
                    revenue: 0.0,
                })
        })
        .collect()
}

#[tracing::instrument(skip(pool), fields(model = "Analytics"))]
pub async fn report<DB: AnalyticsRepository>(
    range: DateRange,
    pool: &PgPool,
) -> Result<AnalyticsReport> {
    let (start, end) = range.resolve(Utc::now().date_naive())?;
    let summary = DB::summary(pool).await?;
    let rows = DB::daily_sales(start, end, pool).await?;

    Ok(AnalyticsReport {
        analytics_data: summary,
        daily_sales_data: fill_missing_days(start, end, &rows),
    })
}
