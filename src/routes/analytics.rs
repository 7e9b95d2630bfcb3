use actix_web::{web, HttpResponse};
use sqlx::PgPool;

use crate::{
    auth::AdminCustomer,
    database::AnalyticsDatabase,
    models::analytics::{self, DateRange},
    StoreError,
};

#[tracing::instrument(skip(admin, pool), fields(admin = %admin.0.id))]
pub async fn analytics_report(
    admin: AdminCustomer,
    range: web::Query<DateRange>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, StoreError> {
    let report = analytics::report::<AnalyticsDatabase>(range.into_inner(), &pool).await?;
    Ok(HttpResponse::Ok().json(report))
}
