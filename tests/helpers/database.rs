use sqlx::{Connection, Executor, PgConnection, PgPool};
use uuid::Uuid;

use storefront::configuration::DatabaseSettings;

pub const SEEDED_SHIRT_ID: &str = "8f7b2c1e-0a4d-4a57-9b7e-1c2d3e4f5a60";
pub const SEEDED_GLASSES_ID: &str = "2b1d7a9c-5e3f-4c21-8d6a-7f8e9a0b1c22";

pub async fn configure_database(config: &DatabaseSettings) -> PgPool {
    let mut connection = PgConnection::connect_with(&config.without_db())
        .await
        .expect("failed to connect to database");
    connection
        .execute(&*format!(r#"CREATE DATABASE "{}";"#, config.database_name))
        .await
        .expect("failed to create database");

    let pool = PgPool::connect_with(config.with_db())
        .await
        .expect("failed to connect to database");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("failed to run database migrations");
    // Seed the product catalog for tests
    pool.execute(include_str!("../../scripts/seed_products.sql"))
        .await
        .expect("failed to seed test database");
    pool
}

pub async fn promote_to_admin(email: &str, pool: &PgPool) {
    sqlx::query("UPDATE customers SET role = 'admin' WHERE email = $1")
        .bind(email)
        .execute(pool)
        .await
        .expect("failed to promote customer");
}

pub async fn customer_id(email: &str, pool: &PgPool) -> Uuid {
    sqlx::query_scalar::<_, Uuid>("SELECT id FROM customers WHERE email = $1")
        .bind(email)
        .fetch_one(pool)
        .await
        .expect("customer not found")
}

pub async fn session_token_count(customer_id: Uuid, pool: &PgPool) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM session_tokens WHERE customer_id = $1")
        .bind(customer_id)
        .fetch_one(pool)
        .await
        .expect("failed to count session tokens")
}

pub async fn order_count(session_id: &str, pool: &PgPool) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM orders WHERE stripe_session_id = $1")
        .bind(session_id)
        .fetch_one(pool)
        .await
        .expect("failed to count orders")
}
