use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{query, query_scalar, PgPool};
use uuid::Uuid;

use crate::Result;

/// Server-side record of issued refresh tokens, used to revoke them
#[async_trait]
pub trait SessionTokenRepository {
    /// Stores `token` as the customer's only refresh token, dropping any they
    /// held before
    async fn replace_for_customer(
        customer_id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
        pool: &PgPool,
    ) -> Result<()>;
    /// True when the token is stored for the customer and hasn't lapsed
    async fn is_active(customer_id: Uuid, token: &str, pool: &PgPool) -> Result<bool>;
    async fn delete(token: &str, pool: &PgPool) -> Result<()>;
}

pub struct SessionTokenDatabase;

#[async_trait]
impl SessionTokenRepository for SessionTokenDatabase {
    #[tracing::instrument(skip(token, pool), fields(repository = "session_token"))]
    async fn replace_for_customer(
        customer_id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
        pool: &PgPool,
    ) -> Result<()> {
        let mut tx = pool.begin().await?;

        query("DELETE FROM session_tokens WHERE customer_id = $1 OR expires_at <= NOW()")
            .bind(customer_id)
            .execute(&mut *tx)
            .await?;

        query(
            r#"
            INSERT INTO session_tokens (id, customer_id, token, expires_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(customer_id)
        .bind(token)
        .bind(expires_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    #[tracing::instrument(skip(token, pool), fields(repository = "session_token"))]
    async fn is_active(customer_id: Uuid, token: &str, pool: &PgPool) -> Result<bool> {
        let active = query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM session_tokens
                WHERE customer_id = $1 AND token = $2 AND expires_at > NOW()
            )
            "#,
        )
        .bind(customer_id)
        .bind(token)
        .fetch_one(pool)
        .await?;
        Ok(active)
    }

    #[tracing::instrument(skip(token, pool), fields(repository = "session_token"))]
    async fn delete(token: &str, pool: &PgPool) -> Result<()> {
        query("DELETE FROM session_tokens WHERE token = $1")
            .bind(token)
            .execute(pool)
            .await?;
        Ok(())
    }
}
