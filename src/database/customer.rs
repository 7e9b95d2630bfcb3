use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{query_as, query_scalar, types::Json, FromRow, PgPool};
use uuid::Uuid;

use crate::{
    models::{AuthCustomer, CartItem, Customer, NewCustomer, Role},
    Result, StoreError,
};

#[async_trait]
pub trait CustomerRepository {
    async fn create(customer: NewCustomer, pool: &PgPool) -> Result<Customer>;
    async fn find_by_id(id: Uuid, pool: &PgPool) -> Result<Option<Customer>>;
    async fn exists(id: Uuid, pool: &PgPool) -> Result<bool>;
    async fn email_exists(email: &str, pool: &PgPool) -> Result<bool>;
    async fn find_auth_by_email(email: &str, pool: &PgPool) -> Result<Option<AuthCustomer>>;
    async fn update_cart(id: Uuid, cart: &[CartItem], pool: &PgPool) -> Result<Vec<CartItem>>;
}

pub struct CustomerDatabase;

#[derive(FromRow)]
struct CustomerRow {
    id: Uuid,
    name: String,
    email: String,
    role: Role,
    cart: Json<Vec<CartItem>>,
    created_at: DateTime<Utc>,
    last_modified: DateTime<Utc>,
}

impl From<CustomerRow> for Customer {
    fn from(row: CustomerRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            role: row.role,
            cart_items: row.cart.0,
            created_at: row.created_at,
            last_modified: row.last_modified,
        }
    }
}

#[derive(FromRow)]
struct AuthRow {
    id: Uuid,
    password_hash: String,
}

const CUSTOMER_COLUMNS: &str = "id, name, email, role, cart, created_at, last_modified";

#[async_trait]
impl CustomerRepository for CustomerDatabase {
    #[tracing::instrument(skip(customer, pool), fields(repository = "customer", id = %customer.id))]
    async fn create(customer: NewCustomer, pool: &PgPool) -> Result<Customer> {
        let sql = format!(
            r#"
            INSERT INTO customers (id, name, email, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            CUSTOMER_COLUMNS
        );
        let result = query_as::<_, CustomerRow>(&sql)
            .bind(customer.id)
            .bind(&customer.name)
            .bind(&customer.email)
            .bind(&customer.password_hash)
            .fetch_one(pool)
            .await;

        match result {
            Ok(row) => Ok(row.into()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(StoreError::DuplicateEmail)
            }
            Err(e) => Err(e.into()),
        }
    }

    #[tracing::instrument(skip(pool), fields(repository = "customer"))]
    async fn find_by_id(id: Uuid, pool: &PgPool) -> Result<Option<Customer>> {
        let sql = format!("SELECT {} FROM customers WHERE id = $1", CUSTOMER_COLUMNS);
        let row = query_as::<_, CustomerRow>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(Customer::from))
    }

    #[tracing::instrument(skip(pool), fields(repository = "customer"))]
    async fn exists(id: Uuid, pool: &PgPool) -> Result<bool> {
        let exists = query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM customers WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await?;
        Ok(exists)
    }

    #[tracing::instrument(skip(email, pool), fields(repository = "customer"))]
    async fn email_exists(email: &str, pool: &PgPool) -> Result<bool> {
        let exists =
            query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM customers WHERE email = $1)")
                .bind(email)
                .fetch_one(pool)
                .await?;
        Ok(exists)
    }

    #[tracing::instrument(skip(email, pool), fields(repository = "customer"))]
    async fn find_auth_by_email(email: &str, pool: &PgPool) -> Result<Option<AuthCustomer>> {
        let row = query_as::<_, AuthRow>(
            "SELECT id, password_hash FROM customers WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;
        Ok(row.map(|row| AuthCustomer {
            id: row.id,
            password_hash: row.password_hash,
        }))
    }

    #[tracing::instrument(skip(cart, pool), fields(repository = "customer"))]
    async fn update_cart(id: Uuid, cart: &[CartItem], pool: &PgPool) -> Result<Vec<CartItem>> {
        let stored = query_scalar::<_, Json<Vec<CartItem>>>(
            r#"
            UPDATE customers
            SET cart = $1, last_modified = NOW()
            WHERE id = $2
            RETURNING cart
            "#,
        )
        .bind(Json(cart))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| StoreError::NotFound("User not found".to_owned()))?;
        Ok(stored.0)
    }
}
