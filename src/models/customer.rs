use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    auth,
    database::{CustomerRepository, ProductRepository},
    models::{cart_item, CartItem, CartProduct, Role},
    Result, StoreError,
};

const MIN_PASSWORD_LENGTH: usize = 6;

/// The public projection of a customer, it never carries the password hash
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub cart_items: Vec<CartItem>,
    pub created_at: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
}

/// Credentials row used only while logging in
#[derive(Debug)]
pub struct AuthCustomer {
    pub id: Uuid,
    pub password_hash: String,
}

#[derive(Debug, Deserialize)]
pub struct SignupInput {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug)]
pub struct NewCustomer {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

impl SignupInput {
    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() || self.email.trim().is_empty() {
            return Err(StoreError::BadRequest(
                "Name and email are required".to_owned(),
            ));
        }
        if !self.email.contains('@') {
            return Err(StoreError::BadRequest("Invalid email".to_owned()));
        }
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(StoreError::BadRequest(format!(
                "Password must be at least {} characters long",
                MIN_PASSWORD_LENGTH
            )));
        }
        Ok(())
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl Customer {
    #[tracing::instrument(name = "new_customer", skip(input, pool), fields(model = "Customer"))]
    pub async fn new<DB: CustomerRepository>(input: SignupInput, pool: &PgPool) -> Result<Self> {
        input.validate()?;
        let email = normalize_email(&input.email);
        if DB::email_exists(&email, pool).await? {
            return Err(StoreError::DuplicateEmail);
        }

        let password_hash = auth::hash_password(input.password).await?;
        let new_customer = NewCustomer {
            id: Uuid::new_v4(),
            name: input.name.trim().to_owned(),
            email,
            password_hash,
        };
        DB::create(new_customer, pool).await
    }

    #[tracing::instrument(skip(pool), fields(model = "Customer"))]
    pub async fn find_by_id<DB: CustomerRepository>(id: Uuid, pool: &PgPool) -> Result<Self> {
        DB::find_by_id(id, pool)
            .await?
            .ok_or_else(|| StoreError::NotFound("User not found".to_owned()))
    }

    /// Adds one unit of `product_id`, the product has to be in the catalog
    #[tracing::instrument(skip(self, pool), fields(model = "Customer", id = %self.id))]
    pub async fn add_to_cart<C: CustomerRepository, P: ProductRepository>(
        &mut self,
        product_id: Uuid,
        pool: &PgPool,
    ) -> Result<Vec<CartItem>> {
        if P::find_by_id(product_id, pool).await?.is_none() {
            return Err(StoreError::NotFound("Product not found".to_owned()));
        }
        cart_item::add_item(&mut self.cart_items, product_id);
        self.save_cart::<C>(pool).await
    }

    /// Removes a single product, or empties the cart when no id is given
    #[tracing::instrument(skip(self, pool), fields(model = "Customer", id = %self.id))]
    pub async fn remove_from_cart<DB: CustomerRepository>(
        &mut self,
        product_id: Option<Uuid>,
        pool: &PgPool,
    ) -> Result<Vec<CartItem>> {
        match product_id {
            Some(product_id) => cart_item::remove_item(&mut self.cart_items, product_id),
            None => self.cart_items.clear(),
        }
        self.save_cart::<DB>(pool).await
    }

    #[tracing::instrument(skip(self, pool), fields(model = "Customer", id = %self.id))]
    pub async fn update_cart_quantity<DB: CustomerRepository>(
        &mut self,
        product_id: Uuid,
        quantity: i32,
        pool: &PgPool,
    ) -> Result<Vec<CartItem>> {
        cart_item::set_quantity(&mut self.cart_items, product_id, quantity)?;
        self.save_cart::<DB>(pool).await
    }

    #[tracing::instrument(skip(self, pool), fields(model = "Customer", id = %self.id))]
    pub async fn cart_products<DB: ProductRepository>(
        &self,
        pool: &PgPool,
    ) -> Result<Vec<CartProduct>> {
        if self.cart_items.is_empty() {
            return Ok(vec![]);
        }
        let ids: Vec<Uuid> = self.cart_items.iter().map(|item| item.product_id).collect();
        let products = DB::find_many(&ids, pool).await?;
        Ok(cart_item::join_with_products(&self.cart_items, products))
    }
}

/// Private API
impl Customer {
    async fn save_cart<DB: CustomerRepository>(&mut self, pool: &PgPool) -> Result<Vec<CartItem>> {
        self.cart_items = DB::update_cart(self.id, &self.cart_items, pool).await?;
        Ok(self.cart_items.clone())
    }
}
