//! Shared fixtures for unit tests.
//!
//! The mock repositories keep their rows in process-wide state, every test
//! works with fresh UUIDs so tests running in parallel never see each
//! other's data.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use lazy_static::lazy_static;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{collections::HashMap, sync::Mutex};
use uuid::Uuid;

use crate::{
    auth::authorize::encode_jwt,
    configuration::{
        ApplicationSettings, AuthSettings, DatabaseSettings, Environment, PaymentSettings,
        Settings,
    },
    database::{
        CouponRepository, CustomerRepository, OrderRepository, ProductRepository,
        SessionTokenRepository,
    },
    models::{
        AuthCustomer, CartItem, Claims, Coupon, Customer, NewCoupon, NewCustomer, NewOrder,
        NewProduct, Order, Product, Role, TokenType,
    },
    payments::{CheckoutSession, CheckoutSessionRequest, PaymentError, PaymentGateway},
    Result, StoreError,
};

pub fn auth_settings() -> AuthSettings {
    AuthSettings {
        access_token_secret: "unit-test-access-secret".to_owned(),
        refresh_token_secret: "unit-test-refresh-secret".to_owned(),
        access_token_duration_seconds: 900,
        refresh_token_duration_seconds: 604_800,
    }
}

pub fn payment_settings() -> PaymentSettings {
    PaymentSettings {
        stripe_secret_key: "sk_test_unit".to_owned(),
        api_base_url: "http://127.0.0.1:9/v1".to_owned(),
        currency: "uah".to_owned(),
        gift_coupon_threshold: 20_000,
        gift_coupon_percentage: 10,
        gift_coupon_valid_days: 30,
    }
}

pub fn test_settings() -> Settings {
    Settings {
        database: DatabaseSettings {
            username: "postgres".to_owned(),
            password: "password".to_owned(),
            port: 5432,
            host: "127.0.0.1".to_owned(),
            database_name: "storefront".to_owned(),
            require_ssl: false,
        },
        application: ApplicationSettings {
            port: 0,
            host: "127.0.0.1".to_owned(),
            client_url: "http://localhost:5173".to_owned(),
        },
        auth: auth_settings(),
        payments: payment_settings(),
        env: Environment::Test,
    }
}

/// A pool that never connects, for code paths that only hand it to mocks
pub fn lazy_pool() -> PgPool {
    PgPoolOptions::new().connect_lazy_with(test_settings().database.with_db())
}

/// A correctly signed token that expired an hour ago, well past the
/// validation leeway
pub fn expired_token(customer_id: Uuid, token_type: TokenType) -> String {
    let iat = Utc::now() - Duration::hours(2);
    let claims = Claims {
        sub: customer_id,
        jti: Uuid::new_v4(),
        exp: (iat + Duration::hours(1)).timestamp() as usize,
        iat: iat.timestamp() as usize,
        token_type,
    };
    encode_jwt(&claims, &auth_settings()).unwrap()
}

pub fn sample_product(price: f64) -> Product {
    let now = Utc::now();
    Product {
        id: Uuid::new_v4(),
        name: "Вишиванка".to_owned(),
        description: "Linen shirt with traditional embroidery".to_owned(),
        price,
        images: vec!["https://img.example.com/shirt.jpg".to_owned()],
        image: Some("https://img.example.com/shirt.jpg".to_owned()),
        category: "shirts".to_owned(),
        is_featured: false,
        specifications: vec![],
        created_at: now,
        updated_at: now,
    }
}

lazy_static! {
    static ref COUPONS: Mutex<Vec<Coupon>> = Mutex::new(vec![]);
    static ref CUSTOMERS: Mutex<HashMap<Uuid, (Customer, String)>> = Mutex::new(HashMap::new());
    static ref PRODUCTS: Mutex<HashMap<Uuid, Product>> = Mutex::new(HashMap::new());
    static ref SESSION_TOKENS: Mutex<Vec<(Uuid, String, DateTime<Utc>)>> = Mutex::new(vec![]);
    static ref ORDERS: Mutex<Vec<Order>> = Mutex::new(vec![]);
}

pub struct MockCouponRepository;

impl MockCouponRepository {
    pub fn seed(customer_id: Uuid, code: &str, discount_percentage: i32, valid_for: Duration) -> Coupon {
        let coupon = Coupon {
            id: Uuid::new_v4(),
            code: code.to_owned(),
            discount_percentage,
            expiration_date: Utc::now() + valid_for,
            is_active: true,
            customer_id,
            created_at: Utc::now(),
        };
        let mut coupons = COUPONS.lock().unwrap();
        coupons.retain(|c| c.customer_id != customer_id);
        coupons.push(coupon.clone());
        coupon
    }

    pub fn get(customer_id: Uuid) -> Option<Coupon> {
        COUPONS
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.customer_id == customer_id)
            .cloned()
    }

    pub fn count_for(customer_id: Uuid) -> usize {
        COUPONS
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.customer_id == customer_id)
            .count()
    }
}

#[async_trait]
impl CouponRepository for MockCouponRepository {
    async fn find_by_customer(customer_id: Uuid, _: &PgPool) -> Result<Option<Coupon>> {
        Ok(Self::get(customer_id))
    }

    async fn find_active(code: &str, customer_id: Uuid, _: &PgPool) -> Result<Option<Coupon>> {
        Ok(COUPONS
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.code == code && c.customer_id == customer_id && c.is_active)
            .cloned())
    }

    async fn deactivate(code: &str, customer_id: Uuid, _: &PgPool) -> Result<()> {
        COUPONS
            .lock()
            .unwrap()
            .iter_mut()
            .filter(|c| c.code == code && c.customer_id == customer_id)
            .for_each(|c| c.is_active = false);
        Ok(())
    }

    async fn replace_for_customer(coupon: NewCoupon, _: &PgPool) -> Result<Coupon> {
        let coupon = Coupon {
            id: coupon.id,
            code: coupon.code,
            discount_percentage: coupon.discount_percentage,
            expiration_date: coupon.expiration_date,
            is_active: true,
            customer_id: coupon.customer_id,
            created_at: Utc::now(),
        };
        let mut coupons = COUPONS.lock().unwrap();
        coupons.retain(|c| c.customer_id != coupon.customer_id);
        coupons.push(coupon.clone());
        Ok(coupon)
    }
}

pub struct MockCustomerRepository;

impl MockCustomerRepository {
    /// Stores a plain customer with an empty cart and returns their id
    pub fn seed_customer() -> Uuid {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let customer = Customer {
            id,
            name: "Test Customer".to_owned(),
            email: format!("{}@example.com", id),
            role: Role::Customer,
            cart_items: vec![],
            created_at: now,
            last_modified: now,
        };
        CUSTOMERS
            .lock()
            .unwrap()
            .insert(id, (customer, "not-a-real-hash".to_owned()));
        id
    }

    pub fn password_hash(id: Uuid) -> Option<String> {
        CUSTOMERS
            .lock()
            .unwrap()
            .get(&id)
            .map(|(_, hash)| hash.clone())
    }
}

#[async_trait]
impl CustomerRepository for MockCustomerRepository {
    async fn create(customer: NewCustomer, _: &PgPool) -> Result<Customer> {
        let mut customers = CUSTOMERS.lock().unwrap();
        if customers.values().any(|(c, _)| c.email == customer.email) {
            return Err(StoreError::DuplicateEmail);
        }
        let now = Utc::now();
        let created = Customer {
            id: customer.id,
            name: customer.name,
            email: customer.email,
            role: Role::Customer,
            cart_items: vec![],
            created_at: now,
            last_modified: now,
        };
        customers.insert(created.id, (created.clone(), customer.password_hash));
        Ok(created)
    }

    async fn find_by_id(id: Uuid, _: &PgPool) -> Result<Option<Customer>> {
        Ok(CUSTOMERS.lock().unwrap().get(&id).map(|(c, _)| c.clone()))
    }

    async fn exists(id: Uuid, _: &PgPool) -> Result<bool> {
        Ok(CUSTOMERS.lock().unwrap().contains_key(&id))
    }

    async fn email_exists(email: &str, _: &PgPool) -> Result<bool> {
        Ok(CUSTOMERS
            .lock()
            .unwrap()
            .values()
            .any(|(c, _)| c.email == email))
    }

    async fn find_auth_by_email(email: &str, _: &PgPool) -> Result<Option<AuthCustomer>> {
        Ok(CUSTOMERS
            .lock()
            .unwrap()
            .values()
            .find(|(c, _)| c.email == email)
            .map(|(c, hash)| AuthCustomer {
                id: c.id,
                password_hash: hash.clone(),
            }))
    }

    async fn update_cart(id: Uuid, cart: &[CartItem], _: &PgPool) -> Result<Vec<CartItem>> {
        let mut customers = CUSTOMERS.lock().unwrap();
        let (customer, _) = customers
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound("User not found".to_owned()))?;
        customer.cart_items = cart.to_vec();
        customer.last_modified = Utc::now();
        Ok(customer.cart_items.clone())
    }
}

pub struct MockProductRepository;

impl MockProductRepository {
    pub fn seed(price: f64) -> Product {
        let product = sample_product(price);
        PRODUCTS
            .lock()
            .unwrap()
            .insert(product.id, product.clone());
        product
    }

    fn store(id: Uuid, product: NewProduct, is_featured: bool) -> Product {
        let now = Utc::now();
        let stored = Product {
            id,
            name: product.name,
            description: product.description,
            price: product.price,
            images: product.images,
            image: Some(product.image),
            category: product.category,
            is_featured,
            specifications: product.specifications,
            created_at: now,
            updated_at: now,
        };
        PRODUCTS.lock().unwrap().insert(id, stored.clone());
        stored
    }
}

#[async_trait]
impl ProductRepository for MockProductRepository {
    async fn find_all(_: &PgPool) -> Result<Vec<Product>> {
        Ok(PRODUCTS.lock().unwrap().values().cloned().collect())
    }

    async fn find_featured(_: &PgPool) -> Result<Vec<Product>> {
        Ok(PRODUCTS
            .lock()
            .unwrap()
            .values()
            .filter(|p| p.is_featured)
            .cloned()
            .collect())
    }

    async fn find_by_id(id: Uuid, _: &PgPool) -> Result<Option<Product>> {
        Ok(PRODUCTS.lock().unwrap().get(&id).cloned())
    }

    async fn find_many(ids: &[Uuid], _: &PgPool) -> Result<Vec<Product>> {
        let products = PRODUCTS.lock().unwrap();
        Ok(ids.iter().filter_map(|id| products.get(id).cloned()).collect())
    }

    async fn find_by_category(category: &str, _: &PgPool) -> Result<Vec<Product>> {
        Ok(PRODUCTS
            .lock()
            .unwrap()
            .values()
            .filter(|p| p.category == category)
            .cloned()
            .collect())
    }

    async fn find_random(limit: i64, _: &PgPool) -> Result<Vec<Product>> {
        Ok(PRODUCTS
            .lock()
            .unwrap()
            .values()
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn create(id: Uuid, product: NewProduct, _: &PgPool) -> Result<Product> {
        Ok(Self::store(id, product, false))
    }

    async fn update(id: Uuid, product: NewProduct, _: &PgPool) -> Result<Option<Product>> {
        let is_featured = match PRODUCTS.lock().unwrap().get(&id) {
            Some(existing) => existing.is_featured,
            None => return Ok(None),
        };
        Ok(Some(Self::store(id, product, is_featured)))
    }

    async fn toggle_featured(id: Uuid, _: &PgPool) -> Result<Option<Product>> {
        let mut products = PRODUCTS.lock().unwrap();
        Ok(products.get_mut(&id).map(|p| {
            p.is_featured = !p.is_featured;
            p.clone()
        }))
    }

    async fn delete(id: Uuid, _: &PgPool) -> Result<bool> {
        Ok(PRODUCTS.lock().unwrap().remove(&id).is_some())
    }
}

pub struct MockSessionTokenRepository;

impl MockSessionTokenRepository {
    pub fn tokens_for(customer_id: Uuid) -> Vec<String> {
        SESSION_TOKENS
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _, _)| *id == customer_id)
            .map(|(_, token, _)| token.clone())
            .collect()
    }
}

#[async_trait]
impl SessionTokenRepository for MockSessionTokenRepository {
    async fn replace_for_customer(
        customer_id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
        _: &PgPool,
    ) -> Result<()> {
        let mut tokens = SESSION_TOKENS.lock().unwrap();
        tokens.retain(|(id, _, _)| *id != customer_id);
        tokens.push((customer_id, token.to_owned(), expires_at));
        Ok(())
    }

    async fn is_active(customer_id: Uuid, token: &str, _: &PgPool) -> Result<bool> {
        let now = Utc::now();
        Ok(SESSION_TOKENS
            .lock()
            .unwrap()
            .iter()
            .any(|(id, stored, expires_at)| *id == customer_id && stored == token && *expires_at > now))
    }

    async fn delete(token: &str, _: &PgPool) -> Result<()> {
        SESSION_TOKENS
            .lock()
            .unwrap()
            .retain(|(_, stored, _)| stored != token);
        Ok(())
    }
}

pub struct MockOrderRepository;

impl MockOrderRepository {
    pub fn count_for_session(session_id: &str) -> usize {
        ORDERS
            .lock()
            .unwrap()
            .iter()
            .filter(|o| o.stripe_session_id == session_id)
            .count()
    }
}

#[async_trait]
impl OrderRepository for MockOrderRepository {
    async fn find_by_session_id(session_id: &str, _: &PgPool) -> Result<Option<Order>> {
        Ok(ORDERS
            .lock()
            .unwrap()
            .iter()
            .find(|o| o.stripe_session_id == session_id)
            .cloned())
    }

    async fn create(order: NewOrder, _: &PgPool) -> Result<Option<Order>> {
        let mut orders = ORDERS.lock().unwrap();
        if orders
            .iter()
            .any(|o| o.stripe_session_id == order.stripe_session_id)
        {
            return Ok(None);
        }
        let created = Order {
            id: order.id,
            customer_id: order.customer_id,
            products: order.products,
            total_amount: order.total_amount,
            stripe_session_id: order.stripe_session_id,
            created_at: Utc::now(),
        };
        orders.push(created.clone());
        Ok(Some(created))
    }
}

/// In-memory stand-in for the hosted checkout provider
#[derive(Default)]
pub struct MockPaymentGateway {
    sessions: Mutex<HashMap<String, CheckoutSession>>,
    requests: Mutex<Vec<CheckoutSessionRequest>>,
    coupons: Mutex<Vec<i32>>,
}

impl MockPaymentGateway {
    pub fn insert_session(&self, session: CheckoutSession) {
        self.sessions
            .lock()
            .unwrap()
            .insert(session.id.clone(), session);
    }

    pub fn created_sessions(&self) -> Vec<CheckoutSessionRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn created_coupons(&self) -> Vec<i32> {
        self.coupons.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_percent_off_coupon(
        &self,
        percent_off: i32,
    ) -> std::result::Result<String, PaymentError> {
        self.coupons.lock().unwrap().push(percent_off);
        Ok(format!("coupon_{}", Uuid::new_v4().simple()))
    }

    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> std::result::Result<CheckoutSession, PaymentError> {
        self.requests.lock().unwrap().push(request.clone());
        let session = CheckoutSession {
            id: format!("cs_test_{}", Uuid::new_v4().simple()),
            payment_status: "unpaid".to_owned(),
            amount_total: Some(
                request
                    .line_items
                    .iter()
                    .map(|item| item.unit_amount * item.quantity)
                    .sum(),
            ),
            metadata: request.metadata.clone(),
        };
        self.insert_session(session.clone());
        Ok(session)
    }

    async fn retrieve_checkout_session(
        &self,
        session_id: &str,
    ) -> std::result::Result<CheckoutSession, PaymentError> {
        self.sessions
            .lock()
            .unwrap()
            .get(session_id)
            .cloned()
            .ok_or_else(|| PaymentError::Provider {
                code: "resource_missing".to_owned(),
                message: format!("No such checkout.session: '{}'", session_id),
            })
    }
}
