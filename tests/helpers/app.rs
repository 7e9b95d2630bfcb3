use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{net::TcpListener, sync::Arc};
use uuid::Uuid;

use storefront::configuration::{Environment, Settings};

use crate::helpers::{configure_database, TestGateway, TRACING};

pub struct TestApp {
    pub address: String,
    pub db_pool: PgPool,
    pub settings: Settings,
    pub gateway: Arc<TestGateway>,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }
}

fn test_configuration() -> Settings {
    std::env::set_var("APP_ENVIRONMENT", "test");
    let mut configuration = storefront::get_configuration().expect("failed to read configuration");
    configuration.env = Environment::Test;
    configuration
}

fn launch(configuration: Settings, pool: PgPool) -> TestApp {
    lazy_static::initialize(&TRACING);

    let listener = TcpListener::bind("127.0.0.1:0").expect("failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let gateway = Arc::new(TestGateway::default());

    let server = storefront::build_app(
        listener,
        pool.clone(),
        configuration.clone(),
        gateway.clone(),
    )
    .expect("failed to bind address");
    let _ = tokio::spawn(server);

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        db_pool: pool,
        settings: configuration,
        gateway,
    }
}

/// Spawns the app against a freshly created, migrated and seeded database
pub async fn spawn_app() -> TestApp {
    let mut configuration = test_configuration();
    configuration.set_database_name(Uuid::new_v4().to_string());
    let pool = configure_database(&configuration.database).await;
    launch(configuration, pool)
}

/// Spawns the app with a pool that never connects, for requests that are
/// rejected before touching the database
pub fn spawn_app_without_db() -> TestApp {
    let configuration = test_configuration();
    let pool = PgPoolOptions::new().connect_lazy_with(configuration.database.with_db());
    launch(configuration, pool)
}
