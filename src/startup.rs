use actix_cors::Cors;
use actix_web::{
    dev::Server,
    http::{header, Method},
    web, App, HttpServer,
};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{net::TcpListener, sync::Arc, time::Duration};
use thiserror::Error;
use tracing::{error, info};
use tracing_actix_web::TracingLogger;

use crate::{
    configuration::{DatabaseSettings, Settings},
    payments::{PaymentError, PaymentGateway},
    routes::*,
    StoreError,
};

const CORS_MAX_AGE_SECONDS: usize = 3600;

/// Everything that can stop the service from coming up
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("database health check failed: {0}")]
    Database(#[from] sqlx::Error),

    #[error("failed to run database migrations: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("failed to configure the payment provider: {0}")]
    Payments(#[from] PaymentError),

    #[error("failed to start the http server: {0}")]
    Io(#[from] std::io::Error),
}

pub fn get_connection_pool(settings: &DatabaseSettings) -> PgPool {
    PgPoolOptions::new()
        .acquire_timeout(Duration::from_secs(2))
        .connect_lazy_with(settings.with_db())
}

/// Round-trips a trivial query so an unreachable database is reported before
/// the server starts accepting requests
#[tracing::instrument(skip(pool))]
pub async fn check_database(pool: &PgPool) -> Result<(), StartupError> {
    sqlx::query("SELECT 1").execute(pool).await.map_err(|e| {
        error!(err = ?e, "database is not reachable");
        e
    })?;
    info!("database is reachable");
    Ok(())
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), StartupError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

fn cors(client_url: &str) -> Cors {
    Cors::default()
        .allowed_origin(client_url.trim_end_matches('/'))
        .allowed_methods(vec![
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allowed_headers(vec![header::CONTENT_TYPE, header::ACCEPT])
        .supports_credentials()
        .max_age(CORS_MAX_AGE_SECONDS)
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| StoreError::BadRequest(err.to_string()).into())
}

pub fn build_app(
    listener: TcpListener,
    connection: PgPool,
    settings: Settings,
    gateway: Arc<dyn PaymentGateway>,
) -> Result<Server, std::io::Error> {
    let connection = web::Data::new(connection);
    let client_url = settings.application.client_url.clone();
    let settings = web::Data::new(settings);
    let gateway: web::Data<dyn PaymentGateway> = web::Data::from(gateway);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .wrap(cors(&client_url))
            .app_data(json_config())
            .app_data(connection.clone())
            .app_data(settings.clone())
            .app_data(gateway.clone())
            .route("/health_check", web::get().to(health_check))
            .service(
                web::scope("/api")
                    .service(
                        web::scope("/auth")
                            .route("/signup", web::post().to(sign_up))
                            .route("/login", web::post().to(log_in))
                            .route("/logout", web::post().to(log_out))
                            .route("/refresh", web::get().to(refresh))
                            .route("/profile", web::get().to(profile)),
                    )
                    .service(
                        web::scope("/products")
                            .route("", web::get().to(get_all_products))
                            .route("", web::post().to(create_product))
                            .route("/featured", web::get().to(get_featured_products))
                            .route("/recommendations", web::get().to(get_recommended_products))
                            .route("/category/{category}", web::get().to(get_products_by_category))
                            .route("/{id}", web::get().to(get_product))
                            .route("/{id}", web::put().to(update_product))
                            .route("/{id}", web::patch().to(toggle_featured_product))
                            .route("/{id}", web::delete().to(delete_product)),
                    )
                    .service(
                        web::scope("/cart")
                            .route("", web::get().to(get_cart))
                            .route("", web::post().to(add_to_cart))
                            .route("", web::delete().to(remove_from_cart))
                            .route("/{id}", web::put().to(update_quantity)),
                    )
                    .service(
                        web::scope("/coupons")
                            .route("", web::get().to(get_coupon))
                            .route("/validate", web::post().to(validate_coupon)),
                    )
                    .service(
                        web::scope("/payments")
                            .route(
                                "/create-checkout-session",
                                web::post().to(create_checkout_session),
                            )
                            .route("/checkout-success", web::post().to(checkout_success)),
                    )
                    .route("/analytics", web::get().to(analytics_report)),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
