#![allow(dead_code)]
mod app;
mod database;
mod gateway;
mod reqwest;

pub use self::reqwest::*;
pub use app::{spawn_app, spawn_app_without_db, TestApp};
pub use database::*;
pub use gateway::TestGateway;

use lazy_static::lazy_static;

use storefront::telemetry::{generate_subscriber, init_subscriber};

lazy_static! {
    /// To ensure logs are only outputted in tests when required, by default
    /// tests run with no logs being captured
    ///
    /// In order to set logs to be captured during tests run them with:
    /// `TEST_LOG=true cargo test | bunyan`
    pub static ref TRACING: () = {
        let filter = if std::env::var("TEST_LOG").is_ok() {
            "debug"
        } else {
            "off"
        };
        if std::env::var("TEST_LOG").is_ok() {
            let subscriber = generate_subscriber("test".into(), filter.into(), std::io::stdout);
            init_subscriber(subscriber).expect("failed to set subscriber");
        } else {
            let subscriber = generate_subscriber("test".into(), filter.into(), std::io::sink);
            init_subscriber(subscriber).expect("failed to set subscriber");
        }
    };
}
