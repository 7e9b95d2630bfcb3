use chrono::Duration;
use config::{Config, File};
use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;
use sqlx::postgres::{PgConnectOptions, PgSslMode};
use std::convert::{TryFrom, TryInto};
use std::env::var;
use std::fmt;

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub application: ApplicationSettings,
    pub auth: AuthSettings,
    pub payments: PaymentSettings,
    #[serde(skip, default = "Environment::default")]
    pub env: Environment,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ApplicationSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
    /// Base URL of the storefront client, used for payment redirects
    pub client_url: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
    pub database_name: String,
    pub require_ssl: bool,
}

#[derive(Deserialize, Clone)]
pub struct AuthSettings {
    pub access_token_secret: String,
    pub refresh_token_secret: String,
    pub access_token_duration_seconds: i64,
    pub refresh_token_duration_seconds: i64,
}

#[derive(Deserialize, Clone)]
pub struct PaymentSettings {
    pub stripe_secret_key: String,
    pub api_base_url: String,
    pub currency: String,
    /// Compared against the discounted checkout total in minor units
    pub gift_coupon_threshold: i64,
    pub gift_coupon_percentage: i32,
    pub gift_coupon_valid_days: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Local,
    Test,
    Production,
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir().map_err(|e| {
        config::ConfigError::Message(format!("failed to determine current directory: {}", e))
    })?;
    let configuration_directory = base_path.join("configuration");

    let environment: Environment = var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(config::ConfigError::Message)?;

    let settings = Config::builder()
        .add_source(File::from(configuration_directory.join("base")).required(true))
        .add_source(File::from(configuration_directory.join(environment.as_str())).required(true))
        .add_source(config::Environment::with_prefix("app").separator("__"))
        .build()?;

    let mut settings = settings.try_deserialize::<Settings>()?;
    settings.env = environment;
    Ok(settings)
}

impl Settings {
    pub fn set_database_name(&mut self, name: String) {
        self.database.database_name = name;
    }
}

impl DatabaseSettings {
    pub fn without_db(&self) -> PgConnectOptions {
        let ssl_mode = if self.require_ssl {
            PgSslMode::Require
        } else {
            PgSslMode::Prefer
        };
        PgConnectOptions::new()
            .host(&self.host)
            .username(&self.username)
            .password(&self.password)
            .port(self.port)
            .ssl_mode(ssl_mode)
    }

    pub fn with_db(&self) -> PgConnectOptions {
        self.without_db().database(&self.database_name)
    }
}

impl AuthSettings {
    pub fn access_token_duration(&self) -> Duration {
        Duration::seconds(self.access_token_duration_seconds)
    }

    pub fn refresh_token_duration(&self) -> Duration {
        Duration::seconds(self.refresh_token_duration_seconds)
    }
}

// Secrets stay out of the logs
impl fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSettings")
            .field("access_token_duration_seconds", &self.access_token_duration_seconds)
            .field("refresh_token_duration_seconds", &self.refresh_token_duration_seconds)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for PaymentSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaymentSettings")
            .field("api_base_url", &self.api_base_url)
            .field("currency", &self.currency)
            .field("gift_coupon_threshold", &self.gift_coupon_threshold)
            .field("gift_coupon_percentage", &self.gift_coupon_percentage)
            .field("gift_coupon_valid_days", &self.gift_coupon_valid_days)
            .finish_non_exhaustive()
    }
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Test => "test",
            Environment::Production => "production",
        }
    }

    /// Cookies are only flagged `Secure` when served behind TLS in production
    pub fn secure_cookies(&self) -> bool {
        *self == Environment::Production
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::Local
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "test" => Ok(Self::Test),
            "production" => Ok(Self::Production),
            other => Err(format!("{} is not a supported environment", other)),
        }
    }
}
