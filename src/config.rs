use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;
use sqlx::postgres::{PgConnectOptions, PgSslMode};
use url::Url;

#[derive(Deserialize, Clone)]
pub struct Config {
    pub application: ApplicationConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub event: EventConfig,
}

impl Config {
    /// Reads `config.yaml` (when present) and `APP_`-prefixed environment
    /// variables, with the environment taking precedence.
    pub fn load() -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        settings.try_deserialize::<Config>()
    }
}

#[derive(Deserialize, Clone)]
pub struct ApplicationConfig {
    pub host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub debug_mode: String,
}

#[derive(Deserialize, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub username: String,
    pub password: Secret<String>,
    pub name: String,
    pub require_ssl: bool,
}

impl DatabaseConfig {
    pub fn get_connect_options(&self) -> PgConnectOptions {
        let ssl_mode = if self.require_ssl {
            PgSslMode::Require
        } else {
            PgSslMode::Prefer
        };

        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.username)
            .password(self.password.expose_secret())
            .database(&self.name)
            .ssl_mode(ssl_mode)
    }
}

#[derive(Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: Secret<String>,
    pub iss: String,
    pub exp: u64,
}

/// Event-funnel settings: where shared landing links point and which external
/// endpoint renders QR images for them.
#[derive(Deserialize, Clone)]
pub struct EventConfig {
    pub landing_base_url: String,
    pub qr_endpoint: String,
}

impl EventConfig {
    pub fn landing_base(&self) -> Result<Url, url::ParseError> {
        Url::parse(&self.landing_base_url)
    }

    pub fn qr_endpoint(&self) -> Result<Url, url::ParseError> {
        Url::parse(&self.qr_endpoint)
    }
}
