use crate::stays::pricing::DEFAULT_FREE_GUESTS;
use rust_decimal::Decimal;
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub pricing: PricingConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            pricing: PricingConfig::from_env()?,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Guest-facing pricing knobs applied on top of provider rates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricingConfig {
    pub markup_percent: Decimal,
    pub free_guests: u32,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            markup_percent: Decimal::ZERO,
            free_guests: DEFAULT_FREE_GUESTS,
        }
    }
}

impl PricingConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let markup_percent = match env::var("STAY_MARKUP_PERCENT") {
            Ok(raw) => parse_markup(&raw)?,
            Err(_) => defaults.markup_percent,
        };

        let free_guests = match env::var("STAY_FREE_GUESTS") {
            Ok(raw) => raw
                .trim()
                .parse::<u32>()
                .map_err(|_| ConfigError::InvalidFreeGuests { value: raw })?,
            Err(_) => defaults.free_guests,
        };

        Ok(Self {
            markup_percent,
            free_guests,
        })
    }
}

fn parse_markup(raw: &str) -> Result<Decimal, ConfigError> {
    let invalid = || ConfigError::InvalidMarkup {
        value: raw.to_string(),
    };
    let markup = Decimal::from_str(raw.trim()).map_err(|_| invalid())?;
    if markup.is_sign_negative() {
        return Err(invalid());
    }
    Ok(markup)
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidMarkup { value: String },
    InvalidFreeGuests { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidMarkup { value } => write!(
                f,
                "STAY_MARKUP_PERCENT must be a non-negative decimal, got '{}'",
                value
            ),
            ConfigError::InvalidFreeGuests { value } => write!(
                f,
                "STAY_FREE_GUESTS must be a whole number of guests, got '{}'",
                value
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidMarkup { .. }
            | ConfigError::InvalidFreeGuests { .. } => None,
        }
    }
}
