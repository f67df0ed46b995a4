mod scoring;

pub use scoring::{GradeTable, NoiseRange, RoundingPolicy, ScoringConfig};

use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

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
    pub scoring: ScoringConfig,
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
            scoring: load_scoring()?,
        })
    }
}

fn load_scoring() -> Result<ScoringConfig, ConfigError> {
    let defaults = NoiseRange::default();
    let min_db = read_decibels("SCORING_NOISE_MIN_DB", defaults.min_db)?;
    let max_db = read_decibels("SCORING_NOISE_MAX_DB", defaults.max_db)?;
    let noise_range =
        NoiseRange::new(min_db, max_db).ok_or(ConfigError::InvertedNoiseRange { min_db, max_db })?;

    let rounding = match env::var("SCORING_WEIGHT_ROUNDING") {
        Ok(raw) => RoundingPolicy::parse(&raw).ok_or(ConfigError::InvalidRounding(raw))?,
        Err(_) => RoundingPolicy::default(),
    };

    Ok(ScoringConfig {
        grades: GradeTable::default(),
        noise_range,
        rounding,
    })
}

fn read_decibels(key: &'static str, default: f64) -> Result<f64, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or(ConfigError::InvalidDecibels { key }),
        Err(_) => Ok(default),
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

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidDecibels { key: &'static str },
    InvertedNoiseRange { min_db: f64, max_db: f64 },
    InvalidRounding(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidDecibels { key } => {
                write!(f, "{key} must be a finite decibel value")
            }
            ConfigError::InvertedNoiseRange { min_db, max_db } => write!(
                f,
                "noise range minimum {min_db} dB exceeds maximum {max_db} dB"
            ),
            ConfigError::InvalidRounding(value) => write!(
                f,
                "SCORING_WEIGHT_ROUNDING must be 'largest_remainder' or 'independent', got '{value}'"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidDecibels { .. }
            | ConfigError::InvertedNoiseRange { .. }
            | ConfigError::InvalidRounding(_) => None,
        }
    }
}
