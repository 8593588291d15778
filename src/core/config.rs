//! Configuration management for the server.
//!
//! This module provides a centralized configuration structure that can be
//! populated from environment variables or defaults.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::transport::TransportConfig;

/// Main configuration structure for the server.
///
/// This struct contains all configurable aspects of the server, organized
/// by domain for clarity and maintainability.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Transport configuration.
    pub transport: TransportConfig,

    /// Streaming channel timing configuration.
    pub streaming: StreamingConfig,

    /// Tax tool rate table.
    pub tax: TaxConfig,

    /// Weather tool collaborator endpoints.
    pub weather: WeatherConfig,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The name of the server as reported to clients.
    pub name: String,

    /// The version of the server.
    pub version: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,

    /// Whether to include timestamps in log output.
    pub with_timestamps: bool,
}

/// Timing configuration for the streaming channel.
///
/// The source of these numbers is the wire behavior: a heartbeat every 30
/// seconds on idle notification streams, and a one-second delay before a
/// call-initiated stream's completion event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamingConfig {
    /// Interval between heartbeat notifications on an idle open channel.
    pub heartbeat_interval_ms: u64,

    /// Delay before the completion event on a call-initiated stream.
    pub completion_delay_ms: u64,
}

impl StreamingConfig {
    /// Heartbeat interval as a `Duration`.
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval_ms)
    }

    /// Completion delay as a `Duration`.
    pub fn completion_delay(&self) -> Duration {
        Duration::from_millis(self.completion_delay_ms)
    }
}

/// Jurisdiction → sales tax rate table for the tax tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxConfig {
    /// Rates keyed by jurisdiction name. A `BTreeMap` keeps listings in a
    /// stable order for reproducible responses.
    pub rates: BTreeMap<String, f64>,
}

impl TaxConfig {
    /// Look up the rate for a jurisdiction.
    pub fn rate(&self, jurisdiction: &str) -> Option<f64> {
        self.rates.get(jurisdiction).copied()
    }

    /// All known jurisdiction names, in stable sorted order.
    pub fn jurisdictions(&self) -> Vec<String> {
        self.rates.keys().cloned().collect()
    }
}

/// Endpoints of the external weather collaborators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Geocoding search endpoint (city name → coordinates).
    pub geocoding_url: String,

    /// Forecast endpoint (coordinates → current conditions).
    pub forecast_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "tax-mcp-server".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            with_timestamps: true,
        }
    }
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval_ms: 30_000,
            completion_delay_ms: 1_000,
        }
    }
}

impl Default for TaxConfig {
    fn default() -> Self {
        let rates = BTreeMap::from([
            ("California".to_string(), 0.0725),
            ("Florida".to_string(), 0.06),
            ("Indiana".to_string(), 0.07),
            ("New York".to_string(), 0.04),
            ("Texas".to_string(), 0.0625),
        ]);
        Self { rates }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            geocoding_url: "https://geocoding-api.open-meteo.com/v1/search".to_string(),
            forecast_url: "https://api.open-meteo.com/v1/forecast".to_string(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    ///
    /// Environment variables are prefixed with `MCP_`.
    /// For example: `MCP_SERVER_NAME`, `MCP_LOG_LEVEL`, `MCP_HTTP_PORT`.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Ok(name) = std::env::var("MCP_SERVER_NAME") {
            config.server.name = name;
        }

        if let Ok(level) = std::env::var("MCP_LOG_LEVEL") {
            config.logging.level = level;
        }

        config.transport = TransportConfig::from_env();

        if let Ok(interval) = std::env::var("MCP_HEARTBEAT_INTERVAL_MS") {
            if let Ok(ms) = interval.parse() {
                config.streaming.heartbeat_interval_ms = ms;
            }
        }

        if let Ok(delay) = std::env::var("MCP_COMPLETION_DELAY_MS") {
            if let Ok(ms) = delay.parse() {
                config.streaming.completion_delay_ms = ms;
            }
        }

        if let Ok(url) = std::env::var("MCP_GEOCODING_URL") {
            info!("Using geocoding endpoint from environment: {}", url);
            config.weather.geocoding_url = url;
        }

        if let Ok(url) = std::env::var("MCP_FORECAST_URL") {
            info!("Using forecast endpoint from environment: {}", url);
            config.weather.forecast_url = url;
        }

        config
    }
}
