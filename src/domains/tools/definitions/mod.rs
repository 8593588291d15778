//! Tool definitions module.
//!
//! Each tool lives in its own file and exposes a `definition()` constructor.
//! `register_defaults` is the single place where the server's tool set is
//! assembled.

pub mod calculate_tax;
pub mod get_weather;

pub use calculate_tax::CalculateTaxTool;
pub use get_weather::GetWeatherTool;

use std::sync::Arc;

use crate::core::config::Config;

use super::ToolError;
use super::registry::ToolRegistry;

/// Register every built-in tool against the given configuration.
pub fn register_defaults(registry: &mut ToolRegistry, config: &Arc<Config>) -> Result<(), ToolError> {
    registry.register(CalculateTaxTool::definition(Arc::new(config.tax.clone())))?;
    registry.register(GetWeatherTool::definition(Arc::new(config.weather.clone())))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_defaults() {
        let config = Arc::new(Config::default());
        let mut registry = ToolRegistry::new();
        register_defaults(&mut registry, &config).unwrap();

        assert_eq!(registry.names(), vec!["calculate-tax", "get-weather"]);
    }

    #[test]
    fn test_register_defaults_twice_reports_duplicate() {
        let config = Arc::new(Config::default());
        let mut registry = ToolRegistry::new();
        register_defaults(&mut registry, &config).unwrap();

        let err = register_defaults(&mut registry, &config).unwrap_err();
        assert!(matches!(err, ToolError::Duplicate(_)));
    }
}
