//! Generation settings shared by every backend.

use std::time::Duration;

use crate::error::{ModelError, Result};

/// Model name, sampling temperature, and request timeout.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    /// Model identifier understood by the backend.
    pub model: String,

    /// Sampling temperature, `0.0..=2.0`.
    pub temperature: f32,

    /// Per-request timeout. `None` waits as long as the backend takes.
    pub timeout: Option<Duration>,
}

impl GenerationConfig {
    /// Settings for `model` at temperature `0.0` with no timeout.
    pub fn new(model: impl Into<String>) -> Self {
        Self { model: model.into(), temperature: 0.0, timeout: None }
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Check that the settings are usable.
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(ModelError::ConfigError("model name must not be empty".to_string()));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ModelError::ConfigError(format!(
                "temperature must be between 0.0 and 2.0, got {}",
                self.temperature
            )));
        }
        Ok(())
    }

    pub(crate) fn http_client(&self) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        builder
            .build()
            .map_err(|e| ModelError::ConfigError(format!("failed to build HTTP client: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_uses_deterministic_sampling() {
        let config = GenerationConfig::new("gpt-4o");
        assert_eq!(config.temperature, 0.0);
        assert_eq!(config.timeout, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_blank_model() {
        assert!(GenerationConfig::new(" ").validate().is_err());
    }

    #[test]
    fn rejects_out_of_range_temperature() {
        assert!(GenerationConfig::new("m").with_temperature(2.5).validate().is_err());
        assert!(GenerationConfig::new("m").with_temperature(-0.1).validate().is_err());
        assert!(GenerationConfig::new("m").with_temperature(0.7).validate().is_ok());
    }
}
