use std::str;

use config::{Config, ConfigError, Environment, File, FileFormat};
use error_stack::{Report, ResultExt};
use serde::Deserialize;

use crate::error::AdapterError;

#[derive(Debug, Clone, Deserialize)]
pub struct Bidder {
    /// Edge-server URL prefix used when no server-set prefix is stored.
    pub url_prefix: String,
    /// Currency code reported on normalized bids.
    pub currency: String,
    /// First-party cookie domain for the state store.
    pub cookie_domain: String,
    /// Cookie path scope.
    pub cookie_path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub bidder: Bidder,
}

impl Settings {
    /// Load settings from the embedded TOML with environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is malformed or incomplete.
    pub fn new() -> Result<Self, ConfigError> {
        let toml_bytes = include_bytes!("../../../bidtrace.toml");
        let toml_str = str::from_utf8(toml_bytes).expect("embedded TOML must be UTF-8");

        Self::from_toml(toml_str)
    }

    /// Build settings from a TOML string plus `BIDTRACE__*` environment
    /// variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid or required fields are
    /// missing.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let environment = Environment::default().prefix("BIDTRACE").separator("__");

        let toml = File::from_str(toml_str, FileFormat::Toml);
        let config = Config::builder()
            .add_source(toml)
            .add_source(environment)
            .build()?;

        config.try_deserialize()
    }
}

/// Load the embedded settings, attaching adapter error context.
///
/// # Errors
///
/// Returns an error if the embedded configuration is malformed or
/// incomplete after environment overrides.
pub fn load_settings() -> Result<Settings, Report<AdapterError>> {
    Settings::new().change_context(AdapterError::Configuration {
        message: "failed to load adapter settings".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_new() {
        let settings = Settings::new();
        assert!(settings.is_ok(), "Settings should load from embedded TOML");

        let settings = settings.unwrap();
        assert!(!settings.bidder.url_prefix.is_empty());
        assert!(!settings.bidder.currency.is_empty());
        assert!(!settings.bidder.cookie_domain.is_empty());
        assert_eq!(settings.bidder.cookie_path, "/");
    }

    #[test]
    fn test_load_settings() {
        assert!(load_settings().is_ok());
    }

    #[test]
    fn test_settings_from_valid_toml() {
        let toml_str = r#"
            [bidder]
            url_prefix = "https://bids.example.com/m/"
            currency = "USD"
            cookie_domain = "publisher.example.com"
            cookie_path = "/"
            "#;

        let settings = Settings::from_toml(toml_str).unwrap();
        assert_eq!(settings.bidder.url_prefix, "https://bids.example.com/m/");
        assert_eq!(settings.bidder.currency, "USD");
        assert_eq!(settings.bidder.cookie_domain, "publisher.example.com");
    }

    #[test]
    fn test_settings_missing_required_fields() {
        let toml_str = r#"
            [bidder]
            url_prefix = "https://bids.example.com/m/"
            # Missing currency, cookie_domain, cookie_path
            "#;

        let settings = Settings::from_toml(toml_str);
        assert!(
            settings.is_err(),
            "Should fail when required fields are missing"
        );
    }

    #[test]
    fn test_settings_empty_toml() {
        let settings = Settings::from_toml("");
        assert!(settings.is_err(), "Should fail with empty TOML");
    }

    #[test]
    fn test_settings_invalid_toml_syntax() {
        let toml_str = r#"
            [bidder
            url_prefix = "https://bids.example.com/m/"
            "#;

        let settings = Settings::from_toml(toml_str);
        assert!(settings.is_err(), "Should fail with invalid TOML syntax");
    }

    #[test]
    fn test_settings_extra_fields_ignored() {
        let toml_str = r#"
            [bidder]
            url_prefix = "https://bids.example.com/m/"
            currency = "USD"
            cookie_domain = "publisher.example.com"
            cookie_path = "/"
            extra_field = "should be ignored"
            "#;

        let settings = Settings::from_toml(toml_str);
        assert!(settings.is_ok(), "Extra fields should be ignored");
    }
}
