//! Application configuration
//!
//! Environment-driven settings, validated before any collaborator is
//! constructed. Missing required values abort startup with a listing of
//! the missing keys.

use crate::error::{Error, Result};
use std::path::PathBuf;

/// Default location of the controller auth file
pub const DEFAULT_AUTH_FILE: &str = "secrets/controller.auth";

/// Default MQTT broker port
pub const DEFAULT_MQTT_PORT: u16 = 1883;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// SceneScape REST API base URL
    pub rest_url: String,
    /// REST API token
    pub api_token: String,
    /// Verify the REST API TLS certificate
    pub verify_ssl: bool,
    /// MQTT broker host
    pub mqtt_host: String,
    /// MQTT broker port
    pub mqtt_port: u16,
    /// Broker auth file path (JSON with user/password)
    pub auth_file: PathBuf,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// All missing required keys are collected and reported in a single
    /// `Error::Config` so the diagnostic names everything at once.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut missing: Vec<&str> = Vec::new();
        let mut required = |key: &'static str| -> String {
            match lookup(key) {
                Some(value) if !value.is_empty() => value,
                _ => {
                    missing.push(key);
                    String::new()
                }
            }
        };

        let rest_url = required("SCENESCAPE_REST_URL");
        let api_token = required("SCENESCAPE_API_TOKEN");
        let mqtt_host = required("SCENESCAPE_MQTT_HOST");

        if !missing.is_empty() {
            return Err(Error::Config(format!(
                "Missing required environment variables: {}",
                missing.join(", ")
            )));
        }

        let verify_ssl = lookup("SCENESCAPE_VERIFY_SSL")
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let mqtt_port = match lookup("SCENESCAPE_MQTT_PORT") {
            Some(value) => value
                .parse()
                .map_err(|_| Error::Config(format!("Invalid SCENESCAPE_MQTT_PORT: {value}")))?,
            None => DEFAULT_MQTT_PORT,
        };

        let auth_file = lookup("SCENESCAPE_AUTH_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_AUTH_FILE));

        Ok(Self {
            rest_url,
            api_token,
            verify_ssl,
            mqtt_host,
            mqtt_port,
            auth_file,
        })
    }
}
