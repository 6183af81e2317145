//! Application configuration management.
//!
//! This module handles loading configuration from environment variables.
//! It uses the `envy` crate to deserialize environment variables into a type-safe struct.

use serde::Deserialize;

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `DATABASE_URL` (required): PostgreSQL connection string
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 3000
/// - `APP_BASE_URL` (optional): public URL used to build gateway callbacks
/// - `INSTAMOJO_URL`, `INSTAMOJO_API_KEY`, `INSTAMOJO_AUTH_TOKEN`, `INSTAMOJO_SALT`:
///   payment gateway credentials
/// - `FEATURE_FLAGS` (optional): comma separated list of active features
/// - `AGREEMENT_FRAGMENTS_DIR` (optional): directory holding agreement fragments
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,

    #[serde(default = "default_port")]
    pub server_port: u16,

    #[serde(default = "default_base_url")]
    pub app_base_url: String,

    #[serde(default = "default_instamojo_url")]
    pub instamojo_url: String,

    #[serde(default)]
    pub instamojo_api_key: String,

    #[serde(default)]
    pub instamojo_auth_token: String,

    /// Shared secret used to sign webhook payloads.
    #[serde(default)]
    pub instamojo_salt: String,

    #[serde(default)]
    pub feature_flags: String,

    #[serde(default = "default_fragments_dir")]
    pub agreement_fragments_dir: String,
}

/// Default port if SERVER_PORT environment variable is not set.
fn default_port() -> u16 {
    3000
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_instamojo_url() -> String {
    "https://www.instamojo.com/api/1.1".to_string()
}

fn default_fragments_dir() -> String {
    "agreement_fragments".to_string()
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// This method first attempts to load a `.env` file (which is optional),
    /// then reads environment variables and deserializes them into a Config struct.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing (e.g., DATABASE_URL)
    /// - Environment variable values cannot be parsed into expected types
    pub fn from_env() -> Result<Self, envy::Error> {
        // Try to load .env file if it exists (does nothing if not found)
        dotenvy::dotenv().ok();

        envy::from_env::<Config>()
    }

    /// URL the gateway sends the browser back to after payment.
    pub fn redirect_url(&self) -> String {
        format!("{}/instamojo/redirect", self.app_base_url.trim_end_matches('/'))
    }

    /// URL the gateway posts payment outcomes to.
    pub fn webhook_url(&self) -> String {
        format!("{}/instamojo/webhook", self.app_base_url.trim_end_matches('/'))
    }
}
