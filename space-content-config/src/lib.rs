use core::fmt::{Debug, Display};
use std::net::SocketAddr;

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::Deserialize;

pub const CONFIG_FILE: &str = "space-content.toml";
pub const ENV_PREFIX: &str = "SPACE_CONTENT_";

/// Credentials and endpoints of the personalization platform.
#[derive(Deserialize, Clone)]
pub struct TargetConfig {
    pub tenant_id: String,
    pub api_key: String,
    pub client_id: String,
    pub client_secret: String,
    /// Sent verbatim, upstream expects a comma separated list.
    pub scope: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_token_url")]
    pub token_url: String,
}

#[derive(Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_listen_address")]
    pub listen_address: SocketAddr,
    pub target: TargetConfig,
}

fn default_api_url() -> String {
    "https://mc.adobe.io".to_owned()
}

fn default_token_url() -> String {
    "https://ims-na1.adobelogin.com/ims/token/v3".to_owned()
}

fn default_listen_address() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 3000))
}

#[derive(thiserror::Error)]
pub enum ConfigError {
    #[error("config error: {0}")]
    Figment(#[from] figment::Error),
}

impl Debug for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

// nested keys: SPACE_CONTENT_TARGET__API_KEY
#[must_use]
pub fn figment() -> Figment {
    Figment::new()
        .merge(Toml::file(CONFIG_FILE))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
}

pub fn get_config() -> Result<Config, ConfigError> {
    Ok(figment().extract()?)
}
