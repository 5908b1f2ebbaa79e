use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub amadeus: AmadeusConfig,
    pub store: StoreConfig,
    pub search: SearchConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiration_seconds: u64,
    /// Token lifetime when the client asks to stay signed in.
    #[serde(default = "default_remember_expiration")]
    pub remember_expiration_seconds: u64,
    pub password_salt: String,
}

fn default_remember_expiration() -> u64 {
    30 * 24 * 60 * 60
}

#[derive(Debug, Deserialize, Clone)]
pub struct AmadeusConfig {
    pub base_url: String,
    pub api_key: String,
    pub api_secret: String,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    Redis,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Required when `backend = "redis"`.
    pub redis_url: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    /// Currency code used whenever the upstream payload omits one.
    pub fallback_currency: String,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(config::File::with_name("config/default"))
            // Add in the current environment file
            // Default to 'development' env
            // Note that this file is _optional_
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add in a local configuration file
            // This file shouldn't be checked in to git
            .add_source(config::File::with_name("config/local").required(false))
            // Add in settings from the environment (with a prefix of WAYFARE)
            // Eg.. `WAYFARE__SERVER__PORT=8080` would set the server port
            .add_source(config::Environment::with_prefix("WAYFARE").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
