use std::sync::Arc;
use wayfare_core::search::SearchEngine;
use wayfare_core::store::UserStore;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
    pub remember_expiration: u64,
    pub password_salt: String,
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn UserStore>,
    pub engine: Arc<SearchEngine>,
    pub auth: AuthConfig,
}
