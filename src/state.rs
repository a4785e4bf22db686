use std::sync::Arc;

use crate::auth::cookie::CookieSigner;
use crate::config::Config;
use crate::db::BlogStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn BlogStore>,
    pub config: Config,
    pub signer: CookieSigner,
}

impl AppState {
    pub fn new(store: Arc<dyn BlogStore>, config: Config) -> Self {
        let signer = CookieSigner::new(config.secret());
        Self {
            store,
            config,
            signer,
        }
    }
}
