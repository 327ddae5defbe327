use argon2::Argon2;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::payment::PaymentGateway;
use crate::store::Store;
use crate::ws::ChatRegistry;

/// Shared application state carried by the router. Built once in `main`
/// (or a test harness) and cloned per request; holds the only configuration
/// the process ever reads.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Store,
    pub chat: ChatRegistry,
    pub payments: Option<Arc<dyn PaymentGateway>>,
    pub hasher: Argon2<'static>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        store: Store,
        payments: Option<Arc<dyn PaymentGateway>>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            store,
            chat: ChatRegistry::default(),
            payments,
            hasher: Argon2::default(),
        }
    }
}
