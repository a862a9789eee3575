use std::sync::Arc;

use crate::{
    cart::CartSessions,
    config::AppConfig,
    services::{
        catalog_service::CatalogService, notify_service::OrderNotifier,
        order_service::OrderStore, payment_service::PaymentGateway,
    },
};

/// Shared handles for every request. Collaborators sit behind traits so tests
/// can swap in mocks.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub catalog: Arc<dyn CatalogService>,
    pub orders: Arc<dyn OrderStore>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub notifier: Arc<dyn OrderNotifier>,
    pub carts: Arc<CartSessions>,
}
