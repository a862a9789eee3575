#![allow(dead_code)]

use std::{sync::Arc, time::Duration};

use chrono::Utc;
use storefront_api::{
    cart::CartSessions,
    checkout::CheckoutForm,
    config::{AppConfig, MonerooConfig},
    models::{Country, NewOrder, Order, Product, ProductVariant},
    services::{
        catalog_service::MockCatalogService, notify_service::MockOrderNotifier,
        order_service::MockOrderStore, payment_service::MockPaymentGateway,
    },
    state::AppState,
    storage::MemoryStorage,
};
use uuid::Uuid;

pub const JWT_SECRET: &str = "test-jwt-secret";
pub const WEBHOOK_SECRET: &str = "test-webhook-secret";

pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: String::new(),
        host: "127.0.0.1".into(),
        port: 0,
        jwt_secret: Some(JWT_SECRET.into()),
        public_base_url: "http://localhost:5173".into(),
        storage_dir: None,
        checkout_payload_ttl: Duration::from_secs(3600),
        moneroo: Some(MonerooConfig {
            api_url: "http://gateway.test".into(),
            secret_key: "sk_test".into(),
            webhook_secret: Some(WEBHOOK_SECRET.into()),
        }),
        twilio: None,
    }
}

#[derive(Default)]
pub struct Mocks {
    pub catalog: MockCatalogService,
    pub orders: MockOrderStore,
    pub gateway: MockPaymentGateway,
    pub notifier: MockOrderNotifier,
}

impl Mocks {
    pub fn into_state(self) -> AppState {
        self.into_state_with(test_config())
    }

    pub fn into_state_with(self, config: AppConfig) -> AppState {
        AppState {
            carts: Arc::new(CartSessions::new(
                Arc::new(MemoryStorage::new()),
                Arc::new(MemoryStorage::new()),
                config.checkout_payload_ttl,
            )),
            config: Arc::new(config),
            catalog: Arc::new(self.catalog),
            orders: Arc::new(self.orders),
            gateway: Arc::new(self.gateway),
            notifier: Arc::new(self.notifier),
        }
    }
}

pub fn product(id: i64) -> Product {
    Product {
        id,
        name: format!("Wig {id}"),
        slug: format!("wig-{id}"),
        category: Some("lace-frontal".into()),
        description: None,
        base_price_min: Some(5_000),
        original_price: Some(9_000),
        is_active: true,
        details: vec!["Human hair".into()],
        image_url: None,
    }
}

pub fn variant(id: i64, product_id: i64, color: &str, length: i32, price: i64, stock: i32) -> ProductVariant {
    ProductVariant {
        id,
        product_id,
        color: color.into(),
        color_hex: None,
        length,
        price,
        stock_count: Some(stock),
        sku: None,
        is_active: true,
        is_default: false,
        medias: Vec::new(),
        image_url: None,
    }
}

/// A home-delivery form in Lomé that passes validation.
pub fn checkout_form() -> CheckoutForm {
    CheckoutForm {
        full_name: "Ama Mensah".into(),
        phone: "90 12 34 56".into(),
        country: Country::Togo,
        region: "Maritime".into(),
        city: "Lomé".into(),
        address: "Rue 12, Bè".into(),
        ..CheckoutForm::default()
    }
}

/// What the order store would hand back for `new`.
pub fn stored_order(new: &NewOrder) -> Order {
    let now = Utc::now();
    Order {
        id: Uuid::new_v4(),
        user_id: new.user_id,
        full_name: new.full_name.clone(),
        phone: new.phone.clone(),
        email: new.email.clone(),
        country: new.country.clone(),
        region: new.region.clone(),
        city: new.city.clone(),
        address: new.address.clone(),
        notes: new.notes.clone(),
        payment_method: new.payment_method.as_str().to_string(),
        delivery_mode: new.delivery_mode,
        delivery_fee: new.delivery_fee,
        total: new.total,
        payment_provider: new.payment_provider.clone(),
        payment_id: new.payment_id.clone(),
        payment_status: new.payment_status.clone(),
        status: new.status.clone(),
        created_at: now,
        updated_at: now,
    }
}
