use std::{sync::Arc, time::Duration};

use axum::{
    Json, Router,
    http::{HeaderName, Request, Response, StatusCode, Uri},
    routing::get,
};
use tower::limit::ConcurrencyLimitLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::{
    cart::CartSessions,
    config::AppConfig,
    db::OrmConn,
    response::{ApiResponse, Meta},
    routes::{create_api_router, doc::scalar_docs, health},
    services::{
        catalog_service::SeaOrmCatalog,
        notify_service::{LogNotifier, OrderNotifier, TwilioWhatsAppNotifier},
        order_service::SeaOrmOrderStore,
        payment_service::{MonerooGateway, PaymentGateway, UnconfiguredGateway},
    },
    state::AppState,
    storage::{ClientStorage, FileStorage, MemoryStorage},
};

/// Wires the database-backed collaborators and the cart storage from config.
pub fn build_state(config: AppConfig, orm: OrmConn) -> anyhow::Result<AppState> {
    let (carts, staging): (Arc<dyn ClientStorage>, Arc<dyn ClientStorage>) =
        match &config.storage_dir {
            Some(dir) => (
                Arc::new(FileStorage::open(dir.join("carts"))?),
                Arc::new(FileStorage::open(dir.join("checkout"))?),
            ),
            None => {
                tracing::warn!("STORAGE_DIR not set, carts are kept in memory only");
                (Arc::new(MemoryStorage::new()), Arc::new(MemoryStorage::new()))
            }
        };

    let gateway: Arc<dyn PaymentGateway> = match &config.moneroo {
        Some(moneroo) => Arc::new(MonerooGateway::new(moneroo.clone())),
        None => {
            tracing::warn!("MONEROO_SECRET_KEY not set, card and mobile payments are disabled");
            Arc::new(UnconfiguredGateway)
        }
    };

    let notifier: Arc<dyn OrderNotifier> = match &config.twilio {
        Some(twilio) => Arc::new(TwilioWhatsAppNotifier::new(twilio.clone())),
        None => Arc::new(LogNotifier),
    };

    Ok(AppState {
        carts: Arc::new(CartSessions::new(
            carts,
            staging,
            config.checkout_payload_ttl,
        )),
        config: Arc::new(config),
        catalog: Arc::new(SeaOrmCatalog::new(orm.clone())),
        orders: Arc::new(SeaOrmOrderStore::new(orm)),
        gateway,
        notifier,
    })
}

pub fn build_router(state: AppState) -> Router {
    let concurrency_limit_layer = ConcurrencyLimitLayer::new(100);

    let request_id_header = HeaderName::from_static("x-request-id");
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<_>| {
            let request_id = request
                .headers()
                .get("x-request-id")
                .and_then(|value| value.to_str().ok())
                .unwrap_or("-");
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = %request_id
            )
        })
        .on_request(|request: &Request<_>, _span: &tracing::Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "request started"
            );
        })
        .on_response(|response: &Response<_>, latency: Duration, _span: &tracing::Span| {
            tracing::info!(
                status = %response.status(),
                ms = %latency.as_millis(),
                "request finished"
            );
        });

    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", create_api_router())
        .merge(scalar_docs())
        .fallback(not_found)
        .layer(trace_layer)
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(RequestBodyLimitLayer::new(1024 * 1024))
        .layer(concurrency_limit_layer)
        .with_state(state)
}

async fn not_found(uri: Uri) -> (StatusCode, Json<ApiResponse<serde_json::Value>>) {
    let body = ApiResponse::success(
        "Not Found",
        serde_json::json!({ "path": uri.path() }),
        Some(Meta::empty()),
    );
    (StatusCode::NOT_FOUND, Json(body))
}
