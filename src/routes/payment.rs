use axum::{
    Json, Router,
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
};

use crate::{
    checkout::{self, WebhookOutcome},
    dto::checkout::PaymentReturnQuery,
    error::AppResult,
    middleware::session::CurrentCart,
    response::{ApiResponse, Meta, StepResponse},
    state::AppState,
};

pub const SIGNATURE_HEADER: &str = "x-moneroo-signature";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/start", post(start_payment))
        .route("/return", get(payment_return))
        .route("/webhook", post(payment_webhook))
}

#[utoipa::path(
    post,
    path = "/api/payment/start",
    params(("x-cart-session" = String, Header, description = "Cart session id")),
    responses(
        (status = 200, description = "Hosted checkout url, or back to cart/checkout", body = ApiResponse<StepResponse>)
    ),
    tag = "Payment"
)]
pub async fn start_payment(
    State(state): State<AppState>,
    CurrentCart(session): CurrentCart,
) -> AppResult<Json<ApiResponse<StepResponse>>> {
    let step = checkout::start_payment(&state, &session).await?;
    Ok(Json(ApiResponse::success("Payment", step, Some(Meta::empty()))))
}

#[utoipa::path(
    get,
    path = "/api/payment/return",
    params(
        ("x-cart-session" = String, Header, description = "Cart session id"),
        ("monerooPaymentId" = Option<String>, Query, description = "Gateway payment reference"),
        ("monerooPaymentStatus" = Option<String>, Query, description = "Gateway-reported status, informational")
    ),
    responses(
        (status = 200, description = "Confirmation, or back to cart with an alert", body = ApiResponse<StepResponse>)
    ),
    tag = "Payment"
)]
pub async fn payment_return(
    State(state): State<AppState>,
    CurrentCart(session): CurrentCart,
    Query(query): Query<PaymentReturnQuery>,
) -> AppResult<Json<ApiResponse<StepResponse>>> {
    let step = checkout::reconcile_payment(&state, &session, query).await?;
    Ok(Json(ApiResponse::success("Payment return", step, Some(Meta::empty()))))
}

#[utoipa::path(
    post,
    path = "/api/payment/webhook",
    request_body(content = String, content_type = "application/json", description = "Raw gateway event"),
    params(("X-Moneroo-Signature" = String, Header, description = "Hex HMAC-SHA256 of the raw body")),
    responses(
        (status = 200, description = "OK"),
        (status = 403, description = "Invalid signature"),
        (status = 503, description = "Webhook secret not configured")
    ),
    tag = "Payment"
)]
pub async fn payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, &'static str) {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    match checkout::handle_webhook(&state, signature, &body).await {
        WebhookOutcome::Accepted => (StatusCode::OK, "OK"),
        WebhookOutcome::InvalidSignature => (StatusCode::FORBIDDEN, "Invalid signature"),
        WebhookOutcome::NotConfigured => {
            (StatusCode::SERVICE_UNAVAILABLE, "Webhook secret not configured")
        }
    }
}
