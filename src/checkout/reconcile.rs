//! Turning a verified gateway payment into an order, exactly once.

use std::sync::Arc;

use crate::{
    cart::CartSession,
    checkout::{
        orchestrator::{finish_order, place_order},
        payload::CheckoutPayload,
    },
    dto::checkout::PaymentReturnQuery,
    error::AppResult,
    models::Order,
    response::{Navigation, StepResponse},
    services::payment_service::{WebhookEvent, verify_webhook_signature},
    state::AppState,
};

const VERIFY_FAILED_ALERT: &str = "We could not confirm your payment. Your cart is intact, please try again";
const ORDER_WRITE_ALERT: &str = "Your payment went through but the order could not be saved, please contact us";

/// Handles the shopper's return from the hosted checkout.
///
/// Replays (refresh, back button, double redirect) find no staged payload and
/// land on the cart without side effects. On any failure the payload is kept so
/// the shopper can retry.
pub async fn reconcile_payment(
    state: &AppState,
    session: &Arc<CartSession>,
    query: PaymentReturnQuery,
) -> AppResult<StepResponse> {
    let payment_id = query
        .payment_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty());
    let (Some(payment_id), Some(payload)) = (payment_id, session.stash().peek()) else {
        tracing::debug!(session = %session.id(), "nothing to reconcile, back to cart");
        return Ok(StepResponse::go(Navigation::Cart));
    };
    let payment_id = payment_id.to_string();

    let Some(_guard) = session.begin_submission() else {
        tracing::debug!(session = %session.id(), %payment_id, "reconciliation already running");
        return Ok(StepResponse::go(Navigation::Cart));
    };

    tracing::debug!(
        %payment_id,
        reported = query.payment_status.as_deref().unwrap_or("-"),
        "payment return"
    );

    match state.orders.find_by_payment_id(payment_id.clone()).await {
        Ok(Some(existing)) => return resume_existing(state, session, existing, &payload).await,
        Ok(None) => {}
        Err(err) => {
            tracing::error!(error = %err, %payment_id, "payment lookup failed");
            return Ok(StepResponse::alert(Navigation::Cart, VERIFY_FAILED_ALERT));
        }
    }

    match state.gateway.verify(payment_id.clone()).await {
        Ok(verification) if verification.is_success() => {}
        Ok(verification) => {
            tracing::warn!(%payment_id, status = %verification.status, "payment not successful");
            return Ok(StepResponse::alert(Navigation::Cart, VERIFY_FAILED_ALERT));
        }
        Err(err) => {
            tracing::warn!(error = %err, %payment_id, "payment verification failed");
            return Ok(StepResponse::alert(Navigation::Cart, VERIFY_FAILED_ALERT));
        }
    }

    let order = match place_order(state, &payload, Some(payment_id.clone())).await {
        Ok(order) => order,
        Err(err) => {
            tracing::error!(error = %err, %payment_id, "paid order not created");
            return Ok(StepResponse::alert(Navigation::Cart, ORDER_WRITE_ALERT));
        }
    };

    session.stash().discard();
    finish_order(state, session, &order, &payload).await
}

/// The payment already has an order. If an earlier attempt stopped after the
/// header, the items are written from the payload before confirming.
async fn resume_existing(
    state: &AppState,
    session: &CartSession,
    order: Order,
    payload: &CheckoutPayload,
) -> AppResult<StepResponse> {
    let item_count = match state.orders.get_order(order.id).await {
        Ok(found) => found.map_or(0, |o| o.items.len()),
        Err(err) => {
            tracing::error!(error = %err, order_id = %order.id, "order lookup failed");
            return Ok(StepResponse::alert(Navigation::Cart, VERIFY_FAILED_ALERT));
        }
    };

    if item_count > 0 {
        tracing::info!(order_id = %order.id, "payment already reconciled");
        session.stash().discard();
        session.clear_cart()?;
        return Ok(StepResponse::go(Navigation::Confirmation { order_id: order.id }));
    }

    if let Err(err) = state
        .orders
        .insert_items(order.id, payload.items.clone())
        .await
    {
        tracing::error!(error = %err, order_id = %order.id, "order items still missing");
        return Ok(StepResponse::alert(Navigation::Cart, ORDER_WRITE_ALERT));
    }
    tracing::info!(order_id = %order.id, "missing order items written");

    session.stash().discard();
    finish_order(state, session, &order, payload).await
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookOutcome {
    Accepted,
    InvalidSignature,
    NotConfigured,
}

/// Server-to-server payment notification. Once the signature checks out the
/// outcome is always `Accepted`, so the gateway does not retry.
pub async fn handle_webhook(
    state: &AppState,
    signature: Option<&str>,
    body: &[u8],
) -> WebhookOutcome {
    let Some(secret) = state
        .config
        .moneroo
        .as_ref()
        .and_then(|m| m.webhook_secret.as_deref())
    else {
        return WebhookOutcome::NotConfigured;
    };

    let valid = signature.is_some_and(|sig| verify_webhook_signature(secret, body, sig));
    if !valid {
        tracing::warn!("webhook signature rejected");
        return WebhookOutcome::InvalidSignature;
    }

    let event: WebhookEvent = match serde_json::from_slice(body) {
        Ok(event) => event,
        Err(err) => {
            tracing::warn!(error = %err, "webhook body malformed");
            return WebhookOutcome::Accepted;
        }
    };

    let Some(payment_id) = event.payment_id().map(str::to_string) else {
        return WebhookOutcome::Accepted;
    };
    if !event.is_payment_success() {
        tracing::debug!(%payment_id, event = event.event.as_deref().unwrap_or("-"), "webhook ignored");
        return WebhookOutcome::Accepted;
    }

    match state.gateway.verify(payment_id.clone()).await {
        Ok(verification) if verification.is_success() => {
            match state.orders.mark_paid(payment_id.clone()).await {
                Ok(true) => tracing::info!(%payment_id, "order marked paid from webhook"),
                Ok(false) => tracing::debug!(%payment_id, "webhook had nothing to update"),
                Err(err) => tracing::error!(error = %err, %payment_id, "webhook update failed"),
            }
        }
        Ok(verification) => {
            tracing::warn!(%payment_id, status = %verification.status, "webhook payment not successful");
        }
        Err(err) => tracing::warn!(error = %err, %payment_id, "webhook verification failed"),
    }

    WebhookOutcome::Accepted
}
