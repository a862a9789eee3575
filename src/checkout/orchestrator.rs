//! Checkout submission: cash orders are written immediately, gateway orders
//! are staged and handed to the hosted payment page.

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    cart::{CartSession, Totals},
    checkout::{
        form::{self, normalize_phone, trimmed_or_none},
        payload::CheckoutPayload,
    },
    config::AppConfig,
    dto::checkout::CheckoutRequest,
    error::{AppError, AppResult},
    models::{DeliveryMode, NewOrder, Order},
    response::{Navigation, StepResponse},
    services::{
        notify_service::{NewOrderNotice, NotificationOutcome, notify_best_effort},
        order_service::{STATUS_PAID, STATUS_PENDING},
        payment_service::{CURRENCY_XOF, PaymentCustomer, PaymentInit},
    },
    state::AppState,
};

pub const ORDER_DESCRIPTION: &str = "Commande BelléaWigs";
pub const FALLBACK_CUSTOMER_EMAIL: &str = "client@belleawigs.com";
pub const METADATA_SOURCE: &str = "belleawigs";

const ORDER_WRITE_ALERT: &str = "Your order could not be saved, please try again";
const PAYMENT_START_ALERT: &str = "The payment could not be started, please try again";

/// Validates the form against the session's cart and routes the order.
///
/// Cash orders are created, notified and confirmed, and only then is the cart
/// cleared. Card and mobile-money orders stage a [`CheckoutPayload`] and move on
/// to the payment step. A second submission while one is running is a conflict.
pub async fn submit_checkout(
    state: &AppState,
    session: &Arc<CartSession>,
    user_id: Option<Uuid>,
    request: CheckoutRequest,
) -> AppResult<StepResponse> {
    let _guard = session
        .begin_submission()
        .ok_or_else(|| AppError::Conflict("A checkout is already in progress".into()))?;

    let snapshot = session.snapshot()?;
    form::validate(&request.form, snapshot.delivery_mode, &snapshot.lines)?;

    let payload = CheckoutPayload {
        user_id,
        form_data: request.form,
        payment_method: request.payment_method,
        delivery_mode: snapshot.delivery_mode,
        items: snapshot.lines.iter().map(Into::into).collect(),
        total_price: snapshot.total_price,
    };

    if payload.payment_method.uses_gateway() {
        session.stash().stage(&payload)?;
        tracing::info!(
            session = %session.id(),
            method = payload.payment_method.as_str(),
            "checkout staged for payment"
        );
        return Ok(StepResponse::go(Navigation::Payment));
    }

    let order = match place_order(state, &payload, None).await {
        Ok(order) => order,
        Err(err) => {
            tracing::error!(error = %err, session = %session.id(), "cash order not created");
            return Ok(StepResponse::alert(Navigation::Checkout, ORDER_WRITE_ALERT));
        }
    };

    finish_order(state, session, &order, &payload).await
}

/// The payment step: opens a hosted checkout for the staged payload.
pub async fn start_payment(state: &AppState, session: &CartSession) -> AppResult<StepResponse> {
    let Some(payload) = session.stash().peek() else {
        tracing::debug!(session = %session.id(), "no staged checkout, back to cart");
        return Ok(StepResponse::go(Navigation::Cart));
    };

    let init = payment_init(&state.config, &payload);
    match state.gateway.initialize(init).await {
        Ok(hosted) => {
            tracing::info!(
                session = %session.id(),
                payment_id = hosted.payment_id.as_deref().unwrap_or("-"),
                "redirecting to hosted checkout"
            );
            Ok(StepResponse::go(Navigation::External {
                url: hosted.checkout_url,
            }))
        }
        Err(err) => {
            tracing::warn!(error = %err, session = %session.id(), "payment init failed");
            Ok(StepResponse::alert(Navigation::Checkout, PAYMENT_START_ALERT))
        }
    }
}

/// Writes the order header then its items. A failed item insert leaves the
/// header in place.
pub async fn place_order(
    state: &AppState,
    payload: &CheckoutPayload,
    payment_id: Option<String>,
) -> AppResult<Order> {
    let subtotal = payload.items_subtotal();
    if subtotal != payload.total_price {
        tracing::warn!(
            staged = payload.total_price,
            recomputed = subtotal,
            "staged total differs from item snapshot"
        );
    }
    let totals = Totals::compute(payload.delivery_mode, subtotal);

    let provider = payment_id.as_ref().map(|_| state.gateway.provider());
    let new_order = build_order(payload, totals, provider, payment_id);

    let order = state
        .orders
        .insert_order(new_order)
        .await
        .map_err(|err| AppError::OrderWrite(err.to_string()))?;

    if let Err(err) = state
        .orders
        .insert_items(order.id, payload.items.clone())
        .await
    {
        tracing::error!(error = %err, order_id = %order.id, "order saved without its items");
        return Err(AppError::OrderWrite(err.to_string()));
    }

    tracing::info!(order_id = %order.id, total = order.total, "order created");
    Ok(order)
}

/// Notifies, builds the confirmation and clears the cart, in that order.
pub(crate) async fn finish_order(
    state: &AppState,
    session: &CartSession,
    order: &Order,
    payload: &CheckoutPayload,
) -> AppResult<StepResponse> {
    let notice = NewOrderNotice {
        order_id: order.id,
        customer_name: order.full_name.clone(),
        customer_phone: order.phone.clone(),
        total: order.total,
        lines: payload.items.clone(),
    };
    if notify_best_effort(state.notifier.as_ref(), notice).await == NotificationOutcome::Failed {
        tracing::debug!(order_id = %order.id, "continuing without notification");
    }

    let step = StepResponse::go(Navigation::Confirmation { order_id: order.id });
    session.clear_cart()?;
    Ok(step)
}

pub fn build_order(
    payload: &CheckoutPayload,
    totals: Totals,
    provider: Option<&str>,
    payment_id: Option<String>,
) -> NewOrder {
    let form = &payload.form_data;
    let delivery = payload.delivery_mode == DeliveryMode::Delivery;
    let paid = payment_id.is_some();

    NewOrder {
        user_id: payload.user_id,
        full_name: form.full_name.trim().to_string(),
        phone: normalize_phone(form.country, &form.phone),
        email: trimmed_or_none(&form.email),
        country: form.country.as_str().to_string(),
        region: delivery.then(|| trimmed_or_none(&form.region)).flatten(),
        city: delivery.then(|| trimmed_or_none(&form.city)).flatten(),
        address: delivery.then(|| trimmed_or_none(&form.address)).flatten(),
        notes: trimmed_or_none(&form.notes),
        payment_method: payload.payment_method,
        delivery_mode: payload.delivery_mode,
        delivery_fee: totals.delivery_fee,
        total: totals.grand_total,
        payment_provider: provider.map(str::to_string),
        payment_status: paid.then(|| STATUS_PAID.to_string()),
        payment_id,
        status: if paid { STATUS_PAID } else { STATUS_PENDING }.to_string(),
    }
}

pub fn payment_init(config: &AppConfig, payload: &CheckoutPayload) -> PaymentInit {
    let form = &payload.form_data;
    let totals = Totals::compute(payload.delivery_mode, payload.items_subtotal());

    let full_name = form.full_name.trim();
    let (first_name, last_name) = match full_name.split_once(char::is_whitespace) {
        Some((first, rest)) => (first, rest.trim()),
        None => (full_name, ""),
    };

    PaymentInit {
        amount: totals.grand_total,
        currency: CURRENCY_XOF.to_string(),
        description: ORDER_DESCRIPTION.to_string(),
        return_url: config.payment_return_url(),
        customer: PaymentCustomer {
            email: trimmed_or_none(&form.email)
                .unwrap_or_else(|| FALLBACK_CUSTOMER_EMAIL.to_string()),
            first_name: if first_name.is_empty() { "Client" } else { first_name }.to_string(),
            last_name: if last_name.is_empty() { " " } else { last_name }.to_string(),
            phone: trimmed_or_none(&form.phone).map(|p| normalize_phone(form.country, &p)),
        },
        metadata: serde_json::json!({ "source": METADATA_SOURCE }),
    }
}
