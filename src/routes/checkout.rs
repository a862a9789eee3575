use axum::{Json, Router, extract::State, routing::post};

use crate::{
    checkout,
    dto::checkout::CheckoutRequest,
    error::AppResult,
    middleware::{auth::MaybeUser, session::CurrentCart},
    response::{ApiResponse, Meta, StepResponse},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(submit_checkout))
}

#[utoipa::path(
    post,
    path = "/api/checkout",
    params(("x-cart-session" = String, Header, description = "Cart session id")),
    request_body = CheckoutRequest,
    responses(
        (status = 200, description = "Next step: confirmation, payment, or back to checkout with an alert", body = ApiResponse<StepResponse>),
        (status = 409, description = "A checkout is already in progress"),
        (status = 422, description = "Form or cart invalid")
    ),
    security((), ("bearer_auth" = [])),
    tag = "Checkout"
)]
pub async fn submit_checkout(
    State(state): State<AppState>,
    user: MaybeUser,
    CurrentCart(session): CurrentCart,
    Json(payload): Json<CheckoutRequest>,
) -> AppResult<Json<ApiResponse<StepResponse>>> {
    let step = checkout::submit_checkout(&state, &session, user.user_id(), payload).await?;
    Ok(Json(ApiResponse::success("Checkout", step, Some(Meta::empty()))))
}
