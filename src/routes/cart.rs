use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, patch, post, put},
};

use crate::{
    dto::cart::{
        AddToCartRequest, CartSessionCreated, CartView, DeliveryModeRequest,
        UpdateQuantityRequest,
    },
    error::AppResult,
    middleware::session::CurrentCart,
    models::VariantId,
    response::ApiResponse,
    services::cart_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_cart).delete(clear_cart))
        .route("/session", post(create_session))
        .route("/items", post(add_to_cart))
        .route(
            "/items/{variant_id}",
            patch(update_quantity).delete(remove_from_cart),
        )
        .route("/delivery-mode", put(set_delivery_mode))
}

#[utoipa::path(
    post,
    path = "/api/cart/session",
    responses(
        (status = 200, description = "New cart session id", body = ApiResponse<CartSessionCreated>)
    ),
    tag = "Cart"
)]
pub async fn create_session(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<CartSessionCreated>>> {
    let resp = cart_service::create_session(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/cart",
    params(("x-cart-session" = String, Header, description = "Cart session id")),
    responses(
        (status = 200, description = "Cart with totals", body = ApiResponse<CartView>),
        (status = 400, description = "Missing or invalid session header")
    ),
    tag = "Cart"
)]
pub async fn get_cart(CurrentCart(session): CurrentCart) -> AppResult<Json<ApiResponse<CartView>>> {
    let resp = cart_service::get_cart(&session).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/cart/items",
    params(("x-cart-session" = String, Header, description = "Cart session id")),
    request_body = AddToCartRequest,
    responses(
        (status = 200, description = "Cart after the add", body = ApiResponse<CartView>),
        (status = 404, description = "Product or variant not found")
    ),
    tag = "Cart"
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    CurrentCart(session): CurrentCart,
    Json(payload): Json<AddToCartRequest>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let resp = cart_service::add_item(&state, &session, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/cart/items/{variant_id}",
    params(
        ("variant_id" = i64, Path, description = "Variant ID"),
        ("x-cart-session" = String, Header, description = "Cart session id")
    ),
    request_body = UpdateQuantityRequest,
    responses(
        (status = 200, description = "Cart after the update", body = ApiResponse<CartView>)
    ),
    tag = "Cart"
)]
pub async fn update_quantity(
    CurrentCart(session): CurrentCart,
    Path(variant_id): Path<VariantId>,
    Json(payload): Json<UpdateQuantityRequest>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let resp = cart_service::update_item(&session, variant_id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/cart/items/{variant_id}",
    params(
        ("variant_id" = i64, Path, description = "Variant ID"),
        ("x-cart-session" = String, Header, description = "Cart session id")
    ),
    responses(
        (status = 200, description = "Cart after the removal", body = ApiResponse<CartView>)
    ),
    tag = "Cart"
)]
pub async fn remove_from_cart(
    CurrentCart(session): CurrentCart,
    Path(variant_id): Path<VariantId>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let resp = cart_service::remove_item(&session, variant_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/cart",
    params(("x-cart-session" = String, Header, description = "Cart session id")),
    responses(
        (status = 200, description = "Empty cart", body = ApiResponse<CartView>)
    ),
    tag = "Cart"
)]
pub async fn clear_cart(CurrentCart(session): CurrentCart) -> AppResult<Json<ApiResponse<CartView>>> {
    let resp = cart_service::clear_cart(&session).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/cart/delivery-mode",
    params(("x-cart-session" = String, Header, description = "Cart session id")),
    request_body = DeliveryModeRequest,
    responses(
        (status = 200, description = "Cart with recomputed totals", body = ApiResponse<CartView>)
    ),
    tag = "Cart"
)]
pub async fn set_delivery_mode(
    CurrentCart(session): CurrentCart,
    Json(payload): Json<DeliveryModeRequest>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let resp = cart_service::set_delivery_mode(&session, payload).await?;
    Ok(Json(resp))
}
