use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::{
        cart::CartView,
        orders::{OrderList, OrderWithItems},
    },
    error::AppResult,
    middleware::{auth::AuthUser, session::CurrentCart},
    response::ApiResponse,
    services::account_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_my_orders))
        .route("/orders/{id}", get(get_my_order))
        .route("/orders/{id}/items/{item_id}/reorder", post(reorder_item))
}

#[utoipa::path(
    get,
    path = "/api/account/orders",
    responses(
        (status = 200, description = "Latest 50 orders of the current user", body = ApiResponse<OrderList>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Account"
)]
pub async fn list_my_orders(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = account_service::list_my_orders(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/account/orders/{id}",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order with its items", body = ApiResponse<OrderWithItems>),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Account"
)]
pub async fn get_my_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let resp = account_service::get_my_order(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/account/orders/{id}/items/{item_id}/reorder",
    params(
        ("id" = Uuid, Path, description = "Order ID"),
        ("item_id" = Uuid, Path, description = "Order item ID"),
        ("x-cart-session" = String, Header, description = "Cart session id")
    ),
    responses(
        (status = 200, description = "Cart after the re-add", body = ApiResponse<CartView>),
        (status = 400, description = "Product unavailable or out of stock"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Account"
)]
pub async fn reorder_item(
    State(state): State<AppState>,
    user: AuthUser,
    CurrentCart(session): CurrentCart,
    Path((id, item_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let resp = account_service::reorder_item(&state, &user, &session, id, item_id).await?;
    Ok(Json(resp))
}
