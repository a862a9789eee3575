use uuid::Uuid;

use crate::{
    cart::CartSession,
    dto::{
        cart::CartView,
        orders::{OrderList, OrderWithItems},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    response::{ApiResponse, Meta},
    services::order_service::OrderFilter,
    state::AppState,
};

const ACCOUNT_ORDER_LIMIT: i64 = 50;

pub async fn list_my_orders(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<OrderList>> {
    let filter = OrderFilter {
        user_id: Some(user.user_id),
        limit: ACCOUNT_ORDER_LIMIT,
        ..OrderFilter::default()
    };
    let (items, total) = state.orders.list_orders(filter).await?;

    let meta = Meta::new(1, ACCOUNT_ORDER_LIMIT, total);
    Ok(ApiResponse::success("Orders", OrderList { items }, Some(meta)))
}

pub async fn get_my_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let data = find_own_order(state, user, id).await?;
    Ok(ApiResponse::success("Order found", data, Some(Meta::empty())))
}

/// Puts one item of a past order back in the cart, at today's price and
/// capped at today's stock.
pub async fn reorder_item(
    state: &AppState,
    user: &AuthUser,
    session: &CartSession,
    order_id: Uuid,
    item_id: Uuid,
) -> AppResult<ApiResponse<CartView>> {
    let order = find_own_order(state, user, order_id).await?;
    let item = order
        .items
        .into_iter()
        .find(|i| i.id == item_id)
        .ok_or(AppError::NotFound)?;

    let product = state
        .catalog
        .get_product(item.product_id)
        .await?
        .filter(|p| p.is_active)
        .ok_or_else(|| AppError::BadRequest("This product is no longer available".into()))?;

    let variant = state
        .catalog
        .get_variant(item.variant_id)
        .await?
        .filter(|v| v.is_purchasable())
        .ok_or_else(|| AppError::BadRequest("This variant is out of stock".into()))?;

    let quantity = i64::from(item.quantity.max(1)).min(variant.available_stock());
    let snapshot = session.update(|cart| cart.add_to_cart(&product, &variant, quantity))?;

    tracing::info!(%order_id, %item_id, quantity, "item re-added to cart");
    Ok(ApiResponse::success(
        "Added to cart",
        snapshot.into(),
        Some(Meta::empty()),
    ))
}

async fn find_own_order(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<OrderWithItems> {
    state
        .orders
        .get_order(id)
        .await?
        .filter(|o| o.order.user_id == Some(user.user_id))
        .ok_or(AppError::NotFound)
}
