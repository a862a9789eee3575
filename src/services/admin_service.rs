use uuid::Uuid;

use crate::{
    dto::orders::{OrderList, OrderWithItems, UpdateOrderStatusRequest},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Order,
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    services::order_service::{ORDER_STATUSES, OrderFilter},
    state::AppState,
};

pub async fn list_all_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = query.pagination().normalize();

    let filter = OrderFilter {
        user_id: None,
        q: query.q,
        status: query.status,
        limit,
        offset,
        oldest_first: matches!(query.sort_order, Some(SortOrder::Asc)),
    };
    let (items, total) = state.orders.list_orders(filter).await?;

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Orders", OrderList { items }, Some(meta)))
}

pub async fn get_order_admin(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    ensure_admin(user)?;
    let data = state.orders.get_order(id).await?.ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Order found", data, Some(Meta::empty())))
}

pub async fn update_order_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_admin(user)?;
    let status = payload.status.trim().to_ascii_lowercase();
    validate_order_status(&status)?;

    let order = state
        .orders
        .update_status(id, status, Some(user.user_id))
        .await?
        .ok_or(AppError::NotFound)?;

    tracing::info!(order_id = %order.id, status = %order.status, admin = %user.user_id, "order status updated");
    Ok(ApiResponse::success("Order updated", order, Some(Meta::empty())))
}

fn validate_order_status(status: &str) -> Result<(), AppError> {
    if ORDER_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(AppError::BadRequest("Invalid order status".into()))
    }
}
