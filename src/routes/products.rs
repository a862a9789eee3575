use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};

use crate::{
    cart::Selection,
    dto::products::{ProductDetail, ProductList, SelectionView},
    error::AppResult,
    models::ProductId,
    response::ApiResponse,
    routes::params::ProductQuery,
    services::product_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products))
        .route("/{id}", get(get_product))
        .route("/{id}/selection", get(resolve_selection))
}

#[utoipa::path(
    get,
    path = "/api/products",
    params(
        ("q" = Option<String>, Query, description = "Search in name and description"),
        ("category" = Option<String>, Query, description = "Filter by category"),
    ),
    responses(
        (status = 200, description = "Active products with their display price", body = ApiResponse<ProductList>)
    ),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let resp = product_service::list_products(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(
        ("id" = i64, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product with colours, carousel and default selection", body = ApiResponse<ProductDetail>),
        (status = 404, description = "Not Found")
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> AppResult<Json<ApiResponse<ProductDetail>>> {
    let resp = product_service::get_product(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}/selection",
    params(
        ("id" = i64, Path, description = "Product ID"),
        ("color" = Option<String>, Query, description = "Selected colour key"),
        ("length" = Option<i32>, Query, description = "Selected length"),
    ),
    responses(
        (status = 200, description = "Variant for the selection", body = ApiResponse<SelectionView>),
        (status = 404, description = "Not Found")
    ),
    tag = "Products"
)]
pub async fn resolve_selection(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Query(selection): Query<Selection>,
) -> AppResult<Json<ApiResponse<SelectionView>>> {
    let resp = product_service::resolve_selection(&state, id, selection).await?;
    Ok(Json(resp))
}
