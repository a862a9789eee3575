use crate::{
    cart::{Selection, VariantIndex},
    dto::products::{ProductDetail, ProductList, ProductSummary, SelectionView},
    error::{AppError, AppResult},
    models::{Product, ProductId},
    response::{ApiResponse, Meta},
    routes::params::ProductQuery,
    state::AppState,
};

pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let items: Vec<ProductSummary> = state
        .catalog
        .list_products(query)
        .await?
        .into_iter()
        .map(|product| ProductSummary {
            display_price: product.display_price(),
            product,
        })
        .collect();

    let total = items.len() as i64;
    let meta = Meta::new(1, total, total);
    Ok(ApiResponse::success("Products", ProductList { items }, Some(meta)))
}

pub async fn get_product(state: &AppState, id: ProductId) -> AppResult<ApiResponse<ProductDetail>> {
    let (product, index) = load_product(state, id).await?;
    let selection = selection_view(&product, &index, index.default_selection());

    let detail = ProductDetail {
        display_price: product.display_price(),
        colors: index.groups().to_vec(),
        carousel: index.carousel(),
        product,
        selection,
    };
    Ok(ApiResponse::success("Product", detail, None))
}

/// Resolves a colour/length choice. A colour without a length starts at that
/// colour's shortest length.
pub async fn resolve_selection(
    state: &AppState,
    id: ProductId,
    selection: Selection,
) -> AppResult<ApiResponse<SelectionView>> {
    let (product, index) = load_product(state, id).await?;

    let selection = match (&selection.color, selection.length) {
        (Some(color), None) => index.select_color(color),
        _ => selection,
    };

    let view = selection_view(&product, &index, selection);
    Ok(ApiResponse::success("Selection", view, None))
}

async fn load_product(state: &AppState, id: ProductId) -> AppResult<(Product, VariantIndex)> {
    let product = state
        .catalog
        .get_product(id)
        .await?
        .filter(|p| p.is_active)
        .ok_or(AppError::NotFound)?;
    let variants = state.catalog.list_variants(id).await?;
    Ok((product, VariantIndex::new(variants)))
}

pub fn selection_view(product: &Product, index: &VariantIndex, selection: Selection) -> SelectionView {
    let current = index.resolve(&selection).cloned();
    let lengths = selection
        .color
        .as_deref()
        .map(|c| index.lengths(c))
        .unwrap_or_default();

    SelectionView {
        active_price: current
            .as_ref()
            .map(|v| v.price)
            .unwrap_or_else(|| product.display_price()),
        can_add_to_cart: current.as_ref().is_some_and(|v| v.is_purchasable()),
        current_variant: current,
        lengths,
        selection,
    }
}
