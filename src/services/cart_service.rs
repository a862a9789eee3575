use uuid::Uuid;

use crate::{
    cart::CartSession,
    dto::cart::{
        AddToCartRequest, CartSessionCreated, CartView, DeliveryModeRequest,
        UpdateQuantityRequest, floor_quantity,
    },
    error::{AppError, AppResult},
    models::VariantId,
    response::{ApiResponse, Meta},
    state::AppState,
};

fn cart_response(message: &str, view: CartView) -> ApiResponse<CartView> {
    ApiResponse::success(message, view, Some(Meta::empty()))
}

pub async fn create_session(state: &AppState) -> AppResult<ApiResponse<CartSessionCreated>> {
    let session_id = Uuid::new_v4().to_string();
    state.carts.get_or_create(&session_id)?;
    tracing::debug!(session = %session_id, "cart session minted");

    Ok(ApiResponse::success(
        "Cart session created",
        CartSessionCreated { session_id },
        Some(Meta::empty()),
    ))
}

pub async fn get_cart(session: &CartSession) -> AppResult<ApiResponse<CartView>> {
    Ok(cart_response("Cart", session.snapshot()?.into()))
}

/// Reads the product and variant fresh from the catalog, then adds them.
/// An unavailable variant leaves the cart untouched.
pub async fn add_item(
    state: &AppState,
    session: &CartSession,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartView>> {
    let product = state
        .catalog
        .get_product(payload.product_id)
        .await?
        .filter(|p| p.is_active)
        .ok_or(AppError::NotFound)?;

    let variant = state
        .catalog
        .get_variant(payload.variant_id)
        .await?
        .ok_or(AppError::NotFound)?;

    if variant.product_id != product.id {
        return Err(AppError::BadRequest(
            "Variant does not belong to this product".into(),
        ));
    }

    let quantity = payload.quantity.map(floor_quantity).unwrap_or(1);
    let snapshot = session.update(|cart| cart.add_to_cart(&product, &variant, quantity))?;
    Ok(cart_response("Added to cart", snapshot.into()))
}

pub async fn update_item(
    session: &CartSession,
    variant_id: VariantId,
    payload: UpdateQuantityRequest,
) -> AppResult<ApiResponse<CartView>> {
    let quantity = floor_quantity(payload.quantity);
    let snapshot = session.update(|cart| cart.update_quantity(variant_id, quantity))?;
    Ok(cart_response("Cart updated", snapshot.into()))
}

pub async fn remove_item(
    session: &CartSession,
    variant_id: VariantId,
) -> AppResult<ApiResponse<CartView>> {
    let snapshot = session.update(|cart| cart.remove_from_cart(variant_id))?;
    Ok(cart_response("Removed from cart", snapshot.into()))
}

pub async fn clear_cart(session: &CartSession) -> AppResult<ApiResponse<CartView>> {
    let snapshot = session.update(|cart| cart.clear_cart())?;
    Ok(cart_response("Cart cleared", snapshot.into()))
}

pub async fn set_delivery_mode(
    session: &CartSession,
    payload: DeliveryModeRequest,
) -> AppResult<ApiResponse<CartView>> {
    let snapshot = session.update(|cart| cart.set_delivery_mode(payload.mode))?;
    Ok(cart_response("Delivery mode updated", snapshot.into()))
}
