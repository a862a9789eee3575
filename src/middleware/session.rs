use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{
    cart::{CartSession, session::is_valid_session_id},
    error::AppError,
    state::AppState,
};

pub const CART_SESSION_HEADER: &str = "x-cart-session";

/// The shopper's cart session id, taken from the `x-cart-session` header.
#[derive(Debug, Clone)]
pub struct CartSessionId(pub String);

impl<S> FromRequestParts<S> for CartSessionId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(CART_SESSION_HEADER)
            .ok_or_else(|| AppError::BadRequest("Missing x-cart-session header".into()))?
            .to_str()
            .map_err(|_| AppError::BadRequest("Invalid x-cart-session header".into()))?
            .trim();

        if !is_valid_session_id(raw) {
            return Err(AppError::BadRequest("Invalid x-cart-session header".into()));
        }

        Ok(CartSessionId(raw.to_string()))
    }
}

/// The live cart session for the request, loaded on first use.
#[derive(Debug, Clone)]
pub struct CurrentCart(pub Arc<CartSession>);

impl FromRequestParts<AppState> for CurrentCart {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CartSessionId(id) = CartSessionId::from_request_parts(parts, state).await?;
        let session = state.carts.get_or_create(&id)?;
        Ok(CurrentCart(session))
    }
}
