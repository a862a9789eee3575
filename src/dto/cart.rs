use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    cart::{CartLine, CartSnapshot},
    models::{DeliveryMode, ProductId, VariantId},
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    pub product_id: ProductId,
    pub variant_id: VariantId,
    /// Missing means 1; fractions are floored.
    pub quantity: Option<f64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateQuantityRequest {
    pub quantity: f64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DeliveryModeRequest {
    pub mode: DeliveryMode,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartSessionCreated {
    pub session_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub lines: Vec<CartLine>,
    pub delivery_mode: DeliveryMode,
    pub total_items: i64,
    pub total_price: i64,
    pub delivery_fee: i64,
    pub grand_total: i64,
}

impl From<CartSnapshot> for CartView {
    fn from(snapshot: CartSnapshot) -> Self {
        let totals = snapshot.totals();
        Self {
            lines: snapshot.lines,
            delivery_mode: snapshot.delivery_mode,
            total_items: snapshot.total_items,
            total_price: snapshot.total_price,
            delivery_fee: totals.delivery_fee,
            grand_total: totals.grand_total,
        }
    }
}

/// Floors a quantity coming from JSON; non-finite input counts as zero.
/// Capped at the largest stock count a variant can hold.
pub fn floor_quantity(raw: f64) -> i64 {
    if raw.is_finite() {
        raw.floor().min(f64::from(i32::MAX)) as i64
    } else {
        0
    }
}
