use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    cart::{CarouselItem, ColorGroup, Selection},
    models::{Product, ProductVariant},
};

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductSummary {
    #[serde(flatten)]
    pub product: Product,
    pub display_price: i64,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProductList {
    #[schema(value_type = Vec<ProductSummary>)]
    pub items: Vec<ProductSummary>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductDetail {
    pub product: Product,
    pub display_price: i64,
    pub colors: Vec<ColorGroup>,
    pub carousel: Vec<CarouselItem>,
    #[serde(flatten)]
    pub selection: SelectionView,
}

/// A resolved colour/length choice.
#[derive(Debug, Serialize, ToSchema)]
pub struct SelectionView {
    pub selection: Selection,
    pub lengths: Vec<i32>,
    pub current_variant: Option<ProductVariant>,
    /// Current variant's price, else the product's display price.
    pub active_price: i64,
    pub can_add_to_cart: bool,
}
