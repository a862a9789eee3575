use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

pub type ProductId = i64;
pub type VariantId = i64;

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub base_price_min: Option<i64>,
    pub original_price: Option<i64>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub details: Vec<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl Product {
    /// Shop price: cheapest variant, else the reference price, else 0.
    pub fn display_price(&self) -> i64 {
        self.base_price_min.or(self.original_price).unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProductVariant {
    pub id: VariantId,
    pub product_id: ProductId,
    pub color: String,
    pub color_hex: Option<String>,
    pub length: i32,
    pub price: i64,
    pub stock_count: Option<i32>,
    pub sku: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub medias: Vec<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl ProductVariant {
    /// Units on hand; a missing or negative count means none.
    pub fn available_stock(&self) -> i64 {
        i64::from(self.stock_count.unwrap_or(0).max(0))
    }

    pub fn is_purchasable(&self) -> bool {
        self.is_active && self.available_stock() > 0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMode {
    #[default]
    Delivery,
    Pickup,
}

impl DeliveryMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryMode::Delivery => "delivery",
            DeliveryMode::Pickup => "pickup",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "delivery" => Some(DeliveryMode::Delivery),
            "pickup" => Some(DeliveryMode::Pickup),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Mobile,
    Card,
    Cash,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Mobile => "mobile",
            PaymentMethod::Card => "card",
            PaymentMethod::Cash => "cash",
        }
    }

    /// Mobile money and card both go through the hosted checkout.
    pub fn uses_gateway(&self) -> bool {
        !matches!(self, PaymentMethod::Cash)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Country {
    #[default]
    Togo,
    Benin,
}

const TOGO_REGIONS: &[&str] = &["Maritime", "Plateaux", "Centrale", "Kara", "Savanes"];

const BENIN_REGIONS: &[&str] = &[
    "Littoral",
    "Atlantique",
    "Ouémé",
    "Zou",
    "Collines",
    "Borgou",
    "Alibori",
    "Atacora",
    "Donga",
    "Mono",
    "Couffo",
    "Plateau",
];

impl Country {
    pub fn as_str(&self) -> &'static str {
        match self {
            Country::Togo => "togo",
            Country::Benin => "benin",
        }
    }

    pub fn dial_code(&self) -> &'static str {
        match self {
            Country::Togo => "+228",
            Country::Benin => "+229",
        }
    }

    pub fn regions(&self) -> &'static [&'static str] {
        match self {
            Country::Togo => TOGO_REGIONS,
            Country::Benin => BENIN_REGIONS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub full_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub country: String,
    pub region: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub payment_method: String,
    pub delivery_mode: DeliveryMode,
    pub delivery_fee: i64,
    pub total: i64,
    pub payment_provider: Option<String>,
    pub payment_id: Option<String>,
    pub payment_status: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: ProductId,
    pub variant_id: VariantId,
    pub color: Option<String>,
    pub length: Option<i32>,
    pub quantity: i32,
    pub unit_price: i64,
}

/// Order header as handed to the order store; ids and timestamps are assigned there.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub user_id: Option<Uuid>,
    pub full_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub country: String,
    pub region: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub payment_method: PaymentMethod,
    pub delivery_mode: DeliveryMode,
    pub delivery_fee: i64,
    pub total: i64,
    pub payment_provider: Option<String>,
    pub payment_id: Option<String>,
    pub payment_status: Option<String>,
    pub status: String,
}
