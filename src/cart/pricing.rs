use serde::Serialize;
use utoipa::ToSchema;

use crate::models::DeliveryMode;

/// Subtotal (FCFA) from which home delivery is free.
pub const FREE_DELIVERY_THRESHOLD: i64 = 50_000;
/// Flat home delivery fee (FCFA) below the threshold.
pub const DELIVERY_FEE: i64 = 2_000;

pub fn delivery_fee(mode: DeliveryMode, subtotal: i64) -> i64 {
    match mode {
        DeliveryMode::Pickup => 0,
        DeliveryMode::Delivery if subtotal >= FREE_DELIVERY_THRESHOLD => 0,
        DeliveryMode::Delivery => DELIVERY_FEE,
    }
}

pub fn grand_total(mode: DeliveryMode, subtotal: i64) -> i64 {
    subtotal + delivery_fee(mode, subtotal)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct Totals {
    pub subtotal: i64,
    pub delivery_fee: i64,
    pub grand_total: i64,
}

impl Totals {
    pub fn compute(mode: DeliveryMode, subtotal: i64) -> Self {
        let fee = delivery_fee(mode, subtotal);
        Self {
            subtotal,
            delivery_fee: fee,
            grand_total: subtotal + fee,
        }
    }
}

/// Formats an amount the way the shop prints prices, e.g. `12 500 FCFA`.
pub fn format_fcfa(amount: i64) -> String {
    let digits = amount.max(0).to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 * 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('\u{202f}');
        }
        grouped.push(c);
    }
    format!("{grouped} FCFA")
}
