//! The staged checkout: what survives the round trip through the hosted
//! payment page, consumed once on return.

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    cart::CartLine,
    checkout::form::CheckoutForm,
    models::{DeliveryMode, PaymentMethod, ProductId, VariantId},
    storage::{ClientStorage, StorageError},
};

pub const CHECKOUT_PAYLOAD_KEY: &str = "checkout_payload_v1";

/// A cart line frozen at checkout time; the price is never recomputed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OrderLineSnapshot {
    pub product_id: ProductId,
    pub variant_id: VariantId,
    pub color: String,
    pub length: i32,
    pub quantity: i64,
    pub unit_price: i64,
}

impl From<&CartLine> for OrderLineSnapshot {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.product.id,
            variant_id: line.variant.id,
            color: line.variant.color.clone(),
            length: line.variant.length,
            quantity: line.quantity,
            unit_price: line.variant.price,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CheckoutPayload {
    pub user_id: Option<Uuid>,
    #[serde(rename = "formData")]
    pub form_data: CheckoutForm,
    #[serde(rename = "paymentMethod")]
    pub payment_method: PaymentMethod,
    #[serde(rename = "deliveryMode")]
    pub delivery_mode: DeliveryMode,
    pub items: Vec<OrderLineSnapshot>,
    #[serde(rename = "totalPrice")]
    pub total_price: i64,
}

impl CheckoutPayload {
    /// Subtotal recomputed from the item snapshot.
    pub fn items_subtotal(&self) -> i64 {
        self.items.iter().map(|i| i.unit_price * i.quantity).sum()
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct StagedEnvelope {
    staged_at: DateTime<Utc>,
    payload: CheckoutPayload,
}

/// Short-lived slot holding at most one staged payload per session.
#[derive(Debug, Clone)]
pub struct PayloadStash {
    storage: Arc<dyn ClientStorage>,
    ttl: Duration,
}

impl PayloadStash {
    pub fn new(storage: Arc<dyn ClientStorage>, ttl: Duration) -> Self {
        Self { storage, ttl }
    }

    pub fn stage(&self, payload: &CheckoutPayload) -> Result<(), StorageError> {
        let envelope = StagedEnvelope {
            staged_at: Utc::now(),
            payload: payload.clone(),
        };
        let raw = serde_json::to_string(&envelope)?;
        self.storage.set_item(CHECKOUT_PAYLOAD_KEY, &raw)
    }

    /// Reads the staged payload without consuming it. Missing, malformed and
    /// expired payloads all read as `None`; expired ones are removed.
    pub fn peek(&self) -> Option<CheckoutPayload> {
        let raw = match self.storage.get_item(CHECKOUT_PAYLOAD_KEY) {
            Ok(raw) => raw?,
            Err(err) => {
                tracing::warn!(error = %err, "staged payload unreadable");
                return None;
            }
        };

        let envelope: StagedEnvelope = match serde_json::from_str(&raw) {
            Ok(envelope) => envelope,
            Err(err) => {
                tracing::debug!(error = %err, "staged payload malformed");
                return None;
            }
        };

        let age = Utc::now().signed_duration_since(envelope.staged_at);
        let expired = age
            .to_std()
            .map(|age| age > self.ttl)
            .unwrap_or(false);
        if expired {
            tracing::info!("staged payload expired");
            self.discard();
            return None;
        }

        Some(envelope.payload)
    }

    pub fn discard(&self) {
        if let Err(err) = self.storage.remove_item(CHECKOUT_PAYLOAD_KEY) {
            tracing::warn!(error = %err, "staged payload not removed");
        }
    }
}
