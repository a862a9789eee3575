//! The shopper's cart: lines keyed by variant, clamped to stock, persisted on
//! every change and observable through a watch channel.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use utoipa::ToSchema;

use crate::{
    cart::pricing::Totals,
    models::{DeliveryMode, Product, ProductVariant, VariantId},
    storage::ClientStorage,
};

pub const CART_ITEMS_KEY: &str = "cart_items_v1";
pub const DELIVERY_MODE_KEY: &str = "cart_delivery_mode_v1";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CartLine {
    pub product: Product,
    pub variant: ProductVariant,
    pub quantity: i64,
}

impl CartLine {
    pub fn line_total(&self) -> i64 {
        self.variant.price * self.quantity
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CartSnapshot {
    pub lines: Vec<CartLine>,
    pub delivery_mode: DeliveryMode,
    pub total_items: i64,
    pub total_price: i64,
}

impl CartSnapshot {
    pub fn totals(&self) -> Totals {
        Totals::compute(self.delivery_mode, self.total_price)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[derive(Debug)]
pub struct CartStore {
    storage: Arc<dyn ClientStorage>,
    lines: Vec<CartLine>,
    delivery_mode: DeliveryMode,
    updates: watch::Sender<CartSnapshot>,
}

impl CartStore {
    /// Loads both persisted keys once; unreadable data yields an empty cart.
    pub fn create(storage: Arc<dyn ClientStorage>) -> Self {
        let lines = load_lines(storage.as_ref());
        let delivery_mode = load_delivery_mode(storage.as_ref());
        let initial = snapshot_of(&lines, delivery_mode);
        let (updates, _) = watch::channel(initial);

        Self {
            storage,
            lines,
            delivery_mode,
            updates,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<CartSnapshot> {
        self.updates.subscribe()
    }

    /// Flushes the current state and closes every subscription.
    pub fn dispose(self) {
        self.persist();
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line(&self, variant_id: VariantId) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.variant.id == variant_id)
    }

    pub fn delivery_mode(&self) -> DeliveryMode {
        self.delivery_mode
    }

    pub fn total_items(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    pub fn total_price(&self) -> i64 {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn snapshot(&self) -> CartSnapshot {
        snapshot_of(&self.lines, self.delivery_mode)
    }

    /// Adds `quantity` (at least 1) of a variant, merging with an existing line.
    ///
    /// Out-of-stock or inactive variants are ignored. The merged quantity is
    /// capped at the variant's stock.
    pub fn add_to_cart(&mut self, product: &Product, variant: &ProductVariant, quantity: i64) {
        let requested = quantity.max(1);
        let stock = variant.available_stock();

        if !variant.is_purchasable() {
            tracing::debug!(variant_id = variant.id, "add ignored, variant not purchasable");
            return;
        }

        match self.lines.iter_mut().find(|l| l.variant.id == variant.id) {
            Some(line) => {
                line.quantity = stock.min(line.quantity.saturating_add(requested));
                line.product = product.clone();
                line.variant = variant.clone();
            }
            None => self.lines.push(CartLine {
                product: product.clone(),
                variant: variant.clone(),
                quantity: stock.min(requested),
            }),
        }

        self.commit();
    }

    pub fn remove_from_cart(&mut self, variant_id: VariantId) {
        let before = self.lines.len();
        self.lines.retain(|l| l.variant.id != variant_id);
        if self.lines.len() != before {
            self.commit();
        }
    }

    /// Sets a line's quantity, capped at stock; zero or less removes the line.
    pub fn update_quantity(&mut self, variant_id: VariantId, quantity: i64) {
        let Some(index) = self.lines.iter().position(|l| l.variant.id == variant_id) else {
            return;
        };

        if quantity <= 0 {
            self.lines.remove(index);
            self.commit();
            return;
        }

        let line = &mut self.lines[index];
        let mut next = line.variant.available_stock().min(quantity);
        if !line.variant.is_active {
            next = next.min(line.quantity);
        }

        if next <= 0 {
            self.lines.remove(index);
        } else {
            line.quantity = next;
        }
        self.commit();
    }

    pub fn clear_cart(&mut self) {
        self.lines.clear();
        self.delivery_mode = DeliveryMode::default();
        self.commit();
    }

    pub fn set_delivery_mode(&mut self, mode: DeliveryMode) {
        self.delivery_mode = mode;
        self.commit();
    }

    fn commit(&mut self) {
        self.persist();
        self.updates.send_replace(self.snapshot());
    }

    fn persist(&self) {
        match serde_json::to_string(&self.lines) {
            Ok(raw) => {
                if let Err(err) = self.storage.set_item(CART_ITEMS_KEY, &raw) {
                    tracing::warn!(error = %err, "cart items not persisted");
                }
            }
            Err(err) => tracing::warn!(error = %err, "cart items not serialized"),
        }

        if let Err(err) = self
            .storage
            .set_item(DELIVERY_MODE_KEY, self.delivery_mode.as_str())
        {
            tracing::warn!(error = %err, "delivery mode not persisted");
        }
    }
}

fn snapshot_of(lines: &[CartLine], delivery_mode: DeliveryMode) -> CartSnapshot {
    CartSnapshot {
        lines: lines.to_vec(),
        delivery_mode,
        total_items: lines.iter().map(|l| l.quantity).sum(),
        total_price: lines.iter().map(CartLine::line_total).sum(),
    }
}

fn load_lines(storage: &dyn ClientStorage) -> Vec<CartLine> {
    let raw = match storage.get_item(CART_ITEMS_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(err) => {
            tracing::debug!(error = %err, "cart items unreadable");
            return Vec::new();
        }
    };

    serde_json::from_str(&raw).unwrap_or_else(|err| {
        tracing::debug!(error = %err, "cart items malformed, starting empty");
        Vec::new()
    })
}

fn load_delivery_mode(storage: &dyn ClientStorage) -> DeliveryMode {
    storage
        .get_item(DELIVERY_MODE_KEY)
        .ok()
        .flatten()
        .and_then(|raw| DeliveryMode::parse(raw.trim()))
        .unwrap_or_default()
}
