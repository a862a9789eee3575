pub mod pricing;
pub mod session;
pub mod store;
pub mod variants;

pub use pricing::{Totals, delivery_fee, grand_total};
pub use session::{CartSession, CartSessions, SubmissionGuard};
pub use store::{CartLine, CartSnapshot, CartStore};
pub use variants::{CarouselItem, ColorGroup, Selection, VariantIndex};
