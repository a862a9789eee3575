pub mod form;
pub mod orchestrator;
pub mod payload;
pub mod reconcile;

pub use form::{CheckoutForm, ValidationError};
pub use orchestrator::{place_order, start_payment, submit_checkout};
pub use payload::{CheckoutPayload, OrderLineSnapshot, PayloadStash};
pub use reconcile::{WebhookOutcome, handle_webhook, reconcile_payment};
