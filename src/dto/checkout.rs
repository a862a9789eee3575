use serde::Deserialize;
use utoipa::ToSchema;

use crate::{checkout::form::CheckoutForm, models::PaymentMethod};

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub form: CheckoutForm,
    pub payment_method: PaymentMethod,
}

/// Query string the hosted checkout appends to the return url.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct PaymentReturnQuery {
    #[serde(rename = "monerooPaymentId")]
    pub payment_id: Option<String>,
    /// Informational only; the verified status decides.
    #[serde(rename = "monerooPaymentStatus")]
    pub payment_status: Option<String>,
}
