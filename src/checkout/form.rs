use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::{
    cart::CartLine,
    models::{Country, DeliveryMode},
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutForm {
    pub full_name: String,
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub country: Country,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Your cart is empty")]
    EmptyCart,

    #[error("Full name and phone are required")]
    MissingContact,

    #[error("Region, city and address are required for delivery")]
    MissingAddress,

    #[error("Unknown region {region} for {country}")]
    UnknownRegion { region: String, country: String },

    #[error("A cart line has no variant, go back to the cart and try again")]
    MissingVariant,
}

/// Checks the form against the delivery mode and the cart, first failure wins.
pub fn validate(
    form: &CheckoutForm,
    mode: DeliveryMode,
    lines: &[CartLine],
) -> Result<(), ValidationError> {
    if lines.is_empty() {
        return Err(ValidationError::EmptyCart);
    }

    if form.full_name.trim().is_empty() || form.phone.trim().is_empty() {
        return Err(ValidationError::MissingContact);
    }

    if mode == DeliveryMode::Delivery {
        if form.region.trim().is_empty()
            || form.city.trim().is_empty()
            || form.address.trim().is_empty()
        {
            return Err(ValidationError::MissingAddress);
        }
        let region = form.region.trim();
        if !form.country.regions().contains(&region) {
            return Err(ValidationError::UnknownRegion {
                region: region.to_string(),
                country: form.country.as_str().to_string(),
            });
        }
    }

    if lines.iter().any(|l| l.variant.id <= 0) {
        return Err(ValidationError::MissingVariant);
    }

    Ok(())
}

/// Digits only, dial code stripped if typed, then the country's `+code` prefix.
pub fn normalize_phone(country: Country, raw: &str) -> String {
    let code = country.dial_code();
    let code_digits = code.trim_start_matches('+');
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    let local = digits.strip_prefix(code_digits).unwrap_or(&digits);
    format!("{code}{local}")
}

pub(crate) fn trimmed_or_none(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}
