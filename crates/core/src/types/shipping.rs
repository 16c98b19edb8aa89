//! Shipping information with field-level validation.

use serde::{Deserialize, Serialize};

/// Validated shipping details for an order.
///
/// Construct via [`ShippingInfo::parse`]; the fields are only public so the
/// order model and invoice export can read them back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingInfo {
    pub full_name: String,
    pub address: String,
    pub phone_number: String,
}

/// Field-scoped validation messages for the shipping form.
///
/// Every field that failed carries its own user-facing message; fields that
/// passed stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShippingFieldErrors {
    pub full_name: Option<String>,
    pub address: Option<String>,
    pub phone_number: Option<String>,
}

impl ShippingFieldErrors {
    /// True when every field validated.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.full_name.is_none() && self.address.is_none() && self.phone_number.is_none()
    }
}

impl std::fmt::Display for ShippingFieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for message in [&self.full_name, &self.address, &self.phone_number]
            .into_iter()
            .flatten()
        {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{message}")?;
            first = false;
        }
        Ok(())
    }
}

impl ShippingInfo {
    /// Validate the three shipping fields.
    ///
    /// The phone number must contain at least ten digits after stripping
    /// every non-digit character; formatting (spaces, dashes, a leading `+`)
    /// is preserved as entered.
    ///
    /// # Errors
    ///
    /// Returns the per-field messages when any field fails.
    pub fn parse(
        full_name: &str,
        address: &str,
        phone_number: &str,
    ) -> Result<Self, ShippingFieldErrors> {
        let mut errors = ShippingFieldErrors::default();

        if full_name.trim().is_empty() {
            errors.full_name = Some("Full name is required".to_owned());
        }
        if address.trim().is_empty() {
            errors.address = Some("Address is required".to_owned());
        }
        if phone_number.trim().is_empty() {
            errors.phone_number = Some("Phone number is required".to_owned());
        } else {
            let digits = phone_number.chars().filter(char::is_ascii_digit).count();
            if digits < 10 {
                errors.phone_number = Some("Please enter a valid phone number".to_owned());
            }
        }

        if errors.is_empty() {
            Ok(Self {
                full_name: full_name.trim().to_owned(),
                address: address.trim().to_owned(),
                phone_number: phone_number.trim().to_owned(),
            })
        } else {
            Err(errors)
        }
    }
}
