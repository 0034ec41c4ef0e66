//! Amount coercion for comma-decimal statements.

use rust_decimal::Decimal;
use std::str::FromStr;

use super::patterns::AMOUNT_TEXT;
use crate::error::CoercionError;
use crate::models::care::AmountField;

/// Parse a comma-decimal amount such as `"50,00"` into a non-negative decimal.
///
/// Whole numbers are accepted and widened to two fractional digits.
pub fn parse_amount(field: AmountField, raw: &str) -> Result<Decimal, CoercionError> {
    let invalid = || CoercionError::InvalidAmount {
        field,
        value: raw.to_string(),
    };

    let trimmed = raw.trim();
    if !AMOUNT_TEXT.is_match(trimmed) {
        return Err(invalid());
    }

    let mut amount = Decimal::from_str(&trimmed.replace(',', ".")).map_err(|_| invalid())?;
    if amount.is_sign_negative() {
        return Err(invalid());
    }
    if amount.scale() < 2 {
        amount.rescale(2);
    }

    Ok(amount)
}

/// Format an amount the way statements print it (`1234.5` -> `"1234,50"`).
pub fn format_amount(amount: Decimal) -> String {
    format!("{:.2}", amount).replace('.', ",")
}
