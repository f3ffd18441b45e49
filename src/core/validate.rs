//! Field-level input checks shared by the tour and booking services.
//!
//! Each helper returns [`Error::Validation`] naming the offending field.

use crate::errors::{Error, Result};
use rust_decimal::{Decimal, RoundingStrategy};

/// Longest accepted value for short text fields.
pub const MAX_TEXT_LEN: usize = 255;

/// Trims `value` and requires it to be non-empty and at most `MAX_TEXT_LEN` characters.
pub fn required_text(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(format!("{field} is required")));
    }
    if trimmed.chars().count() > MAX_TEXT_LEN {
        return Err(Error::validation(format!(
            "{field} may not be longer than {MAX_TEXT_LEN} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Like [`required_text`] but blank input maps to `None`.
pub fn optional_text(field: &str, value: Option<String>) -> Result<Option<String>> {
    match value {
        Some(text) if !text.trim().is_empty() => required_text(field, &text).map(Some),
        _ => Ok(None),
    }
}

/// Blank free text maps to `None`; no length limit.
#[must_use]
pub fn optional_long_text(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

/// Minimal shape check for an email address.
pub fn email(value: &str) -> Result<String> {
    let email = required_text("email", value)?;
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(Error::validation("email must be a valid email address")),
    }
}

/// Requires a non-negative amount and rounds it to cents.
pub fn amount(field: &str, value: Decimal) -> Result<Decimal> {
    if value < Decimal::ZERO {
        return Err(Error::validation(format!(
            "{field} must be a non-negative number"
        )));
    }
    Ok(round_cents(value))
}

/// Rounds a currency amount to two decimal places, halves away from zero.
#[must_use]
pub fn round_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Trims `value` and requires its length to fall within `min..=max` characters.
pub fn text_between(field: &str, value: &str, min: usize, max: usize) -> Result<String> {
    let trimmed = value.trim();
    let len = trimmed.chars().count();
    if len == 0 {
        return Err(Error::validation(format!("{field} is required")));
    }
    if !(min..=max).contains(&len) {
        return Err(Error::validation(format!(
            "{field} must be between {min} and {max} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Requires `value >= min`.
pub fn at_least(field: &str, value: i32, min: i32) -> Result<i32> {
    if value < min {
        return Err(Error::validation(format!("{field} must be at least {min}")));
    }
    Ok(value)
}
