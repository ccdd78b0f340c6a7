//! Field-level sanity checks applied before an edit leaves the client.

use shared::{
    domain::{ProductField, ProductId},
    protocol::FieldEdit,
};

use crate::error::ValidationError;

pub fn validate_edit(id: &ProductId, edit: &FieldEdit) -> Result<(), ValidationError> {
    if id.is_empty() {
        return Err(ValidationError::MissingId);
    }
    match edit {
        FieldEdit::Price(value) if !value.is_finite() || *value < 0.0 => {
            Err(ValidationError::InvalidPrice { value: *value })
        }
        FieldEdit::Image(value) if !value.starts_with("http") => {
            Err(ValidationError::NonHttpImage {
                value: value.clone(),
            })
        }
        _ => Ok(()),
    }
}

/// Strips everything but digits and `.` from `raw` and parses the leading
/// `digits[.digits]` run, so `"₹1,234.50abc"` yields `1234.5`.
pub fn normalize_price_input(raw: &str) -> Result<f64, ValidationError> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    let mut number = String::with_capacity(cleaned.len());
    let mut seen_point = false;
    for c in cleaned.chars() {
        if c == '.' {
            if seen_point {
                break;
            }
            seen_point = true;
        }
        number.push(c);
    }

    if !number.chars().any(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidPriceInput {
            raw: raw.to_string(),
        });
    }
    number
        .parse::<f64>()
        .map_err(|_| ValidationError::InvalidPriceInput {
            raw: raw.to_string(),
        })
}

/// Integer parsing with `parseInt` leniency: leading whitespace, an optional
/// sign, then as many digits as are present. `"12.9"` gives `12`.
pub fn parse_leading_integer(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let magnitude = digits.parse::<i64>().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Builds the edit an inline region produces when it loses focus.
pub fn edit_from_text(field: ProductField, raw: &str) -> Result<FieldEdit, ValidationError> {
    let text = raw.trim();
    match field {
        ProductField::Name => Ok(FieldEdit::Name(text.to_string())),
        ProductField::Price => normalize_price_input(text).map(FieldEdit::Price),
        ProductField::Image => Ok(FieldEdit::Image(text.to_string())),
        ProductField::SortOrder => parse_leading_integer(text)
            .map(FieldEdit::SortOrder)
            .ok_or_else(|| ValidationError::InvalidInteger {
                field,
                raw: raw.to_string(),
            }),
    }
}

#[cfg(test)]
#[path = "tests/validate_tests.rs"]
mod tests;
