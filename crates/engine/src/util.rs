//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation and mapping logic so the engine enforces consistent invariants.

use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

use crate::{EngineError, MoneyCents, ResultEngine};

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::InvalidId(format!("invalid {label} id")))
}

/// Trim and NFC-normalize a text field, enforcing a length range in chars.
pub(crate) fn normalize_text(
    value: &str,
    label: &str,
    min_len: usize,
    max_len: Option<usize>,
) -> ResultEngine<String> {
    let normalized: String = value.trim().nfc().collect();
    let len = normalized.chars().count();
    if len < min_len {
        return Err(EngineError::InvalidArgument(format!(
            "{label} must be at least {min_len} characters"
        )));
    }
    if let Some(max_len) = max_len
        && len > max_len
    {
        return Err(EngineError::InvalidArgument(format!(
            "{label} must be at most {max_len} characters"
        )));
    }
    Ok(normalized)
}

pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.nfc().collect())
}

/// Emails are compared case-insensitively; store them lowercased.
pub(crate) fn normalize_email(value: &str) -> ResultEngine<String> {
    let email = value.trim().to_lowercase();
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !valid {
        return Err(EngineError::InvalidArgument(format!(
            "invalid email: {value}"
        )));
    }
    Ok(email)
}

/// Prices and totals must be strictly positive.
pub(crate) fn require_positive(amount: MoneyCents, label: &str) -> ResultEngine<()> {
    if !amount.is_positive() {
        return Err(EngineError::InvalidArgument(format!("{label} must be > 0")));
    }
    Ok(())
}
