//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation and mapping logic so the engine enforces consistent invariants.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{EngineError, Money, ResultEngine};

/// Generate a fresh opaque identifier.
pub(crate) fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Reject empty identifiers and return the trimmed value.
pub(crate) fn require_id(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidId(format!("{label} id is empty")));
    }
    Ok(trimmed.to_string())
}

/// Reject blank names and return the trimmed value.
pub(crate) fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidName(format!(
            "{label} name must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

/// Case-insensitive comparison key for names.
pub(crate) fn name_key(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Positive-amount gate used before touching any balance.
pub(crate) fn require_positive(amount: Money, label: &str) -> ResultEngine<Money> {
    amount
        .normalize()
        .ok_or_else(|| EngineError::InvalidAmount(format!("{label} must be > 0, got {amount}")))
}

/// The "unset" date: `0001-01-01` and anything before it.
pub(crate) fn require_date(date: NaiveDate) -> ResultEngine<NaiveDate> {
    match NaiveDate::from_ymd_opt(1, 1, 1) {
        Some(unset) if date > unset => Ok(date),
        _ => Err(EngineError::InvalidDate(format!("operation date {date} is not set"))),
    }
}

/// `lhs + rhs` on balances and totals. Overflow fails the unit of work
/// instead of wrapping or panicking.
pub(crate) fn checked_sum(lhs: Money, rhs: Money, label: &str) -> ResultEngine<Money> {
    lhs.checked_add(rhs)
        .ok_or_else(|| EngineError::InvalidAmount(format!("{label} overflow")))
}

/// Parse a stored decimal string back into `Money`.
pub(crate) fn parse_stored_money(value: &str, label: &str) -> ResultEngine<Money> {
    value
        .parse()
        .map_err(|_| EngineError::InvalidAmount(format!("invalid stored {label}: {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_values_are_rejected() {
        assert!(require_id("  ", "account").is_err());
        assert!(normalize_required_name("\t", "account").is_err());
        assert_eq!(normalize_required_name(" Cash ", "account").unwrap(), "Cash");
    }

    #[test]
    fn sums_past_the_decimal_range_fail() {
        let huge: Money = "50000000000000000000000000000".parse().unwrap();
        let err = checked_sum(huge, huge, "balance").unwrap_err();
        assert_eq!(err, EngineError::InvalidAmount("balance overflow".to_string()));
        assert_eq!(checked_sum(huge, -huge, "balance").unwrap(), Money::ZERO);
    }

    #[test]
    fn unset_date_is_rejected() {
        let unset = NaiveDate::from_ymd_opt(1, 1, 1).unwrap();
        assert!(require_date(unset).is_err());
        let real = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(require_date(real).unwrap(), real);
    }
}
