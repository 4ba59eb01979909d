use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;

use crate::error::{AppError, AppResult};

static PHONE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9][0-9 ()\-]{5,18}[0-9]$").unwrap());

pub fn validate_phone(phone: &str) -> bool {
    PHONE_REGEX.is_match(phone)
}

pub fn sanitize_string(input: &str) -> String {
    input.trim().to_string()
}

/// Required text must hold something besides whitespace.
pub fn ensure_not_blank(field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        Err(AppError::Validation(format!("{} is required", field)))
    } else {
        Ok(())
    }
}

/// Checks `value` fits a `NUMERIC(precision, scale)` column without rounding.
pub fn ensure_precision(field: &str, value: Decimal, precision: u32, scale: u32) -> AppResult<()> {
    let limit = Decimal::from(10u64.pow(precision - scale));
    if value.normalize().scale() > scale {
        Err(AppError::Validation(format!(
            "{} allows at most {} decimal places",
            field, scale
        )))
    } else if value.abs() >= limit {
        Err(AppError::Validation(format!(
            "{} must be less than {}",
            field, limit
        )))
    } else {
        Ok(())
    }
}

pub fn ensure_money(field: &str, value: Decimal) -> AppResult<()> {
    ensure_precision(field, value, 12, 2)
}

pub fn ensure_positive(field: &str, value: Decimal) -> AppResult<()> {
    if value > Decimal::ZERO {
        Ok(())
    } else {
        Err(AppError::Validation(format!("{} must be greater than 0", field)))
    }
}

pub fn ensure_non_negative(field: &str, value: Decimal) -> AppResult<()> {
    if value >= Decimal::ZERO {
        Ok(())
    } else {
        Err(AppError::Validation(format!("{} cannot be negative", field)))
    }
}

pub fn ensure_lease_order(start: NaiveDate, end: NaiveDate) -> AppResult<()> {
    if start < end {
        Ok(())
    } else {
        Err(AppError::Validation(
            "Lease start must be before lease end".to_string(),
        ))
    }
}

pub fn ensure_contact_phone(phone: Option<&str>) -> AppResult<()> {
    match phone {
        Some(phone) if !validate_phone(phone) => Err(AppError::Validation(format!(
            "Invalid phone number: {}",
            phone
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("+1 (555) 123-4567"));
        assert!(validate_phone("5551234567"));
        assert!(!validate_phone("call me"));
        assert!(!validate_phone("+12"));
    }

    #[test]
    fn test_amount_bounds() {
        assert!(ensure_positive("rent", Decimal::ONE).is_ok());
        assert!(ensure_positive("rent", Decimal::ZERO).is_err());
        assert!(ensure_non_negative("amount", Decimal::ZERO).is_ok());
        assert!(ensure_non_negative("amount", Decimal::NEGATIVE_ONE).is_err());
    }

    #[test]
    fn test_blank_text() {
        assert!(ensure_not_blank("Unit", "4B").is_ok());
        assert!(ensure_not_blank("Unit", "   ").is_err());
        assert!(ensure_not_blank("Unit", "").is_err());
    }

    #[test]
    fn test_precision_matches_columns() {
        assert!(ensure_money("rent", Decimal::new(123_456, 2)).is_ok());
        assert!(ensure_money("rent", Decimal::new(1_000, 3)).is_ok());
        assert!(ensure_money("rent", Decimal::new(12_345, 3)).is_err());
        assert!(ensure_money("rent", Decimal::from(10_000_000_000u64)).is_err());
        assert!(ensure_precision("bathrooms", Decimal::new(15, 1), 4, 1).is_ok());
        assert!(ensure_precision("bathrooms", Decimal::from(1000), 4, 1).is_err());
    }

    #[test]
    fn test_lease_order() {
        let jan = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let dec = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        assert!(ensure_lease_order(jan, dec).is_ok());
        assert!(ensure_lease_order(dec, jan).is_err());
        assert!(ensure_lease_order(jan, jan).is_err());
    }

    #[test]
    fn test_sanitize_string() {
        assert_eq!(sanitize_string("  Unit 4B "), "Unit 4B");
    }
}
