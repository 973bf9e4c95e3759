//! Input validation
//!
//! Field-level validation for boundary inputs. Every check runs and every
//! failure is collected, so a response can report all bad fields at once.

use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::{Money, MoneyError, Role};

/// Upper bound on installments per plan (10 years of monthly payments)
pub const MAX_INSTALLMENT_COUNT: i64 = 120;

/// How far ahead a plan may start. Together with the count cap this keeps
/// every due date well inside chrono's supported range, so the schedule's
/// month walk cannot fail.
const MAX_START_AHEAD_MONTHS: u32 = 1200;

/// Per-field validation error map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.insert(field.to_string(), message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", field, message)?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Validated plan-creation inputs.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedPlanInput {
    pub total_amount: Money,
    pub number_of_installments: u32,
    pub start_date: NaiveDate,
}

/// Validate the plan-creation payload.
///
/// Unparseable and non-positive amounts are distinct, independently
/// reportable errors; a bad amount never short-circuits the date or
/// count checks.
pub fn validate_plan_creation(
    total_amount: &str,
    number_of_installments: i64,
    start_date: NaiveDate,
    today: NaiveDate,
) -> Result<ValidatedPlanInput, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let amount = match Decimal::from_str(total_amount.trim()) {
        Ok(value) => match Money::new(value) {
            Ok(money) => Some(money),
            Err(MoneyError::NotPositive(_)) => {
                errors.add("total_amount", "Total amount must be positive.");
                None
            }
            Err(MoneyError::TooManyDecimals(_)) => {
                errors.add("total_amount", "Total amount supports at most 2 decimal places.");
                None
            }
            Err(_) => {
                errors.add("total_amount", "Invalid value provided for total amount.");
                None
            }
        },
        Err(_) => {
            errors.add("total_amount", "Invalid value provided for total amount.");
            None
        }
    };

    if number_of_installments <= 0 {
        errors.add(
            "number_of_installments",
            "Number of installments must be a positive integer.",
        );
    } else if number_of_installments > MAX_INSTALLMENT_COUNT {
        errors.add(
            "number_of_installments",
            format!("Number of installments must not exceed {MAX_INSTALLMENT_COUNT}."),
        );
    }

    if start_date < today {
        errors.add("start_date", "Start date cannot be in the past.");
    } else if start_date > start_horizon(today) {
        errors.add("start_date", "Start date is too far in the future.");
    }

    match amount {
        Some(total_amount) if errors.is_empty() => Ok(ValidatedPlanInput {
            total_amount,
            number_of_installments: number_of_installments as u32,
            start_date,
        }),
        _ => Err(errors),
    }
}

/// Latest acceptable start date for a plan created today.
fn start_horizon(today: NaiveDate) -> NaiveDate {
    today
        .checked_add_months(Months::new(MAX_START_AHEAD_MONTHS))
        .unwrap_or(NaiveDate::MAX)
}

/// Validated registration inputs.
#[derive(Debug, Clone)]
pub struct ValidatedRegistration {
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// Validate the registration payload.
pub fn validate_registration(
    email: &str,
    password: &str,
    role: &str,
) -> Result<ValidatedRegistration, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let email = email.trim();
    if email.is_empty() || !email.contains('@') {
        errors.add("email", "A valid email address is required.");
    }

    if password.len() < 8 {
        errors.add("password", "Password must be at least 8 characters.");
    }

    let role = match role.parse::<Role>() {
        Ok(role) => Some(role),
        Err(_) => {
            errors.add("role", "Role must be one of: merchant, user, staff.");
            None
        }
    };

    match role {
        Some(role) if errors.is_empty() => Ok(ValidatedRegistration {
            email: email.to_string(),
            password: password.to_string(),
            role,
        }),
        _ => Err(errors),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    const TODAY: fn() -> NaiveDate = || date(2025, 4, 26);

    #[test]
    fn test_valid_plan_input() {
        let input = validate_plan_creation("1000.00", 4, date(2025, 5, 1), TODAY()).unwrap();
        assert_eq!(input.total_amount.value(), dec!(1000.00));
        assert_eq!(input.number_of_installments, 4);
    }

    #[test]
    fn test_start_date_today_allowed() {
        let result = validate_plan_creation("100.00", 2, TODAY(), TODAY());
        assert!(result.is_ok());
    }

    #[test]
    fn test_unparseable_amount() {
        let errors = validate_plan_creation("abc", 4, date(2025, 5, 1), TODAY()).unwrap_err();
        assert_eq!(
            errors.get("total_amount"),
            Some("Invalid value provided for total amount.")
        );
    }

    #[test]
    fn test_non_positive_amount() {
        let errors = validate_plan_creation("-5.00", 4, date(2025, 5, 1), TODAY()).unwrap_err();
        assert_eq!(errors.get("total_amount"), Some("Total amount must be positive."));

        let errors = validate_plan_creation("0", 4, date(2025, 5, 1), TODAY()).unwrap_err();
        assert_eq!(errors.get("total_amount"), Some("Total amount must be positive."));
    }

    #[test]
    fn test_bad_amount_does_not_mask_other_errors() {
        let errors = validate_plan_creation("abc", 0, date(2025, 1, 1), TODAY()).unwrap_err();
        let fields: Vec<&str> = errors.fields().collect();
        assert_eq!(
            fields,
            vec!["number_of_installments", "start_date", "total_amount"]
        );
    }

    #[test]
    fn test_zero_installments_rejected() {
        let errors = validate_plan_creation("100.00", 0, date(2025, 5, 1), TODAY()).unwrap_err();
        assert_eq!(
            errors.get("number_of_installments"),
            Some("Number of installments must be a positive integer.")
        );
    }

    #[test]
    fn test_count_above_max_rejected() {
        let errors =
            validate_plan_creation("100.00", MAX_INSTALLMENT_COUNT + 1, date(2025, 5, 1), TODAY())
                .unwrap_err();
        assert_eq!(
            errors.get("number_of_installments"),
            Some("Number of installments must not exceed 120.")
        );

        let result =
            validate_plan_creation("100.00", MAX_INSTALLMENT_COUNT, date(2025, 5, 1), TODAY());
        assert!(result.is_ok());
    }

    #[test]
    fn test_far_future_start_date_rejected() {
        // An extreme but parseable date must be a field error, never a
        // panic further down in the schedule's month arithmetic
        let errors = validate_plan_creation("100.00", 2, NaiveDate::MAX, TODAY()).unwrap_err();
        assert_eq!(
            errors.get("start_date"),
            Some("Start date is too far in the future.")
        );

        let errors =
            validate_plan_creation("100.00", 2, date(2200, 1, 1), TODAY()).unwrap_err();
        assert_eq!(
            errors.get("start_date"),
            Some("Start date is too far in the future.")
        );
    }

    #[test]
    fn test_start_date_within_horizon_accepted() {
        let result = validate_plan_creation("100.00", 2, date(2030, 1, 1), TODAY());
        assert!(result.is_ok());
    }

    #[test]
    fn test_past_start_date_rejected() {
        let errors = validate_plan_creation("100.00", 2, date(2025, 4, 25), TODAY()).unwrap_err();
        assert_eq!(errors.get("start_date"), Some("Start date cannot be in the past."));
    }

    #[test]
    fn test_registration_valid() {
        let input = validate_registration("alice@example.com", "password123", "merchant").unwrap();
        assert_eq!(input.role, Role::Merchant);
        assert_eq!(input.email, "alice@example.com");
    }

    #[test]
    fn test_registration_collects_all_errors() {
        let errors = validate_registration("not-an-email", "short", "admin").unwrap_err();
        let fields: Vec<&str> = errors.fields().collect();
        assert_eq!(fields, vec!["email", "password", "role"]);
    }
}
