use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;

use crate::errors::{NetworkError, NetworkResult};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s.]+$").expect("email regex is valid")
});

/// Largest amount a `DECIMAL(12, 2)` debt column holds
pub fn max_debt() -> Decimal {
    Decimal::new(999_999_999_999, 2)
}

/// Field validation for the node and product write paths
pub struct ValidationService;

impl ValidationService {
    /// Trim and bound a required text field
    pub fn validate_required(field: &'static str, value: &str, max_len: usize) -> NetworkResult<String> {
        let trimmed = value.trim();

        if trimmed.is_empty() {
            return Err(NetworkError::validation(field, "This field is required"));
        }

        if trimmed.chars().count() > max_len {
            return Err(NetworkError::validation(
                field,
                format!("Too long (max {} characters)", max_len),
            ));
        }

        Ok(trimmed.to_string())
    }

    pub fn validate_node_name(name: &str) -> NetworkResult<String> {
        Self::validate_required("name", name, 255)
    }

    /// Email may be blank; otherwise it must look like an address
    pub fn validate_email(email: &str) -> NetworkResult<String> {
        let trimmed = email.trim();

        if trimmed.is_empty() {
            return Ok(String::new());
        }

        if trimmed.len() > 254 {
            return Err(NetworkError::validation("email", "Too long (max 254 characters)"));
        }

        if !EMAIL_RE.is_match(trimmed) {
            return Err(NetworkError::validation("email", "Enter a valid email address"));
        }

        Ok(trimmed.to_string())
    }

    pub fn validate_country(country: &str) -> NetworkResult<String> {
        Self::validate_required("country", country, 100)
    }

    pub fn validate_city(city: &str) -> NetworkResult<String> {
        Self::validate_required("city", city, 100)
    }

    pub fn validate_street(street: &str) -> NetworkResult<String> {
        Self::validate_required("street", street, 255)
    }

    pub fn validate_house_number(house_number: &str) -> NetworkResult<String> {
        Self::validate_required("house_number", house_number, 5)
    }

    /// Debt must be non-negative; stored with two decimal places
    pub fn validate_debt(debt: Decimal) -> NetworkResult<Decimal> {
        if debt.is_sign_negative() && !debt.is_zero() {
            return Err(NetworkError::NegativeDebt(debt));
        }

        let debt = debt.round_dp(2);
        if debt > max_debt() {
            return Err(NetworkError::validation(
                "debt_to_supplier",
                format!("Ensure there are no more than 12 digits in total (max {})", max_debt()),
            ));
        }

        Ok(debt)
    }

    pub fn validate_product_name(name: &str) -> NetworkResult<String> {
        Self::validate_required("name", name, 255)
    }

    pub fn validate_product_model(model: &str) -> NetworkResult<String> {
        Self::validate_required("model", model, 255)
    }
}
