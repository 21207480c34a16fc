//! Network write-path error types
//!
//! Wraps hierarchy violations together with attribute validation and lookup
//! failures so callers can report which field to correct.

use rust_decimal::Decimal;
use serde_json::{json, Value};
use thiserror::Error;

use super::HierarchyError;

/// Errors returned by the network node and product services
#[derive(Error, Debug)]
pub enum NetworkError {
    /// Supplier chain rule violated
    #[error(transparent)]
    Hierarchy(#[from] HierarchyError),

    /// Debt below zero
    #[error("Debt to supplier cannot be negative (got {0})")]
    NegativeDebt(Decimal),

    /// Node not found by ID
    #[error("Network node {0} not found")]
    NodeNotFound(i32),

    /// Product not found by ID
    #[error("Product {0} not found")]
    ProductNotFound(i32),

    /// Attribute validation failed
    #[error("Invalid {field}: {message}")]
    Validation {
        /// Request field that failed
        field: &'static str,
        /// Human readable reason
        message: String,
    },

    /// Database operation failed
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

impl NetworkError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        NetworkError::Validation {
            field,
            message: message.into(),
        }
    }

    /// Check if this is a client error (400-series)
    pub fn is_client_error(&self) -> bool {
        match self {
            NetworkError::Hierarchy(err) => err.is_client_error(),
            NetworkError::Database(_) => false,
            _ => true,
        }
    }

    /// Check if this is a not found error (404)
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            NetworkError::NodeNotFound(_) | NetworkError::ProductNotFound(_)
        )
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            NetworkError::Hierarchy(err) => err.error_code(),
            NetworkError::NegativeDebt(_) => "NEGATIVE_DEBT",
            NetworkError::NodeNotFound(_) | NetworkError::ProductNotFound(_) => "NOT_FOUND",
            NetworkError::Validation { .. } => "VALIDATION_FAILED",
            NetworkError::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Request field the error is keyed by
    pub fn field(&self) -> &'static str {
        match self {
            NetworkError::Hierarchy(err) => err.field(),
            NetworkError::NegativeDebt(_) => "debt_to_supplier",
            NetworkError::Validation { field, .. } => field,
            NetworkError::NodeNotFound(_)
            | NetworkError::ProductNotFound(_)
            | NetworkError::Database(_) => "non_field_errors",
        }
    }

    /// Structured body for callers: `{"<field>": ["message"], "code": "..."}`
    pub fn to_field_errors(&self) -> Value {
        let mut body = serde_json::Map::new();
        body.insert(self.field().to_string(), json!([self.to_string()]));
        body.insert("code".to_string(), json!(self.error_code()));
        Value::Object(body)
    }
}
