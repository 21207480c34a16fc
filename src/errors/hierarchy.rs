//! Supplier-hierarchy error types
//!
//! Raised by the integrity engine when a proposed supplier chain would break
//! one of the structural rules of the network.
//!
//! # Examples
//!
//! ```rust
//! use supplynet::errors::HierarchyError;
//!
//! let err = HierarchyError::SelfReference { node_id: 7 };
//! assert_eq!(err.error_code(), "SELF_REFERENCE");
//! assert_eq!(err.field(), "supplier");
//! ```

use thiserror::Error;

/// Errors produced while walking or validating a supplier chain
#[derive(Error, Debug)]
pub enum HierarchyError {
    /// A node designates itself as its own supplier
    #[error("Node {node_id} cannot be its own supplier")]
    SelfReference {
        /// Node that referenced itself
        node_id: i32,
    },

    /// The supplier chain revisits a node already seen
    #[error("Supplier chain contains a cycle: node {revisited} is reached twice")]
    Cycle {
        /// Identity that was reached a second time
        revisited: i32,
    },

    /// The chain would exceed the maximum number of hops to a root
    #[error("Supplier chain cannot exceed {max_hops} hops ({} nodes including the root)", .max_hops + 1)]
    DepthExceeded {
        /// Configured hop ceiling
        max_hops: u8,
    },

    /// A referenced supplier does not exist in the store
    #[error("Supplier {0} not found")]
    SupplierNotFound(i32),

    /// Store lookup failed
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

impl HierarchyError {
    /// Check if this is a client error (400-series)
    pub fn is_client_error(&self) -> bool {
        !matches!(self, HierarchyError::Database(_))
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            HierarchyError::SelfReference { .. } => "SELF_REFERENCE",
            HierarchyError::Cycle { .. } => "CYCLE_DETECTED",
            HierarchyError::DepthExceeded { .. } => "DEPTH_EXCEEDED",
            HierarchyError::SupplierNotFound(_) => "NOT_FOUND",
            HierarchyError::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Request field the error is reported against
    pub fn field(&self) -> &'static str {
        match self {
            HierarchyError::Database(_) => "non_field_errors",
            _ => "supplier",
        }
    }
}
