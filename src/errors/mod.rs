//! Domain-specific error types for supplynet
//!
//! # Error Categories
//!
//! - **HierarchyError**: supplier chain rules (self-reference, cycles, depth)
//! - **NetworkError**: node and product write/read paths, wrapping hierarchy
//!   violations alongside attribute validation and lookups
//!
//! # Examples
//!
//! ```rust
//! use supplynet::errors::{HierarchyError, NetworkError};
//!
//! let err: NetworkError = HierarchyError::DepthExceeded { max_hops: 2 }.into();
//! assert!(err.is_client_error());
//! assert_eq!(err.field(), "supplier");
//! ```

pub mod hierarchy;
pub mod network;

pub use hierarchy::HierarchyError;
pub use network::NetworkError;

/// Result type alias for supplier chain operations
pub type HierarchyResult<T> = Result<T, HierarchyError>;

/// Result type alias for network services
pub type NetworkResult<T> = Result<T, NetworkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hierarchy_result_alias() {
        let result: HierarchyResult<u8> = Err(HierarchyError::SupplierNotFound(1));
        assert!(result.is_err());
    }

    #[test]
    fn test_network_result_alias() {
        let result: NetworkResult<()> = Err(NetworkError::ProductNotFound(1));
        assert!(result.is_err());
    }
}
