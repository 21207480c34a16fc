//! Hierarchy integrity engine
//!
//! Depth and tier are derived from the live supplier chain on every read and
//! checked on every write. Nothing here is cached on the node record.
//!
//! - [`compute_depth`] walks `supplier_id` pointers with a visited set and a
//!   hard ceiling of [`MAX_SUPPLIER_HOPS`].
//! - [`validate_before_write`] runs the same walk for a proposed supplier,
//!   rejecting self-reference, cycles and over-deep chains.
//! - [`classify`] / [`classify_node`] turn a depth into a [`Tier`] for display.

pub mod engine;
pub mod lookup;
pub mod tier;

pub use engine::{classify_node, compute_depth, validate_before_write, MAX_SUPPLIER_HOPS};
pub use lookup::{ChainLink, SnapshotLookup, SupplierLookup};
pub use tier::{classify, Classification, Tier};
