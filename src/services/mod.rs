pub mod bootstrap_service;
pub mod chain_lookup;
pub mod network_service;
pub mod product_service;
pub mod validation;

pub use bootstrap_service::*;
pub use chain_lookup::*;
pub use network_service::*;
pub use product_service::*;
pub use validation::*;
