pub mod network_nodes;
pub mod products;
pub mod users;
