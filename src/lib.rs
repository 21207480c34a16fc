pub mod config;
pub mod database;
pub mod errors;
pub mod hierarchy;
pub mod services;
