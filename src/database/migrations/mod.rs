pub use sea_orm_migration::prelude::*;

mod m20261010_000001_create_network_nodes;
mod m20261010_000002_create_products;
mod m20261012_000003_create_users;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261010_000001_create_network_nodes::Migration),
            Box::new(m20261010_000002_create_products::Migration),
            Box::new(m20261012_000003_create_users::Migration),
        ]
    }
}
