use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Products::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Products::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Products::Model).string_len(255).not_null())
                    .col(ColumnDef::new(Products::ReleaseDate).date().not_null())
                    .col(ColumnDef::new(Products::NetworkNodeId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_products_network_node_id")
                            .from(Products::Table, Products::NetworkNodeId)
                            .to(NetworkNodes::Table, NetworkNodes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_products_network_node_id")
                    .table(Products::Table)
                    .col(Products::NetworkNodeId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Products::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Products {
    Table,
    Id,
    Name,
    Model,
    ReleaseDate,
    NetworkNodeId,
}

#[derive(DeriveIden)]
enum NetworkNodes {
    Table,
    Id,
}
