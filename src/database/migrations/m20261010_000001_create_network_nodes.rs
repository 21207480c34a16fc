use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(NetworkNodes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(NetworkNodes::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(NetworkNodes::Name).string_len(255).not_null())
                    .col(
                        ColumnDef::new(NetworkNodes::Email)
                            .string_len(254)
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(NetworkNodes::Country).string_len(100).not_null())
                    .col(ColumnDef::new(NetworkNodes::City).string_len(100).not_null())
                    .col(ColumnDef::new(NetworkNodes::Street).string_len(255).not_null())
                    .col(ColumnDef::new(NetworkNodes::HouseNumber).string_len(5).not_null())
                    .col(ColumnDef::new(NetworkNodes::SupplierId).integer())
                    .col(
                        ColumnDef::new(NetworkNodes::DebtToSupplier)
                            .decimal_len(12, 2)
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(NetworkNodes::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_network_nodes_supplier_id")
                            .from(NetworkNodes::Table, NetworkNodes::SupplierId)
                            .to(NetworkNodes::Table, NetworkNodes::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_network_nodes_supplier_id")
                    .table(NetworkNodes::Table)
                    .col(NetworkNodes::SupplierId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(NetworkNodes::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum NetworkNodes {
    Table,
    Id,
    Name,
    Email,
    Country,
    City,
    Street,
    HouseNumber,
    SupplierId,
    DebtToSupplier,
    CreatedAt,
}
