use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};

use crate::hierarchy::ChainLink;

/// A node of the supplier network: manufacturer, reseller or retailer
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "network_nodes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub email: String,
    pub country: String,
    pub city: String,
    pub street: String,
    pub house_number: String,
    pub supplier_id: Option<i32>,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub debt_to_supplier: Decimal,
    pub created_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::SupplierId",
        to = "Column::Id",
        on_delete = "SetNull"
    )]
    Supplier,
    #[sea_orm(has_many = "super::products::Entity")]
    Products,
}

impl Related<super::products::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Products.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub fn new() -> Self {
        Self {
            id: ActiveValue::NotSet,
            name: ActiveValue::NotSet,
            email: Set(String::new()),
            country: ActiveValue::NotSet,
            city: ActiveValue::NotSet,
            street: ActiveValue::NotSet,
            house_number: ActiveValue::NotSet,
            supplier_id: Set(None),
            debt_to_supplier: Set(Decimal::ZERO),
            created_at: Set(chrono::Utc::now()),
        }
    }
}

impl Model {
    pub fn chain_link(&self) -> ChainLink {
        ChainLink::new(self.id, self.supplier_id)
    }
}
