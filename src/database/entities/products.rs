use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product carried by exactly one network node
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub model: String,
    pub release_date: Date,
    pub network_node_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::network_nodes::Entity",
        from = "Column::NetworkNodeId",
        to = "super::network_nodes::Column::Id",
        on_delete = "Cascade"
    )]
    NetworkNodes,
}

impl Related<super::network_nodes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::NetworkNodes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
