use async_trait::async_trait;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect};

use crate::database::entities::network_nodes;
use crate::errors::HierarchyResult;
use crate::hierarchy::{ChainLink, SupplierLookup};

/// Supplier lookups against a live connection or an open transaction.
///
/// Inside a write the lookup is built on the transaction so validation reads
/// the same state the write commits against.
pub struct ConnectionLookup<'a, C> {
    conn: &'a C,
}

impl<'a, C> ConnectionLookup<'a, C>
where
    C: ConnectionTrait,
{
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl<C> SupplierLookup for ConnectionLookup<'_, C>
where
    C: ConnectionTrait + Sync,
{
    async fn get(&self, id: i32) -> HierarchyResult<Option<ChainLink>> {
        let node = network_nodes::Entity::find_by_id(id).one(self.conn).await?;
        Ok(node.map(|n| n.chain_link()))
    }

    async fn subordinates(&self, id: i32) -> HierarchyResult<Vec<i32>> {
        let ids = network_nodes::Entity::find()
            .select_only()
            .column(network_nodes::Column::Id)
            .filter(network_nodes::Column::SupplierId.eq(id))
            .order_by_asc(network_nodes::Column::Id)
            .into_tuple::<i32>()
            .all(self.conn)
            .await?;
        Ok(ids)
    }
}
