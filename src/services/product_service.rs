use chrono::NaiveDate;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::database::begin_write;
use crate::database::entities::{network_nodes, products};
use crate::errors::{NetworkError, NetworkResult};
use crate::hierarchy::{classify_node, Tier};
use crate::services::chain_lookup::ConnectionLookup;
use crate::services::ValidationService;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProductInput {
    pub name: String,
    pub model: String,
    pub release_date: NaiveDate,
}

/// Products belong to exactly one node for their whole lifetime.
/// Only manufacturers (root nodes) take on new products.
#[derive(Clone)]
pub struct ProductService {
    db: DatabaseConnection,
}

impl ProductService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create_product(
        &self,
        network_node_id: i32,
        input: ProductInput,
    ) -> NetworkResult<products::Model> {
        let name = ValidationService::validate_product_name(&input.name)?;
        let model = ValidationService::validate_product_model(&input.model)?;

        let txn = begin_write(&self.db).await?;
        let owner = network_nodes::Entity::find_by_id(network_node_id)
            .one(&txn)
            .await?
            .ok_or(NetworkError::NodeNotFound(network_node_id))?;

        let classification = classify_node(owner.chain_link(), &ConnectionLookup::new(&txn)).await;
        if classification.tier() != Some(Tier::Root) {
            warn!(
                "Rejected product for network node {} ({})",
                network_node_id, classification
            );
            return Err(NetworkError::validation(
                "network_node_id",
                format!(
                    "Only manufacturers can add products; node {} is {}",
                    network_node_id, classification
                ),
            ));
        }

        let product = products::ActiveModel {
            name: Set(name),
            model: Set(model),
            release_date: Set(input.release_date),
            network_node_id: Set(network_node_id),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        info!(
            "Created product {} ({}) for network node {}",
            product.id, product.name, network_node_id
        );
        Ok(product)
    }

    pub async fn get_product(&self, id: i32) -> NetworkResult<products::Model> {
        products::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(NetworkError::ProductNotFound(id))
    }

    /// List products, optionally only those of one node
    pub async fn list_products(
        &self,
        network_node_id: Option<i32>,
    ) -> NetworkResult<Vec<products::Model>> {
        let mut query = products::Entity::find().order_by_asc(products::Column::Id);
        if let Some(node_id) = network_node_id {
            query = query.filter(products::Column::NetworkNodeId.eq(node_id));
        }
        Ok(query.all(&self.db).await?)
    }

    pub async fn delete_product(&self, id: i32) -> NetworkResult<()> {
        let result = products::Entity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(NetworkError::ProductNotFound(id));
        }

        info!("Deleted product {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_utils::setup_test_db;
    use crate::services::{NetworkService, NodeInput};

    fn node(name: &str, supplier_id: Option<i32>) -> NodeInput {
        NodeInput {
            name: name.to_string(),
            country: "Germany".to_string(),
            city: "Berlin".to_string(),
            street: "Torstrasse".to_string(),
            house_number: "7".to_string(),
            supplier_id,
            ..Default::default()
        }
    }

    fn phone() -> ProductInput {
        ProductInput {
            name: "Phone".to_string(),
            model: "X1".to_string(),
            release_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_product_requires_existing_owner() {
        let service = ProductService::new(setup_test_db().await);
        let err = service.create_product(77, phone()).await.unwrap_err();
        assert!(matches!(err, NetworkError::NodeNotFound(77)));
        assert!(service.list_products(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_product_model_required() {
        let service = ProductService::new(setup_test_db().await);
        let mut input = phone();
        input.model = " ".to_string();
        let err = service.create_product(1, input).await.unwrap_err();
        assert_eq!(err.field(), "model");
    }

    #[tokio::test]
    async fn test_only_root_nodes_take_products() {
        let db = setup_test_db().await;
        let network = NetworkService::new(db.clone());
        let service = ProductService::new(db);

        let factory = network.create_node(node("Factory", None)).await.unwrap();
        let reseller = network
            .create_node(node("Reseller", Some(factory.node.id)))
            .await
            .unwrap();

        let err = service
            .create_product(reseller.node.id, phone())
            .await
            .unwrap_err();
        assert_eq!(err.field(), "network_node_id");
        assert_eq!(err.error_code(), "VALIDATION_FAILED");
        assert!(service
            .list_products(Some(reseller.node.id))
            .await
            .unwrap()
            .is_empty());

        let product = service.create_product(factory.node.id, phone()).await.unwrap();
        assert_eq!(product.network_node_id, factory.node.id);
        assert_eq!(product.model, "X1");
    }

    #[tokio::test]
    async fn test_delete_missing_product() {
        let service = ProductService::new(setup_test_db().await);
        let err = service.delete_product(5).await.unwrap_err();
        assert!(matches!(err, NetworkError::ProductNotFound(5)));
    }
}
