use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Value,
};
use serde::{Deserialize, Deserializer, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::database::begin_write;
use crate::database::entities::{network_nodes, products};
use crate::errors::{NetworkError, NetworkResult};
use crate::hierarchy::{
    classify, classify_node, validate_before_write, Classification, SnapshotLookup,
};
use crate::services::chain_lookup::ConnectionLookup;
use crate::services::ValidationService;

/// Create request for a network node
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NodeInput {
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub country: String,
    pub city: String,
    pub street: String,
    pub house_number: String,
    #[serde(default)]
    pub debt_to_supplier: Option<Decimal>,
    #[serde(default)]
    pub supplier_id: Option<i32>,
}

/// Partial update of a network node.
///
/// `supplier_id` distinguishes "leave unchanged" (`None`) from "detach"
/// (`Some(None)`). Debt is not part of a general update.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct NodeChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub street: Option<String>,
    pub house_number: Option<String>,
    #[serde(default, deserialize_with = "present_field")]
    pub supplier_id: Option<Option<i32>>,
}

fn present_field<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Node as returned by the read path: stored fields plus derived tier
#[derive(Clone, Debug, Serialize)]
pub struct NodeView {
    #[serde(flatten)]
    pub node: network_nodes::Model,
    pub supplier_name: Option<String>,
    #[serde(flatten)]
    pub classification: Classification,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DeleteOutcome {
    pub node_id: i32,
    /// Former subordinates that are now roots
    pub released_subordinates: u64,
    pub removed_products: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ClearDebtOutcome {
    Cleared { count: u64 },
    NothingToClear,
}

impl ClearDebtOutcome {
    pub fn cleared_count(&self) -> u64 {
        match self {
            ClearDebtOutcome::Cleared { count } => *count,
            ClearDebtOutcome::NothingToClear => 0,
        }
    }
}

impl fmt::Display for ClearDebtOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClearDebtOutcome::Cleared { count } => {
                write!(f, "Debt to supplier cleared for {} node(s)", count)
            }
            ClearDebtOutcome::NothingToClear => f.write_str("No nodes with outstanding debt"),
        }
    }
}

/// Hierarchy store: every write validates and persists inside one
/// transaction, taken under the service's write lock.
///
/// Clones share the in-process lock. Transactions open with SQLite's write
/// lock already held, so writers in other services or processes wait for the
/// previous commit and a supplier change always re-validates against it.
#[derive(Clone)]
pub struct NetworkService {
    db: DatabaseConnection,
    write_lock: Arc<Mutex<()>>,
}

impl NetworkService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Create a node, validating its supplier chain before the insert commits
    pub async fn create_node(&self, input: NodeInput) -> NetworkResult<NodeView> {
        let name = ValidationService::validate_node_name(&input.name)?;
        let email = ValidationService::validate_email(&input.email)?;
        let country = ValidationService::validate_country(&input.country)?;
        let city = ValidationService::validate_city(&input.city)?;
        let street = ValidationService::validate_street(&input.street)?;
        let house_number = ValidationService::validate_house_number(&input.house_number)?;
        let debt = ValidationService::validate_debt(input.debt_to_supplier.unwrap_or_default())?;

        let _guard = self.write_lock.lock().await;
        let txn = begin_write(&self.db).await?;

        let depth = validate_before_write(None, input.supplier_id, &ConnectionLookup::new(&txn))
            .await
            .map_err(|e| rejected("create", None, e.into()))?;

        let mut active = network_nodes::ActiveModel::new();
        active.name = Set(name);
        active.email = Set(email);
        active.country = Set(country);
        active.city = Set(city);
        active.street = Set(street);
        active.house_number = Set(house_number);
        active.supplier_id = Set(input.supplier_id);
        active.debt_to_supplier = Set(debt);

        let node = active.insert(&txn).await?;
        let view = build_view(&txn, node, classify(depth)).await?;
        txn.commit().await?;

        info!(
            "Created network node {} ({}) as {}",
            view.node.id, view.node.name, view.classification
        );
        Ok(view)
    }

    /// Apply a partial update; a supplier change is re-validated against the
    /// chain as it stands inside the transaction
    pub async fn update_node(&self, id: i32, changes: NodeChanges) -> NetworkResult<NodeView> {
        let _guard = self.write_lock.lock().await;
        let txn = begin_write(&self.db).await?;

        let existing = network_nodes::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(NetworkError::NodeNotFound(id))?;
        let mut active: network_nodes::ActiveModel = existing.clone().into();

        if let Some(name) = &changes.name {
            active.name = Set(ValidationService::validate_node_name(name)?);
        }
        if let Some(email) = &changes.email {
            active.email = Set(ValidationService::validate_email(email)?);
        }
        if let Some(country) = &changes.country {
            active.country = Set(ValidationService::validate_country(country)?);
        }
        if let Some(city) = &changes.city {
            active.city = Set(ValidationService::validate_city(city)?);
        }
        if let Some(street) = &changes.street {
            active.street = Set(ValidationService::validate_street(street)?);
        }
        if let Some(house_number) = &changes.house_number {
            active.house_number = Set(ValidationService::validate_house_number(house_number)?);
        }

        let lookup = ConnectionLookup::new(&txn);
        let classification = match changes.supplier_id {
            Some(supplier_id) => {
                let depth = validate_before_write(Some(id), supplier_id, &lookup)
                    .await
                    .map_err(|e| rejected("update", Some(id), e.into()))?;
                if supplier_id != existing.supplier_id {
                    debug!(
                        "Repointing node {} from {:?} to {:?}",
                        id, existing.supplier_id, supplier_id
                    );
                }
                active.supplier_id = Set(supplier_id);
                classify(depth)
            }
            None => classify_node(existing.chain_link(), &lookup).await,
        };

        let node = active.update(&txn).await?;
        let view = build_view(&txn, node, classification).await?;
        txn.commit().await?;

        info!("Updated network node {} ({})", view.node.id, view.node.name);
        Ok(view)
    }

    /// Delete a node. Subordinates become roots; owned products are removed.
    pub async fn delete_node(&self, id: i32) -> NetworkResult<DeleteOutcome> {
        let _guard = self.write_lock.lock().await;
        let txn = begin_write(&self.db).await?;

        network_nodes::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(NetworkError::NodeNotFound(id))?;

        let released = network_nodes::Entity::update_many()
            .col_expr(network_nodes::Column::SupplierId, Expr::value(Value::Int(None)))
            .filter(network_nodes::Column::SupplierId.eq(id))
            .exec(&txn)
            .await?
            .rows_affected;

        let removed = products::Entity::delete_many()
            .filter(products::Column::NetworkNodeId.eq(id))
            .exec(&txn)
            .await?
            .rows_affected;

        network_nodes::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;

        info!(
            "Deleted network node {}: {} subordinate(s) released, {} product(s) removed",
            id, released, removed
        );
        Ok(DeleteOutcome {
            node_id: id,
            released_subordinates: released,
            removed_products: removed,
        })
    }

    pub async fn get_node(&self, id: i32) -> NetworkResult<NodeView> {
        let node = network_nodes::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(NetworkError::NodeNotFound(id))?;

        let classification = classify_node(node.chain_link(), &ConnectionLookup::new(&self.db)).await;
        build_view(&self.db, node, classification).await
    }

    /// List every node, classified against a single snapshot of the table
    pub async fn list_nodes(&self) -> NetworkResult<Vec<NodeView>> {
        let nodes = network_nodes::Entity::find()
            .order_by_asc(network_nodes::Column::Id)
            .all(&self.db)
            .await?;

        let snapshot: SnapshotLookup = nodes.iter().map(|n| n.chain_link()).collect();
        let names: HashMap<i32, String> = nodes.iter().map(|n| (n.id, n.name.clone())).collect();

        let mut views = Vec::with_capacity(nodes.len());
        for node in nodes {
            let classification = classify_node(node.chain_link(), &snapshot).await;
            let supplier_name = node.supplier_id.and_then(|s| names.get(&s).cloned());
            views.push(NodeView {
                node,
                supplier_name,
                classification,
            });
        }

        Ok(views)
    }

    pub async fn count_nodes(&self) -> NetworkResult<u64> {
        Ok(network_nodes::Entity::find().count(&self.db).await?)
    }

    /// Administrative correction of the amount owed upstream
    pub async fn record_debt(&self, id: i32, amount: Decimal) -> NetworkResult<NodeView> {
        let amount = ValidationService::validate_debt(amount)
            .map_err(|e| rejected("record debt", Some(id), e))?;

        let _guard = self.write_lock.lock().await;
        let txn = begin_write(&self.db).await?;
        let node = network_nodes::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(NetworkError::NodeNotFound(id))?;

        let mut active: network_nodes::ActiveModel = node.into();
        active.debt_to_supplier = Set(amount);
        let node = active.update(&txn).await?;

        let classification = classify_node(node.chain_link(), &ConnectionLookup::new(&txn)).await;
        let view = build_view(&txn, node, classification).await?;
        txn.commit().await?;

        info!("Recorded debt {} for network node {}", amount, id);
        Ok(view)
    }

    /// Zero the debt of every listed node that owes anything
    pub async fn clear_debt(&self, ids: &[i32]) -> NetworkResult<ClearDebtOutcome> {
        if ids.is_empty() {
            return Ok(ClearDebtOutcome::NothingToClear);
        }

        let _guard = self.write_lock.lock().await;
        let txn = begin_write(&self.db).await?;
        let owing: Vec<i32> = network_nodes::Entity::find()
            .filter(network_nodes::Column::Id.is_in(ids.to_vec()))
            .all(&txn)
            .await?
            .into_iter()
            .filter(|n| n.debt_to_supplier > Decimal::ZERO)
            .map(|n| n.id)
            .collect();

        if owing.is_empty() {
            warn!("No nodes with outstanding debt among {:?}", ids);
            return Ok(ClearDebtOutcome::NothingToClear);
        }

        let count = network_nodes::Entity::update_many()
            .col_expr(network_nodes::Column::DebtToSupplier, Expr::value(Decimal::ZERO))
            .filter(network_nodes::Column::Id.is_in(owing))
            .exec(&txn)
            .await?
            .rows_affected;
        txn.commit().await?;

        info!("Cleared debt to supplier for {} node(s)", count);
        Ok(ClearDebtOutcome::Cleared { count })
    }
}

async fn build_view<C>(
    conn: &C,
    node: network_nodes::Model,
    classification: Classification,
) -> NetworkResult<NodeView>
where
    C: ConnectionTrait,
{
    let supplier_name = match node.supplier_id {
        Some(supplier_id) => network_nodes::Entity::find_by_id(supplier_id)
            .one(conn)
            .await?
            .map(|s| s.name),
        None => None,
    };

    Ok(NodeView {
        node,
        supplier_name,
        classification,
    })
}

fn rejected(operation: &str, node_id: Option<i32>, err: NetworkError) -> NetworkError {
    if err.is_client_error() {
        warn!(
            "Rejected {} of node {:?}: {} ({})",
            operation,
            node_id,
            err,
            err.error_code()
        );
    }
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_utils::setup_test_db;
    use crate::errors::HierarchyError;
    use crate::hierarchy::Tier;

    fn input(name: &str, supplier_id: Option<i32>) -> NodeInput {
        NodeInput {
            name: name.to_string(),
            email: "e@e.ru".to_string(),
            country: "Russia".to_string(),
            city: "Moscow".to_string(),
            street: "Pushkinskaya".to_string(),
            house_number: "20".to_string(),
            debt_to_supplier: Some(Decimal::new(100000, 2)),
            supplier_id,
        }
    }

    #[tokio::test]
    async fn test_create_classifies_by_position() {
        let service = NetworkService::new(setup_test_db().await);

        let root = service.create_node(input("Plant", None)).await.unwrap();
        let mid = service.create_node(input("Chain", Some(root.node.id))).await.unwrap();

        assert_eq!(root.classification.tier(), Some(Tier::Root));
        assert_eq!(mid.classification.tier(), Some(Tier::Reseller));
        assert_eq!(mid.supplier_name.as_deref(), Some("Plant"));
    }

    #[tokio::test]
    async fn test_update_self_reference() {
        let service = NetworkService::new(setup_test_db().await);
        let node = service.create_node(input("Plant", None)).await.unwrap();

        let err = service
            .update_node(
                node.node.id,
                NodeChanges {
                    supplier_id: Some(Some(node.node.id)),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            NetworkError::Hierarchy(HierarchyError::SelfReference { .. })
        ));
        assert_eq!(err.field(), "supplier");
    }

    #[tokio::test]
    async fn test_update_unknown_node() {
        let service = NetworkService::new(setup_test_db().await);
        let err = service
            .update_node(404, NodeChanges::default())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_changes_distinguish_detach_from_absent() {
        let absent: NodeChanges = serde_json::from_str(r#"{"name": "X"}"#).unwrap();
        assert_eq!(absent.supplier_id, None);

        let detach: NodeChanges = serde_json::from_str(r#"{"supplier_id": null}"#).unwrap();
        assert_eq!(detach.supplier_id, Some(None));

        let repoint: NodeChanges = serde_json::from_str(r#"{"supplier_id": 4}"#).unwrap();
        assert_eq!(repoint.supplier_id, Some(Some(4)));
    }

    #[test]
    fn test_clear_debt_outcome_display() {
        assert_eq!(ClearDebtOutcome::NothingToClear.cleared_count(), 0);
        assert_eq!(
            ClearDebtOutcome::Cleared { count: 2 }.to_string(),
            "Debt to supplier cleared for 2 node(s)"
        );
    }
}
