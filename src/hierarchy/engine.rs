use std::collections::HashSet;

use tracing::{debug, warn};

use super::lookup::{ChainLink, SupplierLookup};
use super::tier::Classification;
use crate::errors::{HierarchyError, HierarchyResult};

/// Maximum number of supplier hops from any node to its root (3 nodes total)
pub const MAX_SUPPLIER_HOPS: u8 = 2;

/// Walk the supplier chain above `node` and return its depth.
///
/// Depth is the number of hops taken before reaching a node with no supplier.
pub async fn compute_depth<L>(node: ChainLink, lookup: &L) -> HierarchyResult<u8>
where
    L: SupplierLookup + ?Sized,
{
    if node.is_root() {
        return Ok(0);
    }
    walk_chain(Some(node.id), node.supplier_id, lookup).await
}

/// Compute the depth of `node` and map it onto a tier, never failing.
pub async fn classify_node<L>(node: ChainLink, lookup: &L) -> Classification
where
    L: SupplierLookup + ?Sized,
{
    let result = compute_depth(node, lookup).await;
    if let Err(err) = &result {
        warn!("Node {} is unclassifiable: {}", node.id, err);
    }
    Classification::from_walk(result)
}

/// Check the chain a write would produce before it is committed.
///
/// `node_id` is `None` for a node that does not exist yet. On success the
/// returned value is the depth the node will have once the write commits.
///
/// For an existing node the subordinates hanging below it move with it, so the
/// height of its subtree is added to the new depth before comparing against
/// [`MAX_SUPPLIER_HOPS`].
pub async fn validate_before_write<L>(
    node_id: Option<i32>,
    proposed_supplier_id: Option<i32>,
    lookup: &L,
) -> HierarchyResult<u8>
where
    L: SupplierLookup + ?Sized,
{
    if let (Some(id), Some(supplier_id)) = (node_id, proposed_supplier_id) {
        if id == supplier_id {
            return Err(HierarchyError::SelfReference { node_id: id });
        }
    }

    let depth = walk_chain(node_id, proposed_supplier_id, lookup).await?;

    if let Some(id) = node_id {
        let height = subtree_height(id, lookup).await?;
        if depth + height > MAX_SUPPLIER_HOPS {
            debug!(
                "Node {} at depth {} carries a subtree of height {}",
                id, depth, height
            );
            return Err(HierarchyError::DepthExceeded {
                max_hops: MAX_SUPPLIER_HOPS,
            });
        }
    }

    Ok(depth)
}

/// Follow supplier pointers from `first_supplier` up to a root.
///
/// `origin` is forbidden anywhere in the chain. Every identity is visited at
/// most once and no more than `MAX_SUPPLIER_HOPS` lookups are made.
async fn walk_chain<L>(
    origin: Option<i32>,
    first_supplier: Option<i32>,
    lookup: &L,
) -> HierarchyResult<u8>
where
    L: SupplierLookup + ?Sized,
{
    let mut visited: HashSet<i32> = HashSet::new();
    let mut hops: u8 = 0;
    let mut next = first_supplier;

    while let Some(supplier_id) = next {
        if origin == Some(supplier_id) || visited.contains(&supplier_id) {
            return Err(HierarchyError::Cycle {
                revisited: supplier_id,
            });
        }

        hops += 1;
        if hops > MAX_SUPPLIER_HOPS {
            return Err(HierarchyError::DepthExceeded {
                max_hops: MAX_SUPPLIER_HOPS,
            });
        }

        let link = lookup
            .get(supplier_id)
            .await?
            .ok_or(HierarchyError::SupplierNotFound(supplier_id))?;
        debug!("hop {}: node {} -> {:?}", hops, link.id, link.supplier_id);

        visited.insert(supplier_id);
        next = link.supplier_id;
    }

    Ok(hops)
}

/// Number of levels of subordinates below `node_id` (0 for a leaf).
async fn subtree_height<L>(node_id: i32, lookup: &L) -> HierarchyResult<u8>
where
    L: SupplierLookup + ?Sized,
{
    let mut visited: HashSet<i32> = HashSet::from([node_id]);
    let mut frontier = vec![node_id];
    let mut height: u8 = 0;

    loop {
        let mut below = Vec::new();
        for id in &frontier {
            for child in lookup.subordinates(*id).await? {
                if !visited.insert(child) {
                    return Err(HierarchyError::Cycle { revisited: child });
                }
                below.push(child);
            }
        }

        if below.is_empty() {
            return Ok(height);
        }

        height += 1;
        if height > MAX_SUPPLIER_HOPS {
            return Err(HierarchyError::DepthExceeded {
                max_hops: MAX_SUPPLIER_HOPS,
            });
        }
        frontier = below;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::lookup::SnapshotLookup;
    use crate::hierarchy::tier::Tier;

    /// 1 <- 2 <- 3, plus an unrelated root 10
    fn chain() -> SnapshotLookup {
        vec![
            ChainLink::new(1, None),
            ChainLink::new(2, Some(1)),
            ChainLink::new(3, Some(2)),
            ChainLink::new(10, None),
        ]
        .into_iter()
        .collect()
    }

    #[tokio::test]
    async fn test_depth_of_each_position() {
        let store = chain();
        assert_eq!(compute_depth(ChainLink::new(1, None), &store).await.unwrap(), 0);
        assert_eq!(compute_depth(ChainLink::new(2, Some(1)), &store).await.unwrap(), 1);
        assert_eq!(compute_depth(ChainLink::new(3, Some(2)), &store).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_rootless_node_has_depth_zero_without_lookups() {
        let store = SnapshotLookup::new();
        assert_eq!(compute_depth(ChainLink::new(42, None), &store).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_self_reference_rejected_wherever_node_sits() {
        let store = chain();
        for id in [1, 2, 3, 10] {
            let err = validate_before_write(Some(id), Some(id), &store)
                .await
                .unwrap_err();
            assert!(matches!(err, HierarchyError::SelfReference { node_id } if node_id == id));
        }
    }

    #[tokio::test]
    async fn test_reverse_edge_is_a_cycle() {
        let store: SnapshotLookup = vec![ChainLink::new(1, Some(2)), ChainLink::new(2, None)]
            .into_iter()
            .collect();

        let err = validate_before_write(Some(2), Some(1), &store)
            .await
            .unwrap_err();
        assert!(matches!(err, HierarchyError::Cycle { revisited: 2 }));
    }

    #[tokio::test]
    async fn test_existing_cycle_is_reported_on_read() {
        // Imported out of band: 5 -> 6 -> 5
        let store: SnapshotLookup = vec![ChainLink::new(5, Some(6)), ChainLink::new(6, Some(5))]
            .into_iter()
            .collect();

        let err = compute_depth(ChainLink::new(5, Some(6)), &store)
            .await
            .unwrap_err();
        assert!(matches!(err, HierarchyError::Cycle { revisited: 5 }));

        let classification = classify_node(ChainLink::new(5, Some(6)), &store).await;
        assert_eq!(classification.tier(), None);
    }

    #[tokio::test]
    async fn test_cycle_not_through_origin_is_caught() {
        // 7 -> 8 -> 9 -> 8, walked from 7
        let store: SnapshotLookup = vec![
            ChainLink::new(7, Some(8)),
            ChainLink::new(8, Some(9)),
            ChainLink::new(9, Some(8)),
        ]
        .into_iter()
        .collect();

        let err = compute_depth(ChainLink::new(7, Some(8)), &store)
            .await
            .unwrap_err();
        assert!(matches!(err, HierarchyError::Cycle { revisited: 8 }));
    }

    #[tokio::test]
    async fn test_depth_ceiling_boundary() {
        let store = chain();

        // New node under the mid tier: 3 nodes total is accepted
        assert_eq!(validate_before_write(None, Some(2), &store).await.unwrap(), 2);

        // New node under the leaf: a 4th node is rejected
        let err = validate_before_write(None, Some(3), &store)
            .await
            .unwrap_err();
        assert!(matches!(err, HierarchyError::DepthExceeded { max_hops: 2 }));
    }

    #[tokio::test]
    async fn test_unknown_supplier() {
        let store = chain();
        let err = validate_before_write(None, Some(99), &store)
            .await
            .unwrap_err();
        assert!(matches!(err, HierarchyError::SupplierNotFound(99)));
    }

    #[tokio::test]
    async fn test_repointing_node_with_subordinates_counts_subtree() {
        let store = chain();

        // 2 carries 3 below it; moving 2 under root 10 keeps 3 at depth 2
        assert_eq!(validate_before_write(Some(2), Some(10), &store).await.unwrap(), 1);

        // Moving root 1 (height 2) under 10 would push 3 to depth 3
        let err = validate_before_write(Some(1), Some(10), &store)
            .await
            .unwrap_err();
        assert!(matches!(err, HierarchyError::DepthExceeded { .. }));
    }

    #[tokio::test]
    async fn test_detaching_is_always_valid() {
        let store = chain();
        assert_eq!(validate_before_write(Some(3), None, &store).await.unwrap(), 0);
        assert_eq!(validate_before_write(Some(2), None, &store).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_classify_node_tiers() {
        let store = chain();
        let tier = classify_node(ChainLink::new(3, Some(2)), &store).await.tier();
        assert_eq!(tier, Some(Tier::Retailer));
    }
}
