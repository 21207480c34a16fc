use std::collections::HashMap;

use async_trait::async_trait;

use crate::errors::HierarchyResult;

/// The structural part of a node: its identity and supplier pointer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChainLink {
    pub id: i32,
    pub supplier_id: Option<i32>,
}

impl ChainLink {
    pub fn new(id: i32, supplier_id: Option<i32>) -> Self {
        Self { id, supplier_id }
    }

    pub fn is_root(&self) -> bool {
        self.supplier_id.is_none()
    }
}

/// Read access to the supplier graph used by the integrity engine.
///
/// Implemented by the database store (inside the write transaction) and by
/// [`SnapshotLookup`] for listings computed from one loaded result set.
#[async_trait]
pub trait SupplierLookup: Send + Sync {
    /// Resolve a node by identity; `None` when it does not exist
    async fn get(&self, id: i32) -> HierarchyResult<Option<ChainLink>>;

    /// Identities of the nodes whose supplier is `id`
    async fn subordinates(&self, id: i32) -> HierarchyResult<Vec<i32>>;
}

/// In-memory view of the supplier graph
#[derive(Clone, Debug, Default)]
pub struct SnapshotLookup {
    links: HashMap<i32, Option<i32>>,
}

impl SnapshotLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, link: ChainLink) {
        self.links.insert(link.id, link.supplier_id);
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

impl FromIterator<ChainLink> for SnapshotLookup {
    fn from_iter<I: IntoIterator<Item = ChainLink>>(iter: I) -> Self {
        let mut snapshot = SnapshotLookup::new();
        for link in iter {
            snapshot.insert(link);
        }
        snapshot
    }
}

#[async_trait]
impl SupplierLookup for SnapshotLookup {
    async fn get(&self, id: i32) -> HierarchyResult<Option<ChainLink>> {
        Ok(self
            .links
            .get(&id)
            .map(|supplier_id| ChainLink::new(id, *supplier_id)))
    }

    async fn subordinates(&self, id: i32) -> HierarchyResult<Vec<i32>> {
        let mut ids: Vec<i32> = self
            .links
            .iter()
            .filter(|(_, supplier_id)| **supplier_id == Some(id))
            .map(|(node_id, _)| *node_id)
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_snapshot_get_and_subordinates() {
        let snapshot: SnapshotLookup = vec![
            ChainLink::new(1, None),
            ChainLink::new(3, Some(1)),
            ChainLink::new(2, Some(1)),
        ]
        .into_iter()
        .collect();

        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot.get(3).await.unwrap(), Some(ChainLink::new(3, Some(1))));
        assert_eq!(snapshot.get(9).await.unwrap(), None);
        assert_eq!(snapshot.subordinates(1).await.unwrap(), vec![2, 3]);
        assert!(snapshot.subordinates(2).await.unwrap().is_empty());
    }
}
