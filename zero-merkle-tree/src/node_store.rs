//! Sparse node storage with zero-hash defaults.
//!
//! A [`NodeStore`] backend holds only the nodes that were explicitly written.
//! [`SparseNodeStore`] layers the zero-hash table on top: a node that was
//! never written reads as `Z[height - level]`, the value of an all-empty
//! subtree of that depth.

use std::collections::HashMap;

use zmt_costs::{CostResult, CostsExt, OperationCost, cost_return_on_error};

use crate::{
    MerkleTreeError, NodeValue,
    coordinate::{NodeCoordinate, node_key},
    hash::{validate_height, zero_hashes},
};

/// Backend storage for explicitly written node values.
///
/// Writes are staged in a [`NodeBatch`] and applied in one
/// [`write_batch`](NodeStore::write_batch) call. Implementations must apply a
/// batch entirely or not at all.
pub trait NodeStore {
    /// Retrieve the node stored at `coordinate`, or `None` if it was never
    /// written.
    fn get_node(&self, coordinate: NodeCoordinate)
    -> CostResult<Option<NodeValue>, MerkleTreeError>;

    /// Apply every write in `batch`, later entries overwriting earlier ones.
    fn write_batch(&mut self, batch: NodeBatch) -> CostResult<(), MerkleTreeError>;
}

/// Staged node writes, applied together by [`NodeStore::write_batch`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NodeBatch {
    writes: Vec<(NodeCoordinate, NodeValue)>,
}

impl NodeBatch {
    /// Create an empty batch with room for `capacity` writes.
    pub fn with_capacity(capacity: usize) -> Self {
        NodeBatch {
            writes: Vec::with_capacity(capacity),
        }
    }

    /// Stage a write.
    pub fn put(&mut self, coordinate: NodeCoordinate, value: NodeValue) {
        self.writes.push((coordinate, value));
    }

    /// Number of staged writes.
    pub fn len(&self) -> usize {
        self.writes.len()
    }

    /// Returns `true` if nothing is staged.
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }
}

impl IntoIterator for NodeBatch {
    type IntoIter = std::vec::IntoIter<Self::Item>;
    type Item = (NodeCoordinate, NodeValue);

    fn into_iter(self) -> Self::IntoIter {
        self.writes.into_iter()
    }
}

/// In-memory node store keyed by the packed [`node_key`] of each coordinate.
///
/// Every read counts as one node read and every applied write as one node
/// write.
#[derive(Debug, Default, Clone)]
pub struct MemNodeStore {
    nodes: HashMap<[u8; 9], NodeValue>,
}

impl MemNodeStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of explicitly stored nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if no node was ever written.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl NodeStore for MemNodeStore {
    fn get_node(
        &self,
        coordinate: NodeCoordinate,
    ) -> CostResult<Option<NodeValue>, MerkleTreeError> {
        let key = node_key(coordinate.level, coordinate.index);
        Ok(self.nodes.get(&key).cloned()).wrap_with_cost(OperationCost::with_node_reads(1))
    }

    fn write_batch(&mut self, batch: NodeBatch) -> CostResult<(), MerkleTreeError> {
        let writes = batch.len() as u32;
        for (coordinate, value) in batch {
            self.nodes
                .insert(node_key(coordinate.level, coordinate.index), value);
        }
        Ok(()).wrap_with_cost(OperationCost::with_node_writes(writes))
    }
}

/// A node store that reads absent nodes as the zero hash of their depth.
#[derive(Debug, Clone)]
pub struct SparseNodeStore<S = MemNodeStore> {
    height: u8,
    zero_hashes: Vec<NodeValue>,
    backend: S,
}

impl<S: NodeStore> SparseNodeStore<S> {
    /// Wrap `backend` for a tree of `height`, computing the zero-hash table.
    pub fn new(height: u8, backend: S) -> Result<Self, MerkleTreeError> {
        validate_height(height)?;
        Ok(Self {
            height,
            zero_hashes: zero_hashes(height),
            backend,
        })
    }

    /// Height of the tree this store serves.
    pub fn height(&self) -> u8 {
        self.height
    }

    /// The zero-hash table `Z[0..=height]`.
    pub fn zero_hashes(&self) -> &[NodeValue] {
        &self.zero_hashes
    }

    /// The wrapped backend.
    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// The value at `(level, index)`: the stored value if one was written,
    /// otherwise `Z[height - level]`.
    ///
    /// The coordinate is not range-checked; callers validate it first.
    pub fn get(&self, level: u8, index: u64) -> CostResult<NodeValue, MerkleTreeError> {
        let mut cost = OperationCost::default();
        let stored = cost_return_on_error!(
            &mut cost,
            self.backend.get_node(NodeCoordinate::new(level, index))
        );
        let value = match stored {
            Some(value) => value,
            None => match self.zero_hash_at_level(level) {
                Some(zero) => zero.clone(),
                None => {
                    return Err(MerkleTreeError::LevelOutOfRange {
                        level,
                        height: self.height,
                    })
                    .wrap_with_cost(cost);
                }
            },
        };
        Ok(value).wrap_with_cost(cost)
    }

    /// Apply a batch of staged writes in one backend call. Each write is an
    /// unconditional overwrite of its coordinate.
    pub fn apply(&mut self, batch: NodeBatch) -> CostResult<(), MerkleTreeError> {
        self.backend.write_batch(batch)
    }

    fn zero_hash_at_level(&self, level: u8) -> Option<&NodeValue> {
        let depth = self.height.checked_sub(level)?;
        self.zero_hashes.get(depth as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set<S: NodeStore>(store: &mut SparseNodeStore<S>, level: u8, index: u64, value: &str) {
        let mut batch = NodeBatch::with_capacity(1);
        batch.put(NodeCoordinate::new(level, index), value.into());
        store.apply(batch).unwrap().expect("apply");
    }

    #[test]
    fn test_zero_hash_table_has_height_plus_one_entries() {
        let store = SparseNodeStore::new(4, MemNodeStore::new()).expect("height 4");
        assert_eq!(store.zero_hashes().len(), 5);
    }

    #[test]
    fn test_set_and_get() {
        let mut store = SparseNodeStore::new(4, MemNodeStore::new()).expect("height 4");
        set(&mut store, 2, 3, "test_value");
        assert_eq!(store.get(2, 3).unwrap().expect("get"), "test_value");

        let absent = store.get(1, 1).unwrap().expect("get absent");
        assert_eq!(absent, store.zero_hashes()[3]);
        assert_eq!(store.get(4, 0).unwrap().expect("leaf"), NodeValue::zero());
    }

    #[test]
    fn test_overwrite_keeps_one_entry() {
        let mut store = SparseNodeStore::new(2, MemNodeStore::new()).expect("height 2");
        set(&mut store, 2, 1, "a");
        set(&mut store, 2, 1, "b");
        assert_eq!(store.get(2, 1).unwrap().expect("get"), "b");
        assert_eq!(store.backend().len(), 1);
    }

    #[test]
    fn test_costs() {
        let mut store = SparseNodeStore::new(3, MemNodeStore::new()).expect("height 3");
        let mut batch = NodeBatch::with_capacity(2);
        batch.put(NodeCoordinate::new(3, 0), "x".into());
        batch.put(NodeCoordinate::new(2, 0), "y".into());
        assert_eq!(store.apply(batch).cost, OperationCost::with_node_writes(2));
        assert_eq!(store.get(0, 0).cost, OperationCost::with_node_reads(1));
    }

    #[test]
    fn test_get_beyond_height_is_an_error() {
        let store = SparseNodeStore::new(2, MemNodeStore::new()).expect("height 2");
        assert_eq!(
            store.get(3, 0).unwrap(),
            Err(MerkleTreeError::LevelOutOfRange {
                level: 3,
                height: 2
            })
        );
    }
}
