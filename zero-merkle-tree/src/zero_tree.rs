//! Zero-default Merkle tree over a sparse node store.
//!
//! Only nodes on the paths of leaves that were set are ever stored. Every
//! other node reads as the zero hash of its depth, so a tree of height 63
//! costs nothing until it is written to.

use zmt_costs::{CostResult, CostsExt, OperationCost, cost_return_on_error, cost_return_on_error_no_add};

use crate::{
    DeltaMerkleProof, MerkleProof, MerkleTreeError, NodeValue,
    coordinate::{NodeCoordinate, validate_coordinate},
    node_reader::{self, NodeReader},
    node_store::{MemNodeStore, NodeBatch, NodeStore, SparseNodeStore},
    proof::hash_with_sibling,
};

/// A Merkle tree whose unset leaves are [`NodeValue::zero`].
///
/// Updates go through [`set_leaf`](Self::set_leaf), which rewrites exactly the
/// `height + 1` nodes on the leaf's path. The backend defaults to
/// [`MemNodeStore`]; any [`NodeStore`] can be plugged in with
/// [`with_store`](Self::with_store).
#[derive(Debug, Clone)]
pub struct ZeroMerkleTree<S = MemNodeStore> {
    store: SparseNodeStore<S>,
}

impl ZeroMerkleTree<MemNodeStore> {
    /// Create an empty in-memory tree of `height`.
    pub fn new(height: u8) -> Result<Self, MerkleTreeError> {
        Self::with_store(height, MemNodeStore::new())
    }
}

impl<S: NodeStore> ZeroMerkleTree<S> {
    /// Create a tree of `height` on top of `store`.
    ///
    /// Nodes already present in `store` are taken as they are.
    pub fn with_store(height: u8, store: S) -> Result<Self, MerkleTreeError> {
        Ok(Self {
            store: SparseNodeStore::new(height, store)?,
        })
    }

    /// Height of the tree.
    pub fn height(&self) -> u8 {
        self.store.height()
    }

    /// The zero-hash table `Z[0..=height]`.
    pub fn zero_hashes(&self) -> &[NodeValue] {
        self.store.zero_hashes()
    }

    /// The backend holding the explicitly written nodes.
    pub fn store(&self) -> &S {
        self.store.backend()
    }

    /// Value of the node at `(level, index)`.
    pub fn node(&self, level: u8, index: u64) -> CostResult<NodeValue, MerkleTreeError> {
        let cost = OperationCost::default();
        cost_return_on_error_no_add!(&cost, validate_coordinate(self.height(), level, index));
        self.store.get(level, index)
    }

    /// The root value.
    pub fn root(&self) -> CostResult<NodeValue, MerkleTreeError> {
        self.node(0, 0)
    }

    /// Inclusion proof for the leaf at `index`.
    pub fn get_leaf(&self, index: u64) -> CostResult<MerkleProof, MerkleTreeError> {
        self.get_merkle_proof(self.height(), index)
    }

    /// Inclusion proof for the node at `(level, index)`.
    pub fn get_merkle_proof(
        &self,
        level: u8,
        index: u64,
    ) -> CostResult<MerkleProof, MerkleTreeError> {
        node_reader::get_merkle_proof(self, level, index)
    }

    /// Delta proof for replacing the node at `(level, index)` with
    /// `new_value`, without writing anything.
    pub fn get_delta_merkle_proof(
        &self,
        level: u8,
        index: u64,
        new_value: impl Into<NodeValue>,
    ) -> CostResult<DeltaMerkleProof, MerkleTreeError> {
        node_reader::get_delta_merkle_proof(self, level, index, new_value.into())
    }

    /// Set the leaf at `index` to `value` and return the transition proof.
    ///
    /// Walks from the leaf up to level 1, staging the recomputed path node and
    /// reading its sibling at each level, then stages the new root. Siblings
    /// are off the path, so reading them before the batch lands is sound. The
    /// batch is applied in one write only after every read succeeded; a
    /// failed read leaves the store untouched.
    pub fn set_leaf(
        &mut self,
        index: u64,
        value: impl Into<NodeValue>,
    ) -> CostResult<DeltaMerkleProof, MerkleTreeError> {
        let mut cost = OperationCost::default();
        let height = self.height();
        let new_value = value.into();
        cost_return_on_error_no_add!(&cost, validate_coordinate(height, height, index));

        let old_root = cost_return_on_error!(&mut cost, self.store.get(0, 0));
        let old_value = cost_return_on_error!(&mut cost, self.store.get(height, index));

        let mut batch = NodeBatch::with_capacity(height as usize + 1);
        let mut siblings = Vec::with_capacity(height as usize);
        let mut current_index = index;
        let mut current_value = new_value.clone();
        for level in (1..=height).rev() {
            batch.put(
                NodeCoordinate::new(level, current_index),
                current_value.clone(),
            );
            let sibling = cost_return_on_error!(
                &mut cost,
                self.store.get(level, current_index ^ 1)
            );
            current_value = hash_with_sibling(current_index, &current_value, &sibling);
            cost.hash_node_calls += 1;
            siblings.push(sibling);
            current_index /= 2;
        }
        batch.put(NodeCoordinate::ROOT, current_value.clone());

        cost_return_on_error!(&mut cost, self.store.apply(batch));

        tracing::debug!(index, height, new_root = %current_value, "set leaf");

        Ok(DeltaMerkleProof {
            index,
            siblings,
            old_root,
            old_value,
            new_root: current_value,
            new_value,
        })
        .wrap_with_cost(cost)
    }
}

impl<S: NodeStore> NodeReader for ZeroMerkleTree<S> {
    fn height(&self) -> u8 {
        self.store.height()
    }

    fn read_node(&self, level: u8, index: u64) -> CostResult<NodeValue, MerkleTreeError> {
        self.node(level, index)
    }
}
