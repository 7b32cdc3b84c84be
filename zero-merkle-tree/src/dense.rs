//! Dense Merkle tree built once from a complete leaf array.

use zmt_costs::{CostResult, CostsExt, OperationCost, cost_return_on_error_no_add};

use crate::{
    DeltaMerkleProof, MerkleProof, MerkleTreeError, NodeValue,
    coordinate::{NodeCoordinate, validate_coordinate},
    hash::{capacity_for_height, hash_nodes, validate_height},
    node_reader::{self, NodeReader},
};

/// A Merkle tree over a fixed array of `2^height` leaves.
///
/// Node values are recomputed from the leaves on every read; nothing but the
/// leaves is stored. Reading a node at level `L` costs `2^(height - L) - 1`
/// hashes, so this type suits small trees and reference computations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DenseMerkleTree {
    height: u8,
    leaves: Vec<NodeValue>,
}

impl DenseMerkleTree {
    /// Build a tree of `height` over `leaves`.
    ///
    /// Fails unless exactly `2^height` leaves are given.
    pub fn new<I, V>(height: u8, leaves: I) -> Result<Self, MerkleTreeError>
    where
        I: IntoIterator<Item = V>,
        V: Into<NodeValue>,
    {
        validate_height(height)?;
        let leaves: Vec<NodeValue> = leaves.into_iter().map(Into::into).collect();
        let expected = capacity_for_height(height);
        if leaves.len() as u64 != expected {
            return Err(MerkleTreeError::LeafCountMismatch {
                expected,
                actual: leaves.len() as u64,
            });
        }
        Ok(Self { height, leaves })
    }

    /// Height of the tree.
    pub fn height(&self) -> u8 {
        self.height
    }

    /// The leaf values, left to right.
    pub fn leaves(&self) -> &[NodeValue] {
        &self.leaves
    }

    /// Value of the node at `(level, index)`.
    ///
    /// Leaves are returned as stored; every other node is
    /// `hash(node(level + 1, 2 * index), node(level + 1, 2 * index + 1))`.
    pub fn node(&self, level: u8, index: u64) -> CostResult<NodeValue, MerkleTreeError> {
        let mut cost = OperationCost::default();
        cost_return_on_error_no_add!(&cost, validate_coordinate(self.height, level, index));
        self.subtree_value(level, index, &mut cost)
            .wrap_with_cost(cost)
    }

    /// The root value, `node(0, 0)`.
    pub fn root(&self) -> CostResult<NodeValue, MerkleTreeError> {
        self.node(0, 0)
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
    /// `new_value`. The tree itself is left untouched.
    pub fn get_delta_merkle_proof(
        &self,
        level: u8,
        index: u64,
        new_value: impl Into<NodeValue>,
    ) -> CostResult<DeltaMerkleProof, MerkleTreeError> {
        node_reader::get_delta_merkle_proof(self, level, index, new_value.into())
    }

    fn subtree_value(
        &self,
        level: u8,
        index: u64,
        cost: &mut OperationCost,
    ) -> Result<NodeValue, MerkleTreeError> {
        if level == self.height {
            return usize::try_from(index)
                .ok()
                .and_then(|i| self.leaves.get(i))
                .cloned()
                .ok_or(MerkleTreeError::IndexOutOfRange { level, index });
        }
        let (left, right) = NodeCoordinate::new(level, index).children();
        let left = self.subtree_value(left.level, left.index, cost)?;
        let right = self.subtree_value(right.level, right.index, cost)?;
        cost.hash_node_calls += 1;
        Ok(hash_nodes(&left, &right))
    }
}

impl NodeReader for DenseMerkleTree {
    fn height(&self) -> u8 {
        self.height
    }

    fn read_node(&self, level: u8, index: u64) -> CostResult<NodeValue, MerkleTreeError> {
        self.node(level, index)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::{verify_delta_merkle_proof, verify_merkle_proof};

    const GOLDEN_ROOT: &str = "e13a7ff32c9c1f59df2d785a1436fc2f5489c469babe9d62283474c4b8e66b81";

    fn fixture() -> DenseMerkleTree {
        DenseMerkleTree::new(3, [1u64, 3, 3, 7, 4, 2, 0, 6]).expect("height 3 with 8 leaves")
    }

    fn node(tree: &DenseMerkleTree, level: u8, index: u64) -> NodeValue {
        tree.node(level, index).unwrap().expect("node in range")
    }

    #[test]
    fn test_golden_root() {
        let root = fixture().root().unwrap().expect("root");
        assert_eq!(root, GOLDEN_ROOT);
        assert_eq!(root.as_str().len(), 64);
    }

    #[test]
    fn test_root_is_deterministic() {
        let a = fixture().root().unwrap().expect("root a");
        let b = fixture().root().unwrap().expect("root b");
        assert_eq!(a, b);
    }

    #[test]
    fn test_changing_a_leaf_changes_the_root() {
        let original = fixture().root().unwrap().expect("root");
        let changed = DenseMerkleTree::new(3, [1u64, 3, 3, 7, 4, 2, 0, 1])
            .expect("tree")
            .root()
            .unwrap()
            .expect("root");
        assert_ne!(original, changed);
    }

    #[test]
    fn test_node_hashes_children() {
        let tree = fixture();
        assert_eq!(node(&tree, 3, 3), "7");
        assert_eq!(
            node(&tree, 2, 1),
            hash_nodes(&NodeValue::from(3u64), &NodeValue::from(7u64))
        );
        assert_eq!(
            node(&tree, 0, 0),
            hash_nodes(&node(&tree, 1, 0), &node(&tree, 1, 1))
        );
    }

    #[test]
    fn test_node_cost_counts_hashes() {
        let tree = fixture();
        assert_eq!(tree.root().cost.hash_node_calls, 7);
        assert_eq!(tree.node(1, 1).cost.hash_node_calls, 3);
        assert!(tree.node(3, 0).cost.is_nothing());
    }

    #[test]
    fn test_proof_siblings_order() {
        let tree = fixture();
        let proof = tree.get_merkle_proof(3, 5).unwrap().expect("proof");
        assert_eq!(
            proof.siblings,
            vec![node(&tree, 3, 4), node(&tree, 2, 3), node(&tree, 1, 0)]
        );
        assert_eq!(proof.root, GOLDEN_ROOT);
        assert_eq!(proof.value, "2");
        assert_eq!(proof.index, 5);
        assert!(verify_merkle_proof(&proof));
    }

    #[test]
    fn test_proof_of_internal_node() {
        let tree = fixture();
        let proof = tree.get_merkle_proof(1, 1).unwrap().expect("proof");
        assert_eq!(proof.siblings, vec![node(&tree, 1, 0)]);
        assert!(proof.verify());

        let root_proof = tree.get_merkle_proof(0, 0).unwrap().expect("root proof");
        assert!(root_proof.siblings.is_empty());
        assert_eq!(root_proof.value, root_proof.root);
        assert!(root_proof.verify());
    }

    #[test]
    fn test_delta_proof() {
        let tree = fixture();
        let delta = tree
            .get_delta_merkle_proof(3, 7, 1u64)
            .unwrap()
            .expect("delta proof");
        assert_eq!(delta.old_value, "6");
        assert_eq!(delta.old_root, GOLDEN_ROOT);
        assert!(verify_delta_merkle_proof(&delta));

        let updated = DenseMerkleTree::new(3, [1u64, 3, 3, 7, 4, 2, 0, 1]).expect("tree");
        assert_eq!(delta.new_root, updated.root().unwrap().expect("root"));
    }

    #[test]
    fn test_out_of_range() {
        let tree = fixture();
        assert_matches!(
            tree.node(3, 8).unwrap(),
            Err(MerkleTreeError::IndexOutOfRange { level: 3, index: 8 })
        );
        assert_matches!(
            tree.node(4, 0).unwrap(),
            Err(MerkleTreeError::LevelOutOfRange { .. })
        );
        assert_matches!(
            tree.get_merkle_proof(2, 4).unwrap(),
            Err(MerkleTreeError::IndexOutOfRange { .. })
        );
    }

    #[test]
    fn test_leaf_count_mismatch() {
        assert_matches!(
            DenseMerkleTree::new(3, [1u64, 2, 3]),
            Err(MerkleTreeError::LeafCountMismatch {
                expected: 8,
                actual: 3
            })
        );
    }

    #[test]
    fn test_height_zero_tree_is_its_leaf() {
        let tree = DenseMerkleTree::new(0, ["only"]).expect("height 0");
        assert_eq!(tree.root().unwrap().expect("root"), "only");
    }
}
