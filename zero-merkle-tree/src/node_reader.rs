//! Proof generation over any tree that can read its nodes.
//!
//! Each tree type implements [`NodeReader`] on its own terms (recursive
//! hashing, a node store with zero defaults, ...). The proof builders here only
//! need node reads plus the shared fold kernel.

use zmt_costs::{CostResult, CostsExt, OperationCost, cost_return_on_error, cost_return_on_error_no_add};

use crate::{
    DeltaMerkleProof, MerkleProof, MerkleTreeError, NodeValue,
    coordinate::{merkle_path_of_node, validate_coordinate},
    proof::compute_merkle_root_from_proof,
};

/// Read access to the node values of a fixed-height tree.
pub trait NodeReader {
    /// Height of the tree; leaves live at this level.
    fn height(&self) -> u8;

    /// Value of the node at `(level, index)`.
    fn read_node(&self, level: u8, index: u64) -> CostResult<NodeValue, MerkleTreeError>;
}

/// Inclusion proof for the node at `(level, index)`.
///
/// The proof has `level` siblings, so leaf proofs carry `height` of them.
pub fn get_merkle_proof<R: NodeReader + ?Sized>(
    reader: &R,
    level: u8,
    index: u64,
) -> CostResult<MerkleProof, MerkleTreeError> {
    let mut cost = OperationCost::default();
    cost_return_on_error_no_add!(&cost, validate_coordinate(reader.height(), level, index));

    let value = cost_return_on_error!(&mut cost, reader.read_node(level, index));

    let mut siblings = Vec::with_capacity(level as usize);
    for node in merkle_path_of_node(level, index) {
        let sibling = cost_return_on_error_no_add!(&cost, node.sibling());
        let sibling_value =
            cost_return_on_error!(&mut cost, reader.read_node(sibling.level, sibling.index));
        siblings.push(sibling_value);
    }

    let root = cost_return_on_error!(&mut cost, reader.read_node(0, 0));

    Ok(MerkleProof {
        root,
        siblings,
        index,
        value,
    })
    .wrap_with_cost(cost)
}

/// Delta proof for replacing the node at `(level, index)` with `new_value`.
///
/// Nothing is written; the new root is folded from the current siblings.
pub fn get_delta_merkle_proof<R: NodeReader + ?Sized>(
    reader: &R,
    level: u8,
    index: u64,
    new_value: NodeValue,
) -> CostResult<DeltaMerkleProof, MerkleTreeError> {
    get_merkle_proof(reader, level, index).flat_map_ok(|proof| {
        let new_root = compute_merkle_root_from_proof(&proof.siblings, index, &new_value);
        let fold_cost = OperationCost::with_hash_node_calls(proof.siblings.len() as u32);
        Ok(DeltaMerkleProof {
            index,
            siblings: proof.siblings,
            old_root: proof.root,
            old_value: proof.value,
            new_root,
            new_value,
        })
        .wrap_with_cost(fold_cost)
    })
}
