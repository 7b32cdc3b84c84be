//! Inclusion and delta proofs, and the fold kernel every tree shares.
//!
//! A proof carries the sibling of every node on a leaf's Merkle path, ordered
//! from the leaf-adjacent sibling to the root-adjacent one. Folding the leaf
//! value up through the siblings, using the bits of the leaf index to decide
//! left/right order at each level, recomputes the root.

use bincode::{Decode, Encode};

use crate::{
    MerkleTreeError, NodeValue,
    coordinate::index_fits_level,
    hash::{MAX_HEIGHT, hash_nodes},
};

/// Proof that `value` sits at `index` in the tree whose root is `root`.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct MerkleProof {
    /// The root the proof claims.
    pub root: NodeValue,
    /// Siblings of the Merkle path, leaf-adjacent first.
    pub siblings: Vec<NodeValue>,
    /// Index of the proved node within its level.
    pub index: u64,
    /// Value of the proved node.
    pub value: NodeValue,
}

/// Proof that changing the node at `index` from `old_value` to `new_value`
/// moved the root from `old_root` to `new_root`.
///
/// The siblings are shared by both states: a single-node change only rewrites
/// that node's own path.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct DeltaMerkleProof {
    /// Index of the changed node within its level.
    pub index: u64,
    /// Siblings of the Merkle path, leaf-adjacent first.
    pub siblings: Vec<NodeValue>,
    /// Root before the change.
    pub old_root: NodeValue,
    /// Node value before the change.
    pub old_value: NodeValue,
    /// Root after the change.
    pub new_root: NodeValue,
    /// Node value after the change.
    pub new_value: NodeValue,
}

/// Combine a path node with its sibling: the path node goes on the left when
/// its index is even.
pub(crate) fn hash_with_sibling(index: u64, value: &NodeValue, sibling: &NodeValue) -> NodeValue {
    if index % 2 == 0 {
        hash_nodes(value, sibling)
    } else {
        hash_nodes(sibling, value)
    }
}

/// Fold `value` at `index` up through `siblings` and return the implied root.
///
/// Costs exactly `siblings.len()` node hashes.
pub fn compute_merkle_root_from_proof(
    siblings: &[NodeValue],
    index: u64,
    value: &NodeValue,
) -> NodeValue {
    let mut current_index = index;
    let mut current_value = value.clone();
    for sibling in siblings {
        current_value = hash_with_sibling(current_index, &current_value, sibling);
        current_index /= 2;
    }
    current_value
}

/// Same fold as [`compute_merkle_root_from_proof`], returning every
/// intermediate value: the starting value first and the root last
/// (`siblings.len() + 1` entries).
pub fn compute_merkle_path_from_proof(
    siblings: &[NodeValue],
    index: u64,
    value: &NodeValue,
) -> Vec<NodeValue> {
    let mut path = Vec::with_capacity(siblings.len() + 1);
    let mut current_index = index;
    let mut current_value = value.clone();
    path.push(current_value.clone());
    for sibling in siblings {
        current_value = hash_with_sibling(current_index, &current_value, sibling);
        path.push(current_value.clone());
        current_index /= 2;
    }
    path
}

/// Check an inclusion proof.
///
/// Besides the fold, the index must be addressable at the depth implied by
/// the sibling count; otherwise high index bits would be silently ignored.
pub fn verify_merkle_proof(proof: &MerkleProof) -> bool {
    if proof.siblings.len() > MAX_HEIGHT as usize
        || !index_fits_level(proof.index, proof.siblings.len() as u8)
    {
        return false;
    }
    compute_merkle_root_from_proof(&proof.siblings, proof.index, &proof.value) == proof.root
}

/// Check a delta proof: the old and the new state must each verify as an
/// inclusion proof over the shared siblings.
pub fn verify_delta_merkle_proof(delta: &DeltaMerkleProof) -> bool {
    verify_merkle_proof(&delta.old_proof()) && verify_merkle_proof(&delta.new_proof())
}

impl MerkleProof {
    /// Shorthand for [`verify_merkle_proof`].
    pub fn verify(&self) -> bool {
        verify_merkle_proof(self)
    }

    /// Depth of the proved node, i.e. the number of siblings.
    pub fn depth(&self) -> usize {
        self.siblings.len()
    }

    /// Encode to bytes using bincode.
    pub fn encode_to_vec(&self) -> Result<Vec<u8>, MerkleTreeError> {
        bincode::encode_to_vec(self, bincode_config())
            .map_err(|e| MerkleTreeError::CorruptedData(format!("encode error: {}", e)))
    }

    /// Decode from bytes using bincode.
    ///
    /// Rejects proofs with more than [`MAX_HEIGHT`] siblings or an index that
    /// does not fit the proof depth.
    pub fn decode_from_slice(bytes: &[u8]) -> Result<Self, MerkleTreeError> {
        let (proof, _): (Self, _) = bincode::decode_from_slice(bytes, bincode_config())
            .map_err(|e| MerkleTreeError::CorruptedData(format!("decode error: {}", e)))?;
        validate_shape(proof.siblings.len(), proof.index)?;
        Ok(proof)
    }
}

impl DeltaMerkleProof {
    /// The inclusion proof of the state before the change.
    pub fn old_proof(&self) -> MerkleProof {
        MerkleProof {
            root: self.old_root.clone(),
            siblings: self.siblings.clone(),
            index: self.index,
            value: self.old_value.clone(),
        }
    }

    /// The inclusion proof of the state after the change.
    pub fn new_proof(&self) -> MerkleProof {
        MerkleProof {
            root: self.new_root.clone(),
            siblings: self.siblings.clone(),
            index: self.index,
            value: self.new_value.clone(),
        }
    }

    /// Shorthand for [`verify_delta_merkle_proof`].
    pub fn verify(&self) -> bool {
        verify_delta_merkle_proof(self)
    }

    /// Encode to bytes using bincode.
    pub fn encode_to_vec(&self) -> Result<Vec<u8>, MerkleTreeError> {
        bincode::encode_to_vec(self, bincode_config())
            .map_err(|e| MerkleTreeError::CorruptedData(format!("encode error: {}", e)))
    }

    /// Decode from bytes using bincode.
    ///
    /// Applies the same shape checks as [`MerkleProof::decode_from_slice`].
    pub fn decode_from_slice(bytes: &[u8]) -> Result<Self, MerkleTreeError> {
        let (delta, _): (Self, _) = bincode::decode_from_slice(bytes, bincode_config())
            .map_err(|e| MerkleTreeError::CorruptedData(format!("decode error: {}", e)))?;
        validate_shape(delta.siblings.len(), delta.index)?;
        Ok(delta)
    }
}

fn bincode_config() -> impl bincode::config::Config {
    bincode::config::standard()
        .with_big_endian()
        .with_limit::<{ 16 * 1024 * 1024 }>()
}

fn validate_shape(depth: usize, index: u64) -> Result<(), MerkleTreeError> {
    if depth > MAX_HEIGHT as usize {
        return Err(MerkleTreeError::InvalidProof(format!(
            "proof has {} siblings, at most {} allowed",
            depth, MAX_HEIGHT
        )));
    }
    if !index_fits_level(index, depth as u8) {
        return Err(MerkleTreeError::InvalidProof(format!(
            "index {} is not addressable with {} siblings",
            index, depth
        )));
    }
    Ok(())
}
