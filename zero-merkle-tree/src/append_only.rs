//! Append-only Merkle tree that keeps only the frontier.
//!
//! Leaves are appended strictly left to right, so every subtree to the right
//! of the last leaf is still empty and hashes to the zero hash of its depth.
//! The inclusion proof of the last appended leaf is therefore enough to derive
//! the proof of the next one, and no node store is needed at all.

use zmt_costs::{CostResult, CostsExt, OperationCost, cost_return_on_error_no_add};

use crate::{
    DeltaMerkleProof, MerkleProof, MerkleTreeError, NodeValue,
    coordinate::index_fits_level,
    hash::{capacity_for_height, validate_height, zero_hashes},
    proof::{compute_merkle_path_from_proof, compute_merkle_root_from_proof},
};

/// Inclusion proof of the most recently appended leaf.
///
/// `index` is `None` until the first append. The empty frontier is the proof
/// of a would-be leaf in an empty tree: its siblings are `Z[0..height]` and
/// both its value and root are `Z[height]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frontier {
    /// Index of the last appended leaf, `None` for an empty tree.
    pub index: Option<u64>,
    /// Siblings of the last leaf's path, leaf-adjacent first.
    pub siblings: Vec<NodeValue>,
    /// Value of the last leaf.
    pub value: NodeValue,
    /// Current root.
    pub root: NodeValue,
}

impl Frontier {
    /// The frontier of an empty tree, built from its zero-hash table.
    ///
    /// `zero_hashes` must hold `Z[0..=height]`.
    fn empty(zero_hashes: &[NodeValue]) -> Result<Self, MerkleTreeError> {
        let (top, siblings) = zero_hashes.split_last().ok_or_else(|| {
            MerkleTreeError::CorruptedData("zero-hash table is empty".to_owned())
        })?;
        Ok(Frontier {
            index: None,
            siblings: siblings.to_vec(),
            value: top.clone(),
            root: top.clone(),
        })
    }

    /// The frontier as an inclusion proof, or `None` for an empty tree.
    pub fn to_proof(&self) -> Option<MerkleProof> {
        self.index.map(|index| MerkleProof {
            root: self.root.clone(),
            siblings: self.siblings.clone(),
            index,
            value: self.value.clone(),
        })
    }
}

/// A Merkle tree that only supports appending leaves.
#[derive(Debug, Clone)]
pub struct AppendOnlyMerkleTree {
    height: u8,
    zero_hashes: Vec<NodeValue>,
    frontier: Frontier,
}

impl AppendOnlyMerkleTree {
    /// Create an empty tree of `height`.
    pub fn new(height: u8) -> Result<Self, MerkleTreeError> {
        let frontier = Self::empty_frontier(height)?;
        Ok(Self {
            height,
            zero_hashes: zero_hashes(height),
            frontier,
        })
    }

    /// Resume a tree from the proof of its last appended leaf, as returned by
    /// [`last_proof`](Self::last_proof) or [`DeltaMerkleProof::new_proof`].
    ///
    /// The proof must verify, carry exactly `height` siblings and describe
    /// the rightmost leaf: every subtree to its right has to be empty.
    pub fn from_last_proof(height: u8, proof: MerkleProof) -> Result<Self, MerkleTreeError> {
        validate_height(height)?;
        if proof.siblings.len() != height as usize {
            return Err(MerkleTreeError::InvalidProof(format!(
                "expected {} siblings, got {}",
                height,
                proof.siblings.len()
            )));
        }
        if !index_fits_level(proof.index, height) {
            return Err(MerkleTreeError::InvalidProof(format!(
                "index {} is not a leaf of a tree of height {}",
                proof.index, height
            )));
        }
        if !proof.verify() {
            return Err(MerkleTreeError::InvalidProof(
                "siblings do not fold to the root".to_owned(),
            ));
        }
        let zero_hashes = zero_hashes(height);
        // everything right of the last leaf is empty, so every left-child
        // path node must have a zero sibling
        for (level, (sibling, zero)) in proof.siblings.iter().zip(&zero_hashes).enumerate() {
            if (proof.index >> level) % 2 == 0 && sibling != zero {
                return Err(MerkleTreeError::InvalidProof(format!(
                    "leaf {} has a non-empty right sibling at depth {}",
                    proof.index, level
                )));
            }
        }
        Ok(Self {
            height,
            zero_hashes,
            frontier: Frontier {
                index: Some(proof.index),
                siblings: proof.siblings,
                value: proof.value,
                root: proof.root,
            },
        })
    }

    /// The frontier of an empty tree of `height`.
    pub fn empty_frontier(height: u8) -> Result<Frontier, MerkleTreeError> {
        validate_height(height)?;
        Frontier::empty(&zero_hashes(height))
    }

    /// Height of the tree.
    pub fn height(&self) -> u8 {
        self.height
    }

    /// The zero-hash table `Z[0..=height]`.
    pub fn zero_hashes(&self) -> &[NodeValue] {
        &self.zero_hashes
    }

    /// Maximum number of leaves, `2^height`.
    pub fn capacity(&self) -> u64 {
        capacity_for_height(self.height)
    }

    /// Number of leaves appended so far.
    pub fn leaf_count(&self) -> u64 {
        self.frontier.index.map_or(0, |index| index + 1)
    }

    /// Current root.
    pub fn root(&self) -> &NodeValue {
        &self.frontier.root
    }

    /// Current frontier.
    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    /// Inclusion proof of the last appended leaf, `None` for an empty tree.
    pub fn last_proof(&self) -> Option<MerkleProof> {
        self.frontier.to_proof()
    }

    /// Append `value` as the next leaf and return the transition proof.
    ///
    /// The old value in the returned proof is always [`NodeValue::zero`].
    /// Fails with [`MerkleTreeError::TreeFull`] once `2^height` leaves have
    /// been appended; the tree is unchanged in that case.
    pub fn append_leaf(
        &mut self,
        value: impl Into<NodeValue>,
    ) -> CostResult<DeltaMerkleProof, MerkleTreeError> {
        let mut cost = OperationCost::default();
        let new_value = value.into();
        let previous = self.frontier.index;
        let new_index = previous.map_or(0, |index| index + 1);

        if new_index >= self.capacity() {
            let capacity = self.capacity();
            tracing::warn!(capacity, "append refused, tree is full");
            return Err(MerkleTreeError::TreeFull { capacity }).wrap_with_cost(cost);
        }

        let old_path = match previous {
            Some(index) => {
                cost.hash_node_calls += self.height as u32;
                compute_merkle_path_from_proof(
                    &self.frontier.siblings,
                    index,
                    &self.frontier.value,
                )
            }
            None => Vec::new(),
        };

        let mut siblings = Vec::with_capacity(self.height as usize);
        for level in 0..self.height {
            let new_ancestor = new_index >> level;
            let sibling = if previous.map(|index| index >> level) == Some(new_ancestor) {
                self.frontier.siblings.get(level as usize)
            } else if new_ancestor % 2 == 0 {
                self.zero_hashes.get(level as usize)
            } else {
                old_path.get(level as usize)
            };
            let sibling = cost_return_on_error_no_add!(
                &cost,
                sibling.cloned().ok_or_else(|| {
                    MerkleTreeError::CorruptedData(format!(
                        "frontier has no sibling at depth {level}"
                    ))
                })
            );
            siblings.push(sibling);
        }

        let new_root = compute_merkle_root_from_proof(&siblings, new_index, &new_value);
        cost.hash_node_calls += self.height as u32;

        let old_root = std::mem::replace(&mut self.frontier.root, new_root.clone());
        self.frontier.index = Some(new_index);
        self.frontier.siblings = siblings.clone();
        self.frontier.value = new_value.clone();

        tracing::debug!(index = new_index, new_root = %new_root, "appended leaf");

        Ok(DeltaMerkleProof {
            index: new_index,
            siblings,
            old_root,
            old_value: NodeValue::zero(),
            new_root,
            new_value,
        })
        .wrap_with_cost(cost)
    }
}
