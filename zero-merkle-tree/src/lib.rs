//! Binary Merkle trees with inclusion and delta proofs.
//!
//! Three tree types share one proof algebra:
//!
//! - [`DenseMerkleTree`] is built once from all `2^height` leaves and
//!   recomputes nodes on demand.
//! - [`ZeroMerkleTree`] stores only the nodes that were written and reads every
//!   other node as the zero hash of its depth. Leaves are updated in place with
//!   [`ZeroMerkleTree::set_leaf`].
//! - [`AppendOnlyMerkleTree`] keeps only the proof of its last leaf and derives
//!   the next proof from it on every append.
//!
//! # Architecture
//!
//! - Nodes are addressed by `(level, index)`, level 0 being the root
//! - Two nodes hash to `hex(sha256(left || right))`, see [`hash_nodes`]
//! - Proof folding and verification live in [`proof`] and are used by all
//!   three trees
//! - Proof generation is written once against the [`NodeReader`] trait
//! - Operations report hashes and node store accesses as an [`OperationCost`]

mod append_only;
mod coordinate;
mod dense;
mod error;
mod hash;
pub mod node_reader;
pub mod node_store;
pub mod proof;
mod zero_tree;

#[cfg(test)]
mod tests;

pub use append_only::{AppendOnlyMerkleTree, Frontier};
pub use coordinate::{NodeCoordinate, merkle_path_of_node, node_key, sibling_node};
pub use dense::DenseMerkleTree;
pub use error::MerkleTreeError;
pub use hash::{MAX_HEIGHT, NodeValue, hash_nodes, zero_hashes};
pub use node_reader::NodeReader;
pub use node_store::{MemNodeStore, NodeBatch, NodeStore, SparseNodeStore};
pub use proof::{
    DeltaMerkleProof, MerkleProof, compute_merkle_path_from_proof,
    compute_merkle_root_from_proof, verify_delta_merkle_proof, verify_merkle_proof,
};
pub use zero_tree::ZeroMerkleTree;
pub use zmt_costs::{CostContext, CostResult, CostsExt, OperationCost};
