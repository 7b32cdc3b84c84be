
use crate::{DenseMerkleTree, NodeValue, ZeroMerkleTree};

/// Distinct leaf values, so no two subtrees of a test tree hash alike.
fn distinct_leaves(seed: u32, count: u64) -> Vec<NodeValue> {
    (0..count)
        .map(|i| NodeValue::from(format!("{seed}-{i}")))
        .collect()
}

fn dense_tree(height: u8, leaves: &[NodeValue]) -> DenseMerkleTree {
    DenseMerkleTree::new(height, leaves.iter().cloned()).expect("dense tree")
}

/// A zero-default tree with `leaves` set from index 0.
fn zero_tree(height: u8, leaves: &[NodeValue]) -> ZeroMerkleTree {
    let mut tree = ZeroMerkleTree::new(height).expect("zero tree");
    for (index, leaf) in leaves.iter().enumerate() {
        tree.set_leaf(index as u64, leaf).unwrap().expect("set leaf");
    }
    tree
}
