//! Tree coordinates and the level/index arithmetic.
//!
//! Level 0 is the root and level `height` holds the leaves. At level `L` the
//! valid indices are `[0, 2^L)`.
//!
//! ```text
//! Level 0:          N(0,0)
//! Level 1:     N(1,0)     N(1,1)
//! Level 2:  N(2,0) N(2,1) N(2,2) N(2,3)
//! ```

use crate::{MerkleTreeError, hash::MAX_HEIGHT};

/// A node position: `(level, index)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeCoordinate {
    /// Depth of the node, 0 = root.
    pub level: u8,
    /// Position of the node within its level, counted from the left.
    pub index: u64,
}

impl NodeCoordinate {
    /// The root coordinate `(0, 0)`.
    pub const ROOT: NodeCoordinate = NodeCoordinate { level: 0, index: 0 };

    /// Create a coordinate.
    pub fn new(level: u8, index: u64) -> Self {
        NodeCoordinate { level, index }
    }

    /// The parent `(level - 1, index / 2)`, or `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        if self.level == 0 {
            return None;
        }
        Some(NodeCoordinate::new(self.level - 1, self.index / 2))
    }

    /// The children `(level + 1, 2 * index)` and `(level + 1, 2 * index + 1)`.
    pub fn children(&self) -> (Self, Self) {
        let left = NodeCoordinate::new(self.level + 1, self.index * 2);
        let right = NodeCoordinate::new(self.level + 1, self.index * 2 + 1);
        (left, right)
    }

    /// The sibling coordinate. Fails for the root.
    pub fn sibling(&self) -> Result<Self, MerkleTreeError> {
        sibling_node(self.level, self.index)
    }
}

/// The ancestor chain of a node, from the node itself up to but excluding the
/// root.
///
/// When a node changes, every node on this chain changes with it. The result
/// has `level` entries.
pub fn merkle_path_of_node(level: u8, index: u64) -> Vec<NodeCoordinate> {
    let mut path = Vec::with_capacity(level as usize);
    let mut current = NodeCoordinate::new(level, index);
    while let Some(parent) = current.parent() {
        path.push(current);
        current = parent;
    }
    path
}

/// The sibling of `(level, index)`: `index + 1` for even indices and
/// `index - 1` for odd ones.
pub fn sibling_node(level: u8, index: u64) -> Result<NodeCoordinate, MerkleTreeError> {
    if level == 0 {
        return Err(MerkleTreeError::RootHasNoSibling);
    }
    // flipping the lowest bit covers both cases
    Ok(NodeCoordinate::new(level, index ^ 1))
}

/// Check that `(level, index)` addresses a node of a tree of `height`.
pub(crate) fn validate_coordinate(height: u8, level: u8, index: u64) -> Result<(), MerkleTreeError> {
    if level > height {
        return Err(MerkleTreeError::LevelOutOfRange { level, height });
    }
    if !index_fits_level(index, level) {
        return Err(MerkleTreeError::IndexOutOfRange { level, index });
    }
    Ok(())
}

/// Whether `index < 2^level`.
pub(crate) fn index_fits_level(index: u64, level: u8) -> bool {
    if level as u32 >= u64::BITS {
        return true;
    }
    index >> level == 0
}

/// Build the node store key for a coordinate.
///
/// Format: level (1 byte) followed by the index as u64 big-endian (8 bytes),
/// so keys of one level sort by index.
pub fn node_key(level: u8, index: u64) -> [u8; 9] {
    debug_assert!(level <= MAX_HEIGHT);
    let mut key = [0u8; 9];
    key[0] = level;
    key[1..].copy_from_slice(&index.to_be_bytes());
    key
}
