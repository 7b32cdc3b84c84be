//! Node values, the node hash and the zero-hash table.
//!
//! Leaf values and digests are both opaque strings. Two nodes are combined as
//! `hex(sha256(left || right))` where `left` and `right` are the canonical
//! string renderings of the children, concatenated without a separator.

use std::fmt;

use bincode::{Decode, Encode};
use sha2::{Digest, Sha256};

use crate::MerkleTreeError;

/// Largest supported tree height. Leaf indices of a tree of this height still
/// fit in a `u64`.
pub const MAX_HEIGHT: u8 = 63;

/// The value of a tree node: a leaf value or a hex-encoded digest.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Encode, Decode)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct NodeValue(String);

impl NodeValue {
    /// Wrap a canonical string rendering.
    pub fn new(value: impl Into<String>) -> Self {
        NodeValue(value.into())
    }

    /// The empty-leaf base value, the literal `"0"`.
    ///
    /// This is `Z[0]` in the zero-hash table and the old value reported by
    /// every append.
    pub fn zero() -> Self {
        NodeValue("0".to_owned())
    }

    /// Borrow the canonical string rendering.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the value and return the canonical string rendering.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for NodeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NodeValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for NodeValue {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for NodeValue {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl From<&str> for NodeValue {
    fn from(value: &str) -> Self {
        NodeValue(value.to_owned())
    }
}

impl From<String> for NodeValue {
    fn from(value: String) -> Self {
        NodeValue(value)
    }
}

impl From<&NodeValue> for NodeValue {
    fn from(value: &NodeValue) -> Self {
        value.clone()
    }
}

macro_rules! node_value_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for NodeValue {
                fn from(value: $t) -> Self {
                    NodeValue(value.to_string())
                }
            }
        )*
    };
}

node_value_from_int!(u8, u16, u32, u64, usize, i32, i64);

/// Hash two child values into their parent: `hex(sha256(left || right))`.
pub fn hash_nodes(left: &NodeValue, right: &NodeValue) -> NodeValue {
    let mut hasher = Sha256::new();
    hasher.update(left.as_str().as_bytes());
    hasher.update(right.as_str().as_bytes());
    NodeValue(hex::encode(hasher.finalize()))
}

/// Compute the zero-hash table `Z[0..=height]`.
///
/// `Z[0]` is [`NodeValue::zero`] and `Z[k] = hash(Z[k-1], Z[k-1])`, the value
/// of any subtree of depth `k` whose leaves are all empty.
pub fn zero_hashes(height: u8) -> Vec<NodeValue> {
    let mut hashes = Vec::with_capacity(height as usize + 1);
    let mut current = NodeValue::zero();
    hashes.push(current.clone());
    for _ in 0..height {
        current = hash_nodes(&current, &current);
        hashes.push(current.clone());
    }
    tracing::trace!(height, empty_root = %current, "computed zero hashes");
    hashes
}

/// Validate that height is at most [`MAX_HEIGHT`].
pub(crate) fn validate_height(height: u8) -> Result<(), MerkleTreeError> {
    if height > MAX_HEIGHT {
        return Err(MerkleTreeError::InvalidHeight {
            height,
            max: MAX_HEIGHT,
        });
    }
    Ok(())
}

/// Number of leaves in a tree of the given height. Height must be valid.
pub(crate) fn capacity_for_height(height: u8) -> u64 {
    1u64 << height
}
