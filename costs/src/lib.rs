#![deny(missing_docs)]
//! Cost accounting for Merkle tree operations.
//!
//! Every tree operation that hashes nodes or touches a node store reports
//! what it did through an [`OperationCost`] wrapped around its result in a
//! [`CostContext`]. Callers can accumulate costs across calls with
//! [`CostContext::unwrap_add_cost`] or drop them with
//! [`CostContext::unwrap`].

pub mod context;

use std::ops::{Add, AddAssign};

pub use context::{CostContext, CostResult, CostsExt};

/// Resources consumed by a tree operation.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub struct OperationCost {
    /// How many times two node values were hashed into a parent.
    pub hash_node_calls: u32,
    /// How many node values were looked up in a node store.
    pub node_reads: u32,
    /// How many node values were written to a node store.
    pub node_writes: u32,
}

impl OperationCost {
    /// Returns `true` if the operation did no work at all.
    pub fn is_nothing(&self) -> bool {
        self == &Self::default()
    }

    /// Helper function to build default `OperationCost` with different
    /// `hash_node_calls`.
    pub fn with_hash_node_calls(hash_node_calls: u32) -> Self {
        OperationCost {
            hash_node_calls,
            ..Default::default()
        }
    }

    /// Helper function to build default `OperationCost` with different
    /// `node_reads`.
    pub fn with_node_reads(node_reads: u32) -> Self {
        OperationCost {
            node_reads,
            ..Default::default()
        }
    }

    /// Helper function to build default `OperationCost` with different
    /// `node_writes`.
    pub fn with_node_writes(node_writes: u32) -> Self {
        OperationCost {
            node_writes,
            ..Default::default()
        }
    }
}

impl Add for OperationCost {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        OperationCost {
            hash_node_calls: self.hash_node_calls + rhs.hash_node_calls,
            node_reads: self.node_reads + rhs.node_reads,
            node_writes: self.node_writes + rhs.node_writes,
        }
    }
}

impl AddAssign for OperationCost {
    fn add_assign(&mut self, rhs: Self) {
        self.hash_node_calls += rhs.hash_node_calls;
        self.node_reads += rhs.node_reads;
        self.node_writes += rhs.node_writes;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_nothing() {
        assert!(OperationCost::default().is_nothing());
        assert!(!OperationCost::with_node_reads(1).is_nothing());
    }

    #[test]
    fn test_with_helpers() {
        assert_eq!(OperationCost::with_hash_node_calls(3).hash_node_calls, 3);
        assert_eq!(OperationCost::with_node_reads(4).node_reads, 4);
        assert_eq!(OperationCost::with_node_writes(5).node_writes, 5);
    }

    #[test]
    fn test_add_and_add_assign_agree() {
        let left = OperationCost {
            hash_node_calls: 1,
            node_reads: 2,
            node_writes: 3,
        };
        let right = OperationCost {
            hash_node_calls: 10,
            node_reads: 20,
            node_writes: 30,
        };
        let sum = left + right;
        let mut acc = left;
        acc += right;
        assert_eq!(sum, acc);
        assert_eq!(
            sum,
            OperationCost {
                hash_node_calls: 11,
                node_reads: 22,
                node_writes: 33,
            }
        );
    }
}
