use thiserror::Error;

/// Errors from Merkle tree operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MerkleTreeError {
    #[error("the root does not have a sibling")]
    RootHasNoSibling,
    #[error("height must be at most {max}, got {height}")]
    InvalidHeight { height: u8, max: u8 },
    #[error("level {level} is out of range for a tree of height {height}")]
    LevelOutOfRange { level: u8, height: u8 },
    #[error("index {index} is out of range for level {level}")]
    IndexOutOfRange { level: u8, index: u64 },
    #[error("expected {expected} leaves, got {actual}")]
    LeafCountMismatch { expected: u64, actual: u64 },
    #[error("tree is full (capacity {capacity})")]
    TreeFull { capacity: u64 },
    #[error("invalid proof: {0}")]
    InvalidProof(String),
    #[error("store error: {0}")]
    StoreError(String),
    #[error("corrupted data: {0}")]
    CorruptedData(String),
}
