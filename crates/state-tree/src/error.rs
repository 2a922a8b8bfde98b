//! Error types surfaced by the tree API.
//!
//! The core is a synchronous in-memory scheduler, so the taxonomy is small:
//! driver contract violations and tooling lookups. Query misses are `None`,
//! never errors.
use thiserror::Error;

use crate::TreeId;

pub type Result<T> = std::result::Result<T, TreeError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TreeError {
    #[error("tick delta must be finite and non-negative, got {delta}")]
    InvalidDelta { delta: f32 },

    #[error("tree {tree} is not open in the inspector")]
    UnknownTree { tree: TreeId },
}
