//! Priority-arbitrated hierarchical state tree for tick-driven games.
//!
//! A state tree is a behaviour tree in the classic game-AI sense: every node owns
//! an ordered list of children, and at any tick exactly one path from the root
//! downward is active. Unlike a stateless selector, the active path persists
//! between ticks and nodes observe explicit enter / update / exit transitions.
//!
//! - **Priority by position**: children are declared highest priority first.
//!   A higher-ranked sibling whose entry condition becomes true preempts the
//!   active one on the next tick.
//! - **O(depth) per tick**: arbitration stops at the active child and recurses
//!   into it; lower-ranked siblings are never inspected.
//! - **Arena storage**: nodes are addressed by [`NodeId`]; parent and active-child
//!   links are indices, so there are no reference cycles.
//! - **Shared context**: every hook sees the tree's context `D`.
//!
//! # Architecture
//!
//! - [`Node`]: lifecycle hooks implemented by every node type
//! - [`Children`]: builder handed to [`Node::on_init`]
//! - [`Tree`]: owns the root and context, drives ticks, answers queries
//! - [`Inspector`]: tooling-side registry of [`TreeSnapshot`]s

pub mod arena;
pub mod builder;
pub mod error;
pub mod inspect;
pub mod node;
pub mod tree;

// Re-export core types for ergonomic API
pub use arena::NodeId;
pub use builder::Children;
pub use error::{Result, TreeError};
pub use inspect::{Inspector, NodeSnapshot, TreeSnapshot};
pub use node::{AsAny, Node, NodeCtx, NodeView};
pub use tree::{Tree, TreeId};
