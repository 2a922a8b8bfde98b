//! Core node trait.
//!
//! This module defines the [`Node`] trait, the fundamental abstraction for every
//! position in a state tree. The trait is generic over a context type `D`
//! shared by all nodes of one tree, so hooks can read inputs and publish
//! results without knowing about each other.

use std::any::{Any, type_name};

use crate::arena::NodeId;
use crate::builder::Children;

/// Type-erasure helper used by the typed queries on [`Tree`](crate::Tree).
///
/// Implemented for every `'static` type; node authors never implement it by hand.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    #[inline]
    fn as_any(&self) -> &dyn Any {
        self
    }

    #[inline]
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A unit of behaviour in a state tree.
///
/// Every hook has a default, so a node only overrides what it needs:
///
/// | hook               | default   | called                                          |
/// |--------------------|-----------|-------------------------------------------------|
/// | [`on_init`]        | no-op     | once, right after construction                  |
/// | [`entry_condition`]| `true`    | while arbitrating, "may this node start now?"   |
/// | [`exit_condition`] | `false`   | while active, "must this node stop now?"        |
/// | [`on_enter`]       | no-op     | on inactive → active, with `state_time == 0`    |
/// | [`on_update`]      | no-op     | every tick while active, after `state_time` grew|
/// | [`on_exit`]        | no-op     | on active → inactive, after its descendants     |
///
/// Conditions receive a read-only [`NodeView`] and must not mutate anything.
///
/// [`on_init`]: Node::on_init
/// [`entry_condition`]: Node::entry_condition
/// [`exit_condition`]: Node::exit_condition
/// [`on_enter`]: Node::on_enter
/// [`on_update`]: Node::on_update
/// [`on_exit`]: Node::on_exit
pub trait Node<D>: AsAny {
    /// Populate this node's children, highest priority first.
    ///
    /// Runs exactly once when the node is inserted into a tree. The order
    /// pushed here is the arbitration order for the lifetime of the tree.
    fn on_init(&mut self, _children: &mut Children<D>) {}

    fn entry_condition(&self, _view: &NodeView<'_, D>) -> bool {
        true
    }

    fn exit_condition(&self, _view: &NodeView<'_, D>) -> bool {
        false
    }

    fn on_enter(&mut self, _ctx: &mut NodeCtx<'_, D>) {}

    fn on_update(&mut self, _ctx: &mut NodeCtx<'_, D>, _delta: f32) {}

    fn on_exit(&mut self, _ctx: &mut NodeCtx<'_, D>) {}

    /// Human-readable name used in logs and [`Display`](std::fmt::Display) output.
    ///
    /// Defaults to the type name without its module path (`Idle`).
    fn name(&self) -> &'static str {
        short_type_name(type_name::<Self>())
    }
}

/// Read-only view handed to [`Node::entry_condition`] and [`Node::exit_condition`].
pub struct NodeView<'a, D> {
    pub(crate) data: &'a D,
    pub(crate) id: NodeId,
    pub(crate) parent: Option<NodeId>,
    pub(crate) state_time: f32,
}

impl<D> NodeView<'_, D> {
    /// Shared tree context.
    #[inline]
    pub fn data(&self) -> &D {
        self.data
    }

    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Seconds since this node was last entered.
    ///
    /// Only meaningful while the node is on the active path; entry conditions
    /// of inactive nodes see whatever value was left by their last run.
    #[inline]
    pub fn state_time(&self) -> f32 {
        self.state_time
    }
}

/// Mutable context handed to the side-effecting hooks.
pub struct NodeCtx<'a, D> {
    pub(crate) data: &'a mut D,
    pub(crate) id: NodeId,
    pub(crate) parent: Option<NodeId>,
    pub(crate) state_time: f32,
}

impl<D> NodeCtx<'_, D> {
    #[inline]
    pub fn data(&self) -> &D {
        self.data
    }

    /// Mutable access to the shared tree context.
    #[inline]
    pub fn data_mut(&mut self) -> &mut D {
        self.data
    }

    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Seconds since this node was last entered (0 inside `on_enter`).
    #[inline]
    pub fn state_time(&self) -> f32 {
        self.state_time
    }
}

/// Strips the module path from a fully-qualified type name.
///
/// Generic arguments are kept as written: `game::ai::Wander<game::Goblin>`
/// becomes `Wander<game::Goblin>`.
pub(crate) fn short_type_name(full: &'static str) -> &'static str {
    match full.find('<') {
        None => full.rsplit("::").next().unwrap_or(full),
        Some(open) => {
            let head = &full[..open];
            let start = head.rfind("::").map_or(0, |i| i + 2);
            &full[start..]
        }
    }
}
