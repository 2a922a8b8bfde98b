//! Node storage and the activation protocol.
//!
//! Nodes live in a flat arena addressed by [`NodeId`]. Ownership is expressed as
//! per-node index lists (`children`); `parent` and `active_child` are plain
//! indices with no ownership, so the hierarchy has no reference cycles and can
//! be walked in O(1) per step in both directions.
//!
//! # Protocol
//!
//! - [`Arena::enter`]: reset `state_time`, `on_enter`, then descend into the
//!   first child whose entry condition holds.
//! - [`Arena::exit`]: post-order; deepest active descendant exits first.
//! - [`Arena::update`]: pre-order; parent updates before its active child.
//! - [`Arena::transition`]: priority arbitration, at most one structural change
//!   per call.

use std::fmt;

use crate::builder::Children;
use crate::node::{AsAny, Node, NodeCtx, NodeView};

/// Stable handle of a node inside one [`Tree`](crate::Tree).
///
/// Handles stay valid until the tree's root is replaced with
/// [`Tree::set_root`](crate::Tree::set_root), which discards the whole arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }

    /// Raw arena slot, useful as a stable key in tooling maps.
    #[inline]
    pub const fn to_raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub(crate) struct Slot<D> {
    pub(crate) node: Box<dyn Node<D>>,
    pub(crate) state_time: f32,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) active_child: Option<NodeId>,
}

pub(crate) struct Arena<D> {
    slots: Vec<Slot<D>>,
}

impl<D: 'static> Arena<D> {
    pub(crate) fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Inserts `root` and runs the initialization pass over the hierarchy it
    /// declares. Returns the root's id.
    pub(crate) fn build(&mut self, root: Box<dyn Node<D>>) -> NodeId {
        let id = self.alloc(root, None);
        self.init(id);
        id
    }

    fn alloc(&mut self, node: Box<dyn Node<D>>, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.slots.len() as u32);
        self.slots.push(Slot {
            node,
            state_time: 0.0,
            parent,
            children: Vec::new(),
            active_child: None,
        });
        id
    }

    /// Depth-first: a child is fully initialized before its next sibling is
    /// allocated.
    fn init(&mut self, id: NodeId) {
        let mut children = Children::new();
        self.slots[id.index()].node.on_init(&mut children);

        for child in children.into_nodes() {
            let child_id = self.alloc(child, Some(id));
            self.slots[id.index()].children.push(child_id);
            self.init(child_id);
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub(crate) fn get(&self, id: NodeId) -> Option<&Slot<D>> {
        self.slots.get(id.index())
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut Slot<D>> {
        self.slots.get_mut(id.index())
    }

    #[inline]
    pub(crate) fn slot(&self, id: NodeId) -> &Slot<D> {
        &self.slots[id.index()]
    }

    #[inline]
    pub(crate) fn name(&self, id: NodeId) -> &'static str {
        self.slot(id).node.name()
    }

    pub(crate) fn is<T: 'static>(&self, id: NodeId) -> bool {
        AsAny::as_any(&*self.slot(id).node).is::<T>()
    }

    pub(crate) fn entry_condition(&self, id: NodeId, data: &D) -> bool {
        let slot = self.slot(id);
        slot.node.entry_condition(&NodeView {
            data,
            id,
            parent: slot.parent,
            state_time: slot.state_time,
        })
    }

    pub(crate) fn exit_condition(&self, id: NodeId, data: &D) -> bool {
        let slot = self.slot(id);
        slot.node.exit_condition(&NodeView {
            data,
            id,
            parent: slot.parent,
            state_time: slot.state_time,
        })
    }

    pub(crate) fn enter(&mut self, id: NodeId, data: &mut D) {
        tracing::debug!("enter {}{}", self.name(id), id);

        let slot = &mut self.slots[id.index()];
        let parent = slot.parent;
        slot.state_time = 0.0;
        slot.node.on_enter(&mut NodeCtx {
            data: &mut *data,
            id,
            parent,
            state_time: 0.0,
        });

        // Descend as far as entry conditions allow.
        let count = self.slots[id.index()].children.len();
        for i in 0..count {
            let child = self.slots[id.index()].children[i];
            if self.entry_condition(child, data) {
                self.slots[id.index()].active_child = Some(child);
                self.enter(child, data);
                return;
            }
        }
    }

    pub(crate) fn exit(&mut self, id: Option<NodeId>, data: &mut D) {
        let Some(id) = id else { return };

        let active_child = self.slots[id.index()].active_child;
        self.exit(active_child, data);

        tracing::debug!("exit {}{}", self.name(id), id);

        let slot = &mut self.slots[id.index()];
        let (parent, state_time) = (slot.parent, slot.state_time);
        slot.node.on_exit(&mut NodeCtx {
            data,
            id,
            parent,
            state_time,
        });
        slot.active_child = None;
    }

    pub(crate) fn update(&mut self, id: Option<NodeId>, data: &mut D, delta: f32) {
        let Some(id) = id else { return };

        let slot = &mut self.slots[id.index()];
        slot.state_time += delta;
        tracing::trace!(
            "update {}{} state_time={:.3}",
            slot.node.name(),
            id,
            slot.state_time
        );
        let (parent, state_time) = (slot.parent, slot.state_time);
        slot.node.on_update(
            &mut NodeCtx {
                data: &mut *data,
                id,
                parent,
                state_time,
            },
            delta,
        );

        let active_child = slot.active_child;
        self.update(active_child, data, delta);
    }

    /// Priority arbitration over the children of `id`.
    ///
    /// Children are scanned in declaration order. A sibling ranked above the
    /// active child whose entry condition holds preempts it. On reaching the
    /// active child the scan stops: either the child leaves on its own exit
    /// condition (the slot stays empty until a later tick) or arbitration
    /// recurses into its subtree.
    pub(crate) fn transition(&mut self, id: NodeId, data: &mut D) {
        let count = self.slots[id.index()].children.len();
        for i in 0..count {
            let child = self.slots[id.index()].children[i];
            let active = self.slots[id.index()].active_child;

            if active == Some(child) {
                if self.exit_condition(child, data) {
                    self.exit(Some(child), data);
                    self.slots[id.index()].active_child = None;
                } else {
                    self.transition(child, data);
                }
                return;
            }

            if self.entry_condition(child, data) {
                if let Some(previous) = active {
                    tracing::debug!(
                        "{} preempts {} under {}",
                        self.name(child),
                        self.name(previous),
                        self.name(id)
                    );
                }
                self.exit(active, data);
                self.slots[id.index()].active_child = Some(child);
                self.enter(child, data);
                return;
            }
        }
    }

    /// Walks `active_child` links starting at `from`.
    pub(crate) fn active_chain(&self, from: Option<NodeId>) -> ActiveChain<'_, D> {
        ActiveChain {
            arena: self,
            next: from,
        }
    }
}

/// Iterator over the active path, top-down.
pub(crate) struct ActiveChain<'a, D> {
    arena: &'a Arena<D>,
    next: Option<NodeId>,
}

impl<D: 'static> Iterator for ActiveChain<'_, D> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.next?;
        self.next = self.arena.slot(id).active_child;
        Some(id)
    }
}
