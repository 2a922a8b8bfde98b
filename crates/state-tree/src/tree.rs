//! Tree owner and tick driver.
//!
//! A [`Tree`] owns one root node (and, through it, the whole hierarchy) plus the
//! shared context `D`. The embedding application calls [`Tree::update`] once per
//! tick; everything else on this type is either lifecycle ([`Tree::set_root`],
//! [`Tree::exit`]) or read-only introspection for tooling.

use std::any::type_name;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::arena::{Arena, NodeId};
use crate::error::{Result, TreeError};
use crate::node::{AsAny, Node, short_type_name};

static NEXT_TREE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a [`Tree`], used to key tooling registries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TreeId(u64);

impl TreeId {
    fn next() -> Self {
        Self(NEXT_TREE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub const fn to_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TreeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tree-{}", self.0)
    }
}

/// Priority-arbitrated state tree over a shared context `D`.
///
/// # Tick semantics
///
/// The root is guarded by a simple gate: while the gate is closed, each
/// [`update`](Tree::update) only asks the root's entry condition whether to
/// open it (and enter the root). While open, the root's exit condition may
/// close it again; otherwise the active path is updated top-down and then
/// arbitrated, allowing at most one structural change per tick.
///
/// # Example
///
/// ```rust
/// use state_tree::{Children, Node, NodeView, Tree};
///
/// #[derive(Default)]
/// struct Input {
///     moving: bool,
/// }
///
/// #[derive(Default)]
/// struct Player;
/// impl Node<Input> for Player {
///     fn on_init(&mut self, children: &mut Children<Input>) {
///         children.push(Run).push(Idle);
///     }
/// }
///
/// struct Run;
/// impl Node<Input> for Run {
///     fn entry_condition(&self, view: &NodeView<'_, Input>) -> bool {
///         view.data().moving
///     }
/// }
///
/// struct Idle;
/// impl Node<Input> for Idle {}
///
/// let mut tree = Tree::new();
/// tree.set_root::<Player>(Input::default());
///
/// tree.update(0.016).unwrap();
/// assert_eq!(tree.to_string(), "Player:Idle");
///
/// tree.data_mut().unwrap().moving = true;
/// tree.update(0.016).unwrap();
/// assert!(tree.is_active::<Run>().is_some());
/// ```
pub struct Tree<D> {
    id: TreeId,
    arena: Arena<D>,
    root: Option<NodeId>,
    data: Option<D>,
    gate_active: bool,
}

impl<D: 'static> Default for Tree<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: 'static> Tree<D> {
    /// Creates an inert tree with no root.
    pub fn new() -> Self {
        Self {
            id: TreeId::next(),
            arena: Arena::new(),
            root: None,
            data: None,
            gate_active: false,
        }
    }

    #[inline]
    pub fn id(&self) -> TreeId {
        self.id
    }

    /// Replaces the root with a default-constructed `R` and installs `data`.
    ///
    /// See [`set_root_with`](Tree::set_root_with).
    pub fn set_root<R: Node<D> + Default>(&mut self, data: D) -> &mut Self {
        self.set_root_with(R::default(), data)
    }

    /// Replaces the root with `root` and installs `data`.
    ///
    /// The previous active path (if any) is exited first, with the previous
    /// context still in place. The new hierarchy is then initialized depth-first,
    /// each node's `on_init` running exactly once. The new root is not entered
    /// until the next [`update`](Tree::update) whose root entry condition holds.
    ///
    /// All [`NodeId`]s handed out for the previous root become invalid.
    pub fn set_root_with<R: Node<D>>(&mut self, root: R, data: D) -> &mut Self {
        self.exit();

        self.data = Some(data);
        self.arena = Arena::new();
        let root = self.arena.build(Box::new(root));
        self.root = Some(root);

        tracing::debug!(
            "{} installed root {} ({} nodes)",
            self.id,
            self.arena.name(root),
            self.arena.len()
        );
        self
    }

    /// Advances the tree by one tick of `delta` seconds.
    ///
    /// A tree without a root does nothing. Negative or non-finite deltas are
    /// rejected before any hook runs.
    pub fn update(&mut self, delta: f32) -> Result<()> {
        if !delta.is_finite() || delta < 0.0 {
            return Err(TreeError::InvalidDelta { delta });
        }

        let (Some(root), Some(data)) = (self.root, self.data.as_mut()) else {
            return Ok(());
        };

        if !self.gate_active {
            if self.arena.entry_condition(root, data) {
                tracing::debug!("{} gate opened", self.id);
                self.gate_active = true;
                self.arena.enter(root, data);
            }
        } else if self.arena.exit_condition(root, data) {
            self.arena.exit(Some(root), data);
            self.gate_active = false;
            tracing::debug!("{} gate closed", self.id);
        } else {
            self.arena.update(Some(root), data, delta);
            self.arena.transition(root, data);
        }

        Ok(())
    }

    /// Tears the active path down, deepest node first.
    ///
    /// Nodes are kept; the next [`update`](Tree::update) may enter the root
    /// again.
    pub fn exit(&mut self) {
        if self.gate_active
            && let (Some(root), Some(data)) = (self.root, self.data.as_mut())
        {
            self.arena.exit(Some(root), data);
            tracing::debug!("{} exited", self.id);
        }
        self.gate_active = false;
    }

    /// Whether the root gate is open.
    #[inline]
    pub fn is_running(&self) -> bool {
        self.gate_active
    }

    #[inline]
    pub fn data(&self) -> Option<&D> {
        self.data.as_ref()
    }

    #[inline]
    pub fn data_mut(&mut self) -> Option<&mut D> {
        self.data.as_mut()
    }

    #[inline]
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// The root, if the gate is open: the head of the active path.
    #[inline]
    pub fn active_root(&self) -> Option<NodeId> {
        self.root.filter(|_| self.gate_active)
    }

    /// Number of nodes in the current hierarchy.
    #[inline]
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.arena.len() == 0
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.arena.get(id)?.parent
    }

    /// Children of `id` in priority order; empty for unknown ids.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.arena
            .get(id)
            .map(|slot| slot.children.as_slice())
            .unwrap_or_default()
    }

    pub fn active_child(&self, id: NodeId) -> Option<NodeId> {
        self.arena.get(id)?.active_child
    }

    /// Seconds since `id` was entered, or `None` if it is not on the active path.
    pub fn state_time(&self, id: NodeId) -> Option<f32> {
        if !self.is_on_active_path(id) {
            return None;
        }
        self.arena.get(id).map(|slot| slot.state_time)
    }

    pub fn name(&self, id: NodeId) -> Option<&'static str> {
        self.arena.get(id).map(|slot| slot.node.name())
    }

    /// Whether `id` is the entered root or its parent's active child.
    pub fn is_on_active_path(&self, id: NodeId) -> bool {
        if self.active_root() == Some(id) {
            return true;
        }
        self.parent(id)
            .is_some_and(|parent| self.active_child(parent) == Some(id))
    }

    /// Node ids along the active path, root first.
    pub fn active_path(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.arena.active_chain(self.active_root())
    }

    /// Typed access to node `id`.
    pub fn get<T: 'static>(&self, id: NodeId) -> Option<&T> {
        AsAny::as_any(&*self.arena.get(id)?.node).downcast_ref()
    }

    pub fn get_mut<T: 'static>(&mut self, id: NodeId) -> Option<&mut T> {
        AsAny::as_any_mut(&mut *self.arena.get_mut(id)?.node).downcast_mut()
    }

    /// First node of type `T` strictly below the root.
    ///
    /// All children of a node are checked before descending into any of them;
    /// subtrees are then searched in child order.
    pub fn try_find<T: 'static>(&self) -> Option<&T> {
        self.try_find_id::<T>().and_then(|id| self.get(id))
    }

    pub fn try_find_id<T: 'static>(&self) -> Option<NodeId> {
        self.find_below::<T>(self.root?)
    }

    fn find_below<T: 'static>(&self, id: NodeId) -> Option<NodeId> {
        let children = &self.arena.slot(id).children;
        children
            .iter()
            .copied()
            .find(|&child| self.arena.is::<T>(child))
            .or_else(|| {
                children
                    .iter()
                    .find_map(|&child| self.find_below::<T>(child))
            })
    }

    /// Collects every node of type `T`, root included, in pre-order.
    ///
    /// `buffer` is cleared first so it can be reused across frames.
    pub fn find_all<'b, T: 'static>(&self, buffer: &'b mut Vec<NodeId>) -> &'b [NodeId] {
        buffer.clear();
        if let Some(root) = self.root {
            self.collect::<T>(root, buffer);
        }
        buffer
    }

    fn collect<T: 'static>(&self, id: NodeId, buffer: &mut Vec<NodeId>) {
        if self.arena.is::<T>(id) {
            buffer.push(id);
        }
        for &child in &self.arena.slot(id).children {
            self.collect::<T>(child, buffer);
        }
    }

    /// First node of type `T` on the active path, if any.
    pub fn is_active<T: 'static>(&self) -> Option<&T> {
        self.is_active_id::<T>().and_then(|id| self.get(id))
    }

    pub fn is_active_id<T: 'static>(&self) -> Option<NodeId> {
        self.active_path().find(|&id| self.arena.is::<T>(id))
    }

    /// `"Tree <Context>"`, naming the context type.
    pub fn label(&self) -> String {
        format!("Tree {}", short_type_name(type_name::<D>()))
    }
}

/// Writes the active path as `Root:Child:Leaf`; empty while the gate is closed.
impl<D: 'static> fmt::Display for Tree<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (depth, id) in self.active_path().enumerate() {
            if depth > 0 {
                f.write_str(":")?;
            }
            f.write_str(self.arena.name(id))?;
        }
        Ok(())
    }
}

impl<D: 'static> fmt::Debug for Tree<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tree")
            .field("id", &self.id)
            .field("nodes", &self.arena.len())
            .field("running", &self.gate_active)
            .field("active", &self.to_string())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Children, NodeCtx, NodeView};

    #[derive(Default)]
    struct Ctx {
        allow_root: bool,
        stop_root: bool,
        events: Vec<&'static str>,
    }

    #[derive(Default)]
    struct Root;
    impl Node<Ctx> for Root {
        fn on_init(&mut self, children: &mut Children<Ctx>) {
            children.push(Branch).push(Leaf);
        }
        fn entry_condition(&self, view: &NodeView<'_, Ctx>) -> bool {
            view.data().allow_root
        }
        fn exit_condition(&self, view: &NodeView<'_, Ctx>) -> bool {
            view.data().stop_root
        }
        fn on_enter(&mut self, ctx: &mut NodeCtx<'_, Ctx>) {
            ctx.data_mut().events.push("enter Root");
        }
        fn on_exit(&mut self, ctx: &mut NodeCtx<'_, Ctx>) {
            ctx.data_mut().events.push("exit Root");
        }
    }

    struct Branch;
    impl Node<Ctx> for Branch {
        fn on_init(&mut self, children: &mut Children<Ctx>) {
            children.push(Leaf);
        }
    }

    struct Leaf;
    impl Node<Ctx> for Leaf {
        fn on_exit(&mut self, ctx: &mut NodeCtx<'_, Ctx>) {
            ctx.data_mut().events.push("exit Leaf");
        }
    }

    fn tree() -> Tree<Ctx> {
        let mut tree = Tree::new();
        tree.set_root::<Root>(Ctx {
            allow_root: true,
            ..Ctx::default()
        });
        tree
    }

    #[test]
    fn new_tree_is_inert() {
        let mut tree = Tree::<Ctx>::new();
        assert!(tree.update(1.0).is_ok());
        assert!(!tree.is_running());
        assert!(tree.is_empty());
        assert_eq!(tree.to_string(), "");
        assert!(tree.try_find::<Leaf>().is_none());
    }

    #[test]
    fn gate_waits_for_root_entry_condition() {
        let mut tree = tree();
        tree.data_mut().unwrap().allow_root = false;

        tree.update(0.1).unwrap();
        assert!(!tree.is_running());
        assert!(tree.data().unwrap().events.is_empty());

        tree.data_mut().unwrap().allow_root = true;
        tree.update(0.1).unwrap();
        assert!(tree.is_running());
        assert_eq!(tree.to_string(), "Root:Branch:Leaf");
    }

    #[test]
    fn root_exit_condition_closes_gate() {
        let mut tree = tree();
        tree.update(0.1).unwrap();

        tree.data_mut().unwrap().stop_root = true;
        tree.update(0.1).unwrap();

        assert!(!tree.is_running());
        assert_eq!(
            tree.data().unwrap().events,
            ["enter Root", "exit Leaf", "exit Root"]
        );
        assert_eq!(tree.active_path().count(), 0);
    }

    #[test]
    fn invalid_delta_is_rejected_without_side_effects() {
        let mut tree = tree();
        assert_eq!(
            tree.update(-1.0),
            Err(TreeError::InvalidDelta { delta: -1.0 })
        );
        assert!(tree.update(f32::NAN).is_err());
        assert!(!tree.is_running());
    }

    #[test]
    fn exit_is_idempotent() {
        let mut tree = tree();
        tree.update(0.1).unwrap();

        tree.exit();
        tree.exit();

        assert_eq!(
            tree.data().unwrap().events,
            ["enter Root", "exit Leaf", "exit Root"]
        );
        assert!(!tree.is_running());
    }

    #[test]
    fn set_root_replaces_hierarchy_and_context() {
        let mut tree = tree();
        tree.update(0.1).unwrap();
        let first = tree.id();

        tree.set_root::<Root>(Ctx::default());

        assert!(!tree.is_running());
        assert_eq!(tree.id(), first);
        assert!(tree.data().unwrap().events.is_empty());
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn try_find_excludes_root_and_prefers_shallow_matches() {
        let tree = tree();
        let root = tree.root().unwrap();

        assert!(tree.try_find::<Root>().is_none());

        let leaf = tree.try_find_id::<Leaf>().unwrap();
        assert_eq!(tree.parent(leaf), Some(root));
        assert_eq!(tree.children(root)[1], leaf);
    }

    #[test]
    fn find_all_includes_root_and_reuses_buffer() {
        let tree = tree();
        let mut buffer = vec![NodeId(99)];

        assert_eq!(tree.find_all::<Root>(&mut buffer).len(), 1);
        let leaves = tree.find_all::<Leaf>(&mut buffer).to_vec();

        assert_eq!(leaves.len(), 2);
        assert!(leaves[0] < leaves[1]);
        assert_eq!(buffer, leaves);
    }

    #[test]
    fn state_time_is_hidden_for_inactive_nodes() {
        let mut tree = tree();
        tree.update(0.1).unwrap();
        tree.update(0.5).unwrap();

        let root = tree.root().unwrap();
        let idle_leaf = tree.children(root)[1];
        assert_eq!(tree.state_time(root), Some(0.5));
        assert_eq!(tree.state_time(idle_leaf), None);
        assert!(tree.state_time(NodeId(1000)).is_none());
    }

    #[test]
    fn ids_are_unique_per_tree() {
        let a = Tree::<Ctx>::new();
        let b = Tree::<Ctx>::new();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn label_names_the_context_type() {
        assert_eq!(tree().label(), "Tree Ctx");
    }

    /// Host-side driver that only knows the context is `'static`.
    fn drive<D: 'static, R: Node<D> + Default>(data: D, ticks: usize) -> Tree<D> {
        let mut tree = Tree::new();
        tree.set_root::<R>(data);
        for _ in 0..ticks {
            tree.update(0.1).unwrap();
        }
        tree
    }

    #[test]
    fn generic_driver_runs_trees_over_any_context() {
        let tree = drive::<Ctx, Root>(
            Ctx {
                allow_root: true,
                ..Ctx::default()
            },
            2,
        );
        assert_eq!(tree.to_string(), "Root:Branch:Leaf");

        let mut inspector = crate::Inspector::new();
        assert!(inspector.toggle(&tree));
        assert!(inspector.render(tree.id()).is_ok());
    }
}
