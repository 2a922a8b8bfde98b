//! Tooling-side tree inspector.
//!
//! The core never references tooling. Instead, an [`Inspector`] owned by the
//! debug layer keeps one [`TreeSnapshot`] per open tree, keyed by [`TreeId`],
//! and re-captures it each frame from the tree's public query API. Rendering is
//! plain text so the result can go to a log line, a terminal panel, or an
//! on-screen overlay.

use std::collections::HashMap;
use std::fmt;

use crate::error::{Result, TreeError};
use crate::{NodeId, Tree, TreeId};

/// One node as seen by the inspector.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeSnapshot {
    pub id: NodeId,
    pub name: String,
    /// Distance from the root (root = 0).
    pub depth: usize,
    pub active: bool,
    /// Present only for nodes on the active path.
    pub state_time: Option<f32>,
}

/// Point-in-time capture of a whole tree, nodes in pre-order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TreeSnapshot {
    pub tree: TreeId,
    pub label: String,
    pub running: bool,
    /// Active chain as printed by the tree's `Display` impl.
    pub active_path: String,
    pub nodes: Vec<NodeSnapshot>,
}

impl TreeSnapshot {
    pub fn capture<D: 'static>(tree: &Tree<D>) -> Self {
        let mut nodes = Vec::with_capacity(tree.len());
        if let Some(root) = tree.root() {
            capture_node(tree, root, 0, &mut nodes);
        }

        Self {
            tree: tree.id(),
            label: tree.label(),
            running: tree.is_running(),
            active_path: tree.to_string(),
            nodes,
        }
    }

    /// Nodes currently on the active path, root first.
    pub fn active_nodes(&self) -> impl Iterator<Item = &NodeSnapshot> {
        self.nodes.iter().filter(|node| node.active)
    }
}

fn capture_node<D: 'static>(tree: &Tree<D>, id: NodeId, depth: usize, out: &mut Vec<NodeSnapshot>) {
    out.push(NodeSnapshot {
        id,
        name: tree.name(id).unwrap_or("?").to_owned(),
        depth,
        active: tree.is_on_active_path(id),
        state_time: tree.state_time(id),
    });
    for &child in tree.children(id) {
        capture_node(tree, child, depth + 1, out);
    }
}

/// Text outline: one line per node, indented by depth, `*` marking the active path.
///
/// ```text
/// Tree Input [running] Player:Idle
/// * Player #0 (1.250s)
///     Run #1
///   * Idle #2 (0.500s)
/// ```
impl fmt::Display for TreeSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.running { "running" } else { "idle" };
        write!(f, "{} [{}]", self.label, status)?;
        if !self.active_path.is_empty() {
            write!(f, " {}", self.active_path)?;
        }

        for node in &self.nodes {
            let marker = if node.active { '*' } else { ' ' };
            write!(
                f,
                "\n{:indent$}{} {} {}",
                "",
                marker,
                node.name,
                node.id,
                indent = node.depth * 2
            )?;
            if let Some(time) = node.state_time {
                write!(f, " ({time:.3}s)")?;
            }
        }
        Ok(())
    }
}

/// Registry of open tree views, owned by the tooling layer.
#[derive(Debug, Default)]
pub struct Inspector {
    open: HashMap<TreeId, TreeSnapshot>,
}

impl Inspector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a view of `tree`, or closes it if already open.
    ///
    /// Returns whether the view is open afterwards.
    pub fn toggle<D: 'static>(&mut self, tree: &Tree<D>) -> bool {
        if self.open.remove(&tree.id()).is_some() {
            tracing::debug!("inspector closed {}", tree.id());
            return false;
        }
        self.open.insert(tree.id(), TreeSnapshot::capture(tree));
        tracing::debug!("inspector opened {}", tree.id());
        true
    }

    /// Closes the view of `tree`, returning its last snapshot.
    pub fn close(&mut self, tree: TreeId) -> Option<TreeSnapshot> {
        self.open.remove(&tree)
    }

    #[inline]
    pub fn is_open(&self, tree: TreeId) -> bool {
        self.open.contains_key(&tree)
    }

    /// Re-captures `tree` if its view is open. Call once per frame per tree.
    pub fn refresh<D: 'static>(&mut self, tree: &Tree<D>) {
        if let Some(snapshot) = self.open.get_mut(&tree.id()) {
            *snapshot = TreeSnapshot::capture(tree);
        }
    }

    pub fn snapshot(&self, tree: TreeId) -> Option<&TreeSnapshot> {
        self.open.get(&tree)
    }

    pub fn render(&self, tree: TreeId) -> Result<String> {
        self.snapshot(tree)
            .map(ToString::to_string)
            .ok_or(TreeError::UnknownTree { tree })
    }

    /// Open views, ordered by tree id.
    pub fn views(&self) -> Vec<&TreeSnapshot> {
        let mut views: Vec<_> = self.open.values().collect();
        views.sort_by_key(|snapshot| snapshot.tree);
        views
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Children, Node, NodeView};

    #[derive(Default)]
    struct Input {
        moving: bool,
    }

    #[derive(Default)]
    struct Player;
    impl Node<Input> for Player {
        fn on_init(&mut self, children: &mut Children<Input>) {
            children.push(Run).push(Idle);
        }
    }

    struct Run;
    impl Node<Input> for Run {
        fn entry_condition(&self, view: &NodeView<'_, Input>) -> bool {
            view.data().moving
        }
    }

    struct Idle;
    impl Node<Input> for Idle {}

    fn running_tree() -> Tree<Input> {
        let mut tree = Tree::new();
        tree.set_root::<Player>(Input::default());
        tree.update(0.0).unwrap();
        tree.update(1.25).unwrap();
        tree
    }

    #[test]
    fn capture_lists_nodes_in_pre_order_with_activity() {
        let tree = running_tree();
        let snapshot = TreeSnapshot::capture(&tree);

        let names: Vec<_> = snapshot.nodes.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, ["Player", "Run", "Idle"]);
        let depths: Vec<_> = snapshot.nodes.iter().map(|n| n.depth).collect();
        assert_eq!(depths, [0, 1, 1]);

        let active: Vec<_> = snapshot.active_nodes().map(|n| n.name.as_str()).collect();
        assert_eq!(active, ["Player", "Idle"]);
        assert_eq!(snapshot.nodes[1].state_time, None);
        assert_eq!(snapshot.nodes[2].state_time, Some(1.25));
        assert_eq!(snapshot.active_path, "Player:Idle");
    }

    #[test]
    fn render_outlines_tree() {
        let tree = running_tree();
        let mut inspector = Inspector::new();
        inspector.toggle(&tree);

        let text = inspector.render(tree.id()).unwrap();
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines[0], "Tree Input [running] Player:Idle");
        assert_eq!(lines[1], "* Player #0 (1.250s)");
        assert_eq!(lines[2], "    Run #1");
        assert_eq!(lines[3], "  * Idle #2 (1.250s)");
    }

    #[test]
    fn toggle_opens_then_closes() {
        let tree = running_tree();
        let mut inspector = Inspector::new();

        assert!(inspector.toggle(&tree));
        assert!(inspector.is_open(tree.id()));
        assert!(!inspector.toggle(&tree));
        assert!(!inspector.is_open(tree.id()));
        assert_eq!(
            inspector.render(tree.id()),
            Err(TreeError::UnknownTree { tree: tree.id() })
        );
    }

    #[test]
    fn refresh_tracks_live_tree_only_when_open() {
        let mut tree = running_tree();
        let mut inspector = Inspector::new();

        inspector.refresh(&tree);
        assert!(inspector.snapshot(tree.id()).is_none());

        inspector.toggle(&tree);
        tree.data_mut().unwrap().moving = true;
        tree.update(0.1).unwrap();
        inspector.refresh(&tree);

        let snapshot = inspector.snapshot(tree.id()).unwrap();
        assert_eq!(snapshot.active_path, "Player:Run");
    }

    #[test]
    fn views_are_ordered_by_tree_id() {
        let a = running_tree();
        let b = running_tree();
        let mut inspector = Inspector::new();
        inspector.toggle(&b);
        inspector.toggle(&a);

        let ids: Vec<_> = inspector.views().iter().map(|s| s.tree).collect();
        assert_eq!(ids, [a.id(), b.id()]);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn snapshot_serializes_to_json() {
        let snapshot = TreeSnapshot::capture(&running_tree());
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["active_path"], "Player:Idle");
        assert_eq!(json["nodes"].as_array().unwrap().len(), 3);
    }
}
