//! Live tree adapter
//!
//! Keeps the interactive view as a keyed arena and brings it up to date with
//! a freshly built tree by emitting (and applying) the minimal keyed
//! mutations. Offsets are always taken from the built tree; the arena never
//! feeds a position back into the state.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use super::markup::StaticMarkup;
use super::node::{NodeContent, RenderNode};
use crate::types::{ItemKey, Position};

/// One incremental change to the live view.
///
/// Mutations are ordered: every `Remove` comes first, then inserts, moves
/// and updates in tree pre-order, so indices refer to the parent's children
/// as they are at the moment the mutation is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// Create a node (without children) under `parent` at `index`
    Insert {
        key: String,
        parent: Option<String>,
        index: usize,
        content: NodeContent,
        position: Option<Position>,
    },
    /// Detach a node and its whole subtree
    Remove { key: String },
    /// Replace the content and offset of an existing node
    Update {
        key: String,
        content: NodeContent,
        position: Option<Position>,
    },
    /// Re-parent or re-order an existing node
    Move {
        key: String,
        parent: Option<String>,
        index: usize,
    },
}

impl Mutation {
    pub fn key(&self) -> &str {
        match self {
            Mutation::Insert { key, .. }
            | Mutation::Remove { key }
            | Mutation::Update { key, .. }
            | Mutation::Move { key, .. } => key,
        }
    }
}

#[derive(Debug, Clone)]
struct LiveNode {
    content: NodeContent,
    position: Option<Position>,
    parent: Option<String>,
    children: Vec<String>,
}

/// Keyed arena mirroring the last reconciled tree
#[derive(Debug, Default)]
pub struct LiveTree {
    nodes: HashMap<String, LiveNode>,
    root: Option<String>,
}

impl LiveTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.nodes.contains_key(key)
    }

    /// Drop every node; the next reconcile inserts the full tree
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
    }

    /// Offset currently shown for a node
    pub fn position(&self, key: &str) -> Option<Position> {
        self.nodes.get(key).and_then(|n| n.position)
    }

    /// Back-reference from a live node to the item it displays
    pub fn source_of(&self, key: &str) -> Option<ItemKey> {
        self.nodes
            .get(key)
            .and_then(|n| n.content.affordance)
            .map(|a| a.source)
    }

    /// Bring the arena in line with `tree` and return what changed
    pub fn reconcile(&mut self, tree: &RenderNode) -> Vec<Mutation> {
        let mut mutations = Vec::new();

        let incoming: HashMap<&str, &RenderNode> = tree
            .descendants()
            .into_iter()
            .map(|n| (n.key.as_str(), n))
            .collect();

        // A node whose kind changed is replaced rather than updated
        let stale: HashSet<String> = self
            .nodes
            .iter()
            .filter(|(key, node)| {
                incoming
                    .get(key.as_str())
                    .map_or(true, |n| n.content.kind != node.content.kind)
            })
            .map(|(key, _)| key.clone())
            .collect();
        let mut topmost: Vec<&String> = stale
            .iter()
            .filter(|key| {
                self.nodes[key.as_str()]
                    .parent
                    .as_ref()
                    .map_or(true, |p| !stale.contains(p))
            })
            .collect();
        topmost.sort();
        for key in topmost {
            self.detach(key);
            self.remove_subtree(key);
            mutations.push(Mutation::Remove { key: key.clone() });
        }
        if self.root.as_ref().is_some_and(|r| !self.nodes.contains_key(r)) {
            self.root = None;
        }

        self.visit(tree, None, 0, &mut mutations);
        self.root = Some(tree.key.clone());

        debug!(mutations = mutations.len(), nodes = self.nodes.len(), "Reconciled live tree");
        mutations
    }

    fn visit(
        &mut self,
        node: &RenderNode,
        parent: Option<&str>,
        index: usize,
        mutations: &mut Vec<Mutation>,
    ) {
        match self.nodes.get(&node.key) {
            None => {
                self.nodes.insert(
                    node.key.clone(),
                    LiveNode {
                        content: node.content.clone(),
                        position: node.position,
                        parent: parent.map(str::to_string),
                        children: Vec::new(),
                    },
                );
                self.attach(&node.key, parent, index);
                mutations.push(Mutation::Insert {
                    key: node.key.clone(),
                    parent: parent.map(str::to_string),
                    index,
                    content: node.content.clone(),
                    position: node.position,
                });
            }
            Some(existing) => {
                let changed = existing.content != node.content || existing.position != node.position;
                let moved = existing.parent.as_deref() != parent || self.index_of(&node.key) != Some(index);
                if moved {
                    self.detach(&node.key);
                    self.attach(&node.key, parent, index);
                    mutations.push(Mutation::Move {
                        key: node.key.clone(),
                        parent: parent.map(str::to_string),
                        index,
                    });
                }
                if changed {
                    if let Some(live) = self.nodes.get_mut(&node.key) {
                        live.content = node.content.clone();
                        live.position = node.position;
                    }
                    mutations.push(Mutation::Update {
                        key: node.key.clone(),
                        content: node.content.clone(),
                        position: node.position,
                    });
                }
            }
        }

        for (i, child) in node.children.iter().enumerate() {
            self.visit(child, Some(&node.key), i, mutations);
        }
    }

    /// Index of a node among its parent's children (0 for the root)
    fn index_of(&self, key: &str) -> Option<usize> {
        match self.nodes.get(key)?.parent.as_deref() {
            Some(parent) => self.nodes.get(parent)?.children.iter().position(|c| c == key),
            None => (self.root.as_deref() == Some(key)).then_some(0),
        }
    }

    fn attach(&mut self, key: &str, parent: Option<&str>, index: usize) {
        if let Some(live) = self.nodes.get_mut(key) {
            live.parent = parent.map(str::to_string);
        }
        match parent {
            Some(parent) => {
                if let Some(p) = self.nodes.get_mut(parent) {
                    let index = index.min(p.children.len());
                    p.children.insert(index, key.to_string());
                }
            }
            None => self.root = Some(key.to_string()),
        }
    }

    fn detach(&mut self, key: &str) {
        let parent = self.nodes.get(key).and_then(|n| n.parent.clone());
        match parent {
            Some(parent) => {
                if let Some(p) = self.nodes.get_mut(&parent) {
                    p.children.retain(|c| c != key);
                }
            }
            None => {
                if self.root.as_deref() == Some(key) {
                    self.root = None;
                }
            }
        }
    }

    fn remove_subtree(&mut self, key: &str) {
        if let Some(node) = self.nodes.remove(key) {
            for child in node.children {
                self.remove_subtree(&child);
            }
        }
    }

    /// Rebuild the abstract tree held by the arena
    pub fn to_tree(&self) -> Option<RenderNode> {
        self.root.as_deref().and_then(|root| self.build(root))
    }

    fn build(&self, key: &str) -> Option<RenderNode> {
        let live = self.nodes.get(key)?;
        Some(RenderNode {
            key: key.to_string(),
            content: live.content.clone(),
            position: live.position,
            children: live.children.iter().filter_map(|c| self.build(c)).collect(),
        })
    }

    /// Markup of the live view with affordances stripped.
    ///
    /// Equal to the static markup of the same state whenever the static
    /// target renders live (no captured faces).
    pub fn to_markup(&self) -> String {
        self.to_tree()
            .map(|tree| StaticMarkup::new().serialize(&tree))
            .unwrap_or_default()
    }
}
