//! Arena-backed concept tree.
//!
//! Nodes own nothing: the arena owns every node, each node stores the indices
//! of its children in source order and an optional parent index used only for
//! upward traversal while the tree is being built.

use std::fmt;

use generational_arena::{Arena, Index};
use termtree::Tree;
use tracing::instrument;

/// Data payload for one concept in the outline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConceptData {
    /// Creation-order id, dense from 1 within one parse session
    pub id: usize,
    /// Display name
    pub label: String,
    /// Key into the outline's style table (not checked at parse time)
    pub style: String,
    /// Curriculum week this concept is introduced
    pub week: u32,
}

impl fmt::Display for ConceptData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}, Week{}]", self.label, self.style, self.week)
    }
}

/// Tree node in the arena-based concept hierarchy.
#[derive(Debug)]
pub struct ConceptNode {
    pub data: ConceptData,
    /// Index of parent node in the arena, None for the root
    pub parent: Option<Index>,
    /// Indices of child nodes in the arena, in source order
    pub children: Vec<Index>,
}

impl ConceptNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Arena holding one complete outline tree.
#[derive(Debug)]
pub struct ConceptArena {
    arena: Arena<ConceptNode>,
    root: Option<Index>,
}

impl Default for ConceptArena {
    fn default() -> Self {
        Self::new()
    }
}

impl ConceptArena {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
        }
    }

    /// Insert a node, appending it to `parent`'s children.
    ///
    /// A node inserted without a parent becomes the root.
    #[instrument(level = "trace", skip(self))]
    pub fn insert_node(&mut self, data: ConceptData, parent: Option<Index>) -> Index {
        let node = ConceptNode {
            data,
            parent,
            children: Vec::new(),
        };
        let node_idx = self.arena.insert(node);

        if let Some(parent_idx) = parent {
            if let Some(parent) = self.arena.get_mut(parent_idx) {
                parent.children.push(node_idx);
            }
        } else {
            self.root = Some(node_idx);
        }

        node_idx
    }

    pub fn get_node(&self, idx: Index) -> Option<&ConceptNode> {
        self.arena.get(idx)
    }

    pub fn get_node_mut(&mut self, idx: Index) -> Option<&mut ConceptNode> {
        self.arena.get_mut(idx)
    }

    pub fn root(&self) -> Option<Index> {
        self.root
    }

    pub fn parent_of(&self, idx: Index) -> Option<Index> {
        self.get_node(idx).and_then(|n| n.parent)
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Pre-order, left-to-right traversal from the root.
    pub fn iter(&self) -> PreOrderIterator<'_> {
        PreOrderIterator::new(self)
    }

    /// Longest root-to-leaf path, counted in nodes.
    pub fn depth(&self) -> usize {
        match self.root {
            Some(root) => self.calculate_depth(root),
            None => 0,
        }
    }

    fn calculate_depth(&self, node_idx: Index) -> usize {
        match self.get_node(node_idx) {
            Some(node) => {
                1 + node
                    .children
                    .iter()
                    .map(|&child| self.calculate_depth(child))
                    .max()
                    .unwrap_or(0)
            }
            None => 0,
        }
    }

    /// Labels of all leaves, in traversal order.
    pub fn leaf_labels(&self) -> Vec<String> {
        self.iter()
            .filter(|(_, node)| node.is_leaf())
            .map(|(_, node)| node.data.label.clone())
            .collect()
    }

    /// Render the tree for terminal display.
    pub fn to_tree_string(&self) -> Tree<String> {
        fn build(arena: &ConceptArena, idx: Index) -> Tree<String> {
            match arena.get_node(idx) {
                Some(node) => Tree::new(node.data.to_string())
                    .with_leaves(node.children.iter().map(|&c| build(arena, c))),
                None => Tree::new(String::new()),
            }
        }

        match self.root {
            Some(root) => build(self, root),
            None => Tree::new("Empty outline".to_string()),
        }
    }
}

pub struct PreOrderIterator<'a> {
    arena: &'a ConceptArena,
    stack: Vec<Index>,
}

impl<'a> PreOrderIterator<'a> {
    fn new(arena: &'a ConceptArena) -> Self {
        let mut stack = Vec::new();
        if let Some(root) = arena.root() {
            stack.push(root);
        }
        Self { arena, stack }
    }
}

impl<'a> Iterator for PreOrderIterator<'a> {
    type Item = (Index, &'a ConceptNode);

    fn next(&mut self) -> Option<Self::Item> {
        let current_idx = self.stack.pop()?;
        let node = self.arena.get_node(current_idx)?;
        // Push children in reverse order for left-to-right traversal
        for &child in node.children.iter().rev() {
            self.stack.push(child);
        }
        Some((current_idx, node))
    }
}
