//! Assembled discussion trees.

use super::item::{Item, ItemId};

/// An item together with its expanded replies.
///
/// Built once by the tree expander and never mutated afterwards; children
/// are always in the order the remote API listed them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    item: Item,
    children: Vec<Node>,
}

impl Node {
    pub fn new(item: Item, children: Vec<Node>) -> Self {
        Self { item, children }
    }

    /// A node with no expanded replies.
    pub fn leaf(item: Item) -> Self {
        Self::new(item, Vec::new())
    }

    pub fn item(&self) -> &Item {
        &self.item
    }

    pub fn id(&self) -> ItemId {
        self.item.id()
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Number of nodes below this one.
    pub fn descendant_count(&self) -> usize {
        self.children
            .iter()
            .map(|child| 1 + child.descendant_count())
            .sum()
    }
}
