// src/services/expander.rs

//! Comment tree expansion.
//!
//! Walks a story's reply tree breadth-first per level and depth-first
//! across levels, fetching every node through one bounded [`FetchPool`]
//! per story. Sibling fetches complete in any order; children are put back
//! into the order the API listed them before a node is assembled.

use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use futures::stream::{self, StreamExt};

use super::fetcher::ItemSource;
use super::pool::FetchPool;
use crate::error::{AppError, Result};
use crate::models::{ClientConfig, Item, ItemId, Node};

/// Counters for one expansion.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExpandOutcome {
    /// Items fetched successfully, root included
    pub fetched: usize,
    /// Replies dropped because their fetch failed
    pub dropped: usize,
    /// Replies pruned because they had no author and no deleted flag
    pub pruned: usize,
    /// Parents that lost at least one reply, in tree order
    pub warned_parents: Vec<ItemId>,
}

impl ExpandOutcome {
    fn merge(&mut self, other: ExpandOutcome) {
        self.fetched += other.fetched;
        self.dropped += other.dropped;
        self.pruned += other.pruned;
        self.warned_parents.extend(other.warned_parents);
    }
}

/// An assembled tree and how it was obtained.
#[derive(Debug)]
pub struct Expansion {
    pub tree: Node,
    pub outcome: ExpandOutcome,
}

enum Child {
    Expanded(Node, ExpandOutcome),
    Pruned,
    Failed(ItemId, AppError),
}

/// Fetches a story and its replies into a [`Node`] tree.
pub struct TreeExpander {
    source: Arc<dyn ItemSource>,
    max_children: usize,
    concurrency: usize,
}

impl TreeExpander {
    pub fn new(source: Arc<dyn ItemSource>, max_children: usize, concurrency: usize) -> Self {
        Self {
            source,
            max_children,
            concurrency: concurrency.max(1),
        }
    }

    pub fn from_config(source: Arc<dyn ItemSource>, config: &ClientConfig) -> Self {
        Self::new(source, config.max_children_per_level, config.max_concurrent)
    }

    /// Expand `root_id` into a tree.
    pub async fn expand(&self, root_id: ItemId) -> Result<Node> {
        Ok(self.expand_with_outcome(root_id).await?.tree)
    }

    /// Expand `root_id`, also reporting fetch counters.
    ///
    /// Fails with [`AppError::RootMissing`] when the root does not exist or
    /// is not a live story or comment. A transport failure on the root is
    /// returned as is. Failures below the root only drop that reply.
    pub async fn expand_with_outcome(&self, root_id: ItemId) -> Result<Expansion> {
        let pool = FetchPool::new(self.concurrency);

        let root = match pool.fetch(self.source.as_ref(), root_id).await {
            Ok(item @ (Item::Story(_) | Item::Comment(_))) => item,
            Ok(_) | Err(AppError::NotFound(_)) => return Err(AppError::RootMissing(root_id)),
            Err(error) => return Err(error),
        };

        let (tree, mut outcome) = self.expand_node(&pool, root).await;
        outcome.fetched += 1;

        log::debug!(
            "Expanded {}: {} items, {} dropped, {} pruned",
            root_id,
            outcome.fetched,
            outcome.dropped,
            outcome.pruned
        );
        Ok(Expansion { tree, outcome })
    }

    fn expand_node<'a>(
        &'a self,
        pool: &'a FetchPool,
        item: Item,
    ) -> BoxFuture<'a, (Node, ExpandOutcome)> {
        async move {
            let kids: Vec<ItemId> = item
                .kids()
                .iter()
                .copied()
                .take(self.max_children)
                .collect();
            let width = kids.len().max(1);

            let mut settled: Vec<(usize, Child)> = stream::iter(kids.into_iter().enumerate())
                .map(|(position, id)| async move {
                    let child = match pool.fetch(self.source.as_ref(), id).await {
                        Ok(Item::MissingChild(_)) => Child::Pruned,
                        Ok(reply) => {
                            let (node, outcome) = self.expand_node(pool, reply).await;
                            Child::Expanded(node, outcome)
                        }
                        Err(error) => Child::Failed(id, error),
                    };
                    (position, child)
                })
                .buffer_unordered(width)
                .collect()
                .await;

            // Completion order is arbitrary; restore the listed order.
            settled.sort_by_key(|(position, _)| *position);

            let mut children = Vec::with_capacity(settled.len());
            let mut outcome = ExpandOutcome::default();
            let mut failures = Vec::new();

            for (_, child) in settled {
                match child {
                    Child::Expanded(node, child_outcome) => {
                        outcome.fetched += 1;
                        outcome.merge(child_outcome);
                        children.push(node);
                    }
                    Child::Pruned => {
                        outcome.fetched += 1;
                        outcome.pruned += 1;
                    }
                    Child::Failed(id, error) => failures.push(format!("{id} ({error})")),
                }
            }

            if !failures.is_empty() {
                log::warn!(
                    "Dropped {} replies under {}: {}",
                    failures.len(),
                    item.id(),
                    failures.join(", ")
                );
                outcome.dropped += failures.len();
                outcome.warned_parents.push(item.id());
            }

            (Node::new(item, children), outcome)
        }
        .boxed()
    }
}
