// src/services/selector.rs

//! Story selection: rank cheap summaries, then expand only the winners.

use std::collections::HashSet;
use std::sync::Arc;

use futures::stream::{self, StreamExt};

use super::expander::TreeExpander;
use super::fetcher::ItemSource;
use crate::models::{ClientConfig, Item, ItemId, Node, SortCriteria, StorySummary};

/// Resolves candidate ids into fully expanded story trees.
pub struct StorySelector {
    source: Arc<dyn ItemSource>,
    expander: TreeExpander,
    concurrency: usize,
}

impl StorySelector {
    pub fn new(source: Arc<dyn ItemSource>, config: &ClientConfig) -> Self {
        Self {
            expander: TreeExpander::from_config(Arc::clone(&source), config),
            source,
            concurrency: config.max_concurrent.max(1),
        }
    }

    /// Fetch summaries for the candidates, in candidate order.
    ///
    /// Duplicate ids keep their first position. Candidates that cannot be
    /// fetched, or that are not stories, are skipped.
    pub async fn summarize(&self, candidate_ids: &[ItemId]) -> Vec<StorySummary> {
        let mut seen = HashSet::new();
        let unique: Vec<ItemId> = candidate_ids
            .iter()
            .copied()
            .filter(|id| seen.insert(*id))
            .collect();

        let results: Vec<_> = stream::iter(unique)
            .map(|id| async move { (id, self.source.fetch(id).await) })
            .buffered(self.concurrency)
            .collect()
            .await;

        results
            .into_iter()
            .filter_map(|(id, result)| match result {
                Ok(Item::Story(story)) => Some(StorySummary::from(&story)),
                Ok(_) => {
                    log::warn!("Candidate {} is not a story, skipping", id);
                    None
                }
                Err(error) => {
                    log::warn!("Failed to fetch summary for {}: {}", id, error);
                    None
                }
            })
            .collect()
    }

    /// Summaries sorted by `criteria` and cut to `limit`.
    pub async fn rank(
        &self,
        candidate_ids: &[ItemId],
        criteria: SortCriteria,
        limit: usize,
    ) -> Vec<StorySummary> {
        let mut summaries = self.summarize(candidate_ids).await;
        let total = summaries.len();
        criteria.sort(&mut summaries);
        summaries.truncate(limit);
        log::info!("Winnowed {} stories down to {}", total, summaries.len());
        summaries
    }

    /// Rank the candidates and fully expand the survivors in ranked order.
    ///
    /// A story whose expansion fails is left out; the rest still come back.
    pub async fn select(
        &self,
        candidate_ids: &[ItemId],
        criteria: SortCriteria,
        limit: usize,
    ) -> Vec<Node> {
        let ranked = self.rank(candidate_ids, criteria, limit).await;
        log::info!("Expanding comments for {} stories", ranked.len());

        let mut stories = Vec::with_capacity(ranked.len());
        for summary in ranked {
            match self.expander.expand_with_outcome(summary.id).await {
                Ok(expansion) => {
                    log::info!(
                        "Fetched story {} with {} comments",
                        summary.id,
                        expansion.tree.descendant_count()
                    );
                    stories.push(expansion.tree);
                }
                Err(error) => {
                    log::warn!("Excluding story {} ({}): {}", summary.id, summary.title, error)
                }
            }
        }
        stories
    }
}
