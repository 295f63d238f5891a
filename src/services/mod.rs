//! Service layer for the periodical builder.
//!
//! This module contains the business logic for:
//! - Item fetching (`ItemSource`, `HnClient`)
//! - Bounded tree expansion (`TreeExpander`, `FetchPool`)
//! - Candidate ranking and expansion (`StorySelector`)
//! - Archived best-story listings (`ListingClient`)

mod expander;
mod fetcher;
mod listings;
mod pool;
mod selector;

#[cfg(test)]
pub(crate) mod testing;

pub use expander::{ExpandOutcome, Expansion, TreeExpander};
pub use fetcher::{HnClient, ItemSource};
pub use listings::{ListingClient, ListingSource};
pub use pool::FetchPool;
pub use selector::StorySelector;
