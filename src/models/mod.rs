// src/models/mod.rs

//! Domain models for the periodical builder.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod issue;
mod item;
mod node;
mod period;
mod summary;

// Re-export all public types
pub use config::{ClientConfig, Config, LoggingConfig, SourcesConfig, StorageConfig};
pub use issue::{IssueMeta, IssueScope};
pub use item::{Comment, DeletedComment, Item, ItemId, RawItem, Story};
pub use node::Node;
pub use period::{DateWindow, Period, parse_day};
pub use summary::{SortCriteria, StorySummary};

use chrono::NaiveDate;

/// A story id recorded as best on a calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct BestStoryRecord {
    pub story_id: ItemId,
    pub day: NaiveDate,
}

impl BestStoryRecord {
    pub fn new(story_id: ItemId, day: NaiveDate) -> Self {
        Self { story_id, day }
    }
}
