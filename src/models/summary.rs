//! Lightweight story projections used for ranking.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::item::{ItemId, Story};
use crate::error::AppError;

/// Story metadata without its comment tree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StorySummary {
    pub id: ItemId,
    pub title: String,
    pub points: i64,
    pub comment_count: u64,
    pub time: DateTime<Utc>,
    pub author: Option<String>,
    pub source_url: String,
}

impl From<&Story> for StorySummary {
    fn from(story: &Story) -> Self {
        Self {
            id: story.id,
            title: story.title.clone(),
            points: story.points,
            comment_count: story.descendants,
            time: story.time,
            author: story.author.clone(),
            source_url: story.source_url(),
        }
    }
}

/// Ordering applied to candidate stories before truncation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortCriteria {
    /// Oldest first
    Time,
    /// Newest first
    TimeReverse,
    /// Highest score first
    #[default]
    Points,
    /// Most discussed first
    TotalComments,
}

impl SortCriteria {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortCriteria::Time => "time",
            SortCriteria::TimeReverse => "time-reverse",
            SortCriteria::Points => "points",
            SortCriteria::TotalComments => "total-comments",
        }
    }

    /// Stable sort; ties keep their candidate order.
    pub fn sort(&self, stories: &mut [StorySummary]) {
        match self {
            SortCriteria::Time => stories.sort_by(|a, b| a.time.cmp(&b.time)),
            SortCriteria::TimeReverse => stories.sort_by(|a, b| b.time.cmp(&a.time)),
            SortCriteria::Points => stories.sort_by(|a, b| b.points.cmp(&a.points)),
            SortCriteria::TotalComments => {
                stories.sort_by(|a, b| b.comment_count.cmp(&a.comment_count))
            }
        }
    }
}

impl fmt::Display for SortCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortCriteria {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "time" => Ok(SortCriteria::Time),
            "time-reverse" => Ok(SortCriteria::TimeReverse),
            "points" => Ok(SortCriteria::Points),
            "total-comments" => Ok(SortCriteria::TotalComments),
            other => Err(AppError::validation(format!(
                "unknown sort criteria '{other}'"
            ))),
        }
    }
}
