//! Issue metadata.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::item::ItemId;
use super::period::{DateWindow, Period};
use super::summary::SortCriteria;

/// How the stories of an issue were chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum IssueScope {
    /// A calendar period ending on `as_of`
    Period { period: Period, as_of: NaiveDate },
    /// An explicit date range
    Range { window: DateWindow },
    /// Hand-picked story ids
    Series { count: usize },
}

impl IssueScope {
    /// Period label stored with the issue record.
    pub fn label(&self) -> &'static str {
        match self {
            IssueScope::Period { period, .. } => period.as_str(),
            IssueScope::Range { .. } => "custom",
            IssueScope::Series { .. } => "series",
        }
    }

    /// Short file-system friendly name, e.g. `weekly-2024-01-15`.
    pub fn slug(&self) -> String {
        match self {
            IssueScope::Period { period, as_of } => format!("{period}-{as_of}"),
            IssueScope::Range { window } => format!("{}-{}", window.start, window.end),
            IssueScope::Series { count } => format!("series-{count}"),
        }
    }

    /// Title, long title and subtitle.
    pub fn titles(&self) -> (String, String, String) {
        match self {
            IssueScope::Period { period, as_of } => {
                let title = format!("Hacker News {}", period.title());
                let (long, subtitle) = match period {
                    Period::Daily => (
                        as_of.format("%a, %d %b, %Y").to_string(),
                        as_of.format("for the day of %a, %d %b, %Y").to_string(),
                    ),
                    Period::Weekly => (
                        as_of.format("%a, %d %b, %Y").to_string(),
                        as_of.format("for week %V of %Y").to_string(),
                    ),
                    Period::Monthly => (
                        as_of.format("%Y %B").to_string(),
                        as_of.format("for the month of %B %Y").to_string(),
                    ),
                };
                (title.clone(), format!("{title} ({long})"), subtitle)
            }
            IssueScope::Range { window } => {
                let title = "Hacker News Digest".to_string();
                let long = format!("{title} ({} to {})", window.start, window.end);
                let subtitle = format!("for {} to {}", window.start, window.end);
                (title, long, subtitle)
            }
            IssueScope::Series { count } => {
                let title = "Hacker News Series".to_string();
                let subtitle = format!("the finest {count} hand-picked stories");
                (title.clone(), title, subtitle)
            }
        }
    }
}

/// Descriptive metadata written next to the rendered chapters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IssueMeta {
    pub identifier: String,
    pub title: String,
    pub long_title: String,
    pub subtitle: String,
    pub scope: IssueScope,
    pub criteria: SortCriteria,
    pub created_at: DateTime<Utc>,
    pub story_ids: Vec<ItemId>,
    pub headlines: Vec<String>,
    /// Plain-text blurb listing the headlines
    pub description: String,
}

impl IssueMeta {
    pub fn new(
        scope: IssueScope,
        criteria: SortCriteria,
        created_at: DateTime<Utc>,
        stories: &[(ItemId, String)],
    ) -> Self {
        let (title, long_title, subtitle) = scope.titles();
        let story_ids: Vec<ItemId> = stories.iter().map(|(id, _)| *id).collect();
        let headlines: Vec<String> = stories.iter().map(|(_, title)| title.clone()).collect();
        let description = format!(
            "{title} {subtitle}\n\nThere are {} stories in this issue:\n\n{}",
            headlines.len(),
            headlines.join("\n\n")
        );
        Self {
            identifier: issue_identifier(&scope, created_at, &story_ids),
            title,
            long_title,
            subtitle,
            scope,
            criteria,
            created_at,
            story_ids,
            headlines,
            description,
        }
    }

    pub fn num_stories(&self) -> usize {
        self.story_ids.len()
    }
}

/// Content-derived identifier: sha256 over scope, creation time and story ids.
fn issue_identifier(scope: &IssueScope, created_at: DateTime<Utc>, ids: &[ItemId]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(scope.slug().as_bytes());
    hasher.update(created_at.to_rfc3339().as_bytes());
    for id in ids {
        hasher.update(id.to_be_bytes());
    }
    format!("urn:sha256:{}", hex::encode(hasher.finalize()))
}
