//! Persistence for best-story days and generated issues.
//!
//! Two stores live side by side:
//! - SQLite (`db_path`): the best-story dedup table and the issue records
//! - Filesystem (`{data_dir}/issues/`): rendered chapters and issue metadata

mod best_stories;
mod db;
mod issues;
pub mod local;

use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::IssueMeta;

pub use best_stories::BestStoryRepository;
pub use db::Database;
pub use issues::{IssueFormat, IssueRepository, StoredIssue};
pub use local::LocalStorage;

/// Where an issue ended up and which files it consists of.
#[derive(Debug, Clone)]
pub struct WrittenIssue {
    pub dir: PathBuf,
    pub formats: Vec<IssueFormat>,
}

/// Trait for rendered issue storage backends.
#[async_trait]
pub trait IssueStorage: Send + Sync {
    /// Write chapters, stylesheet and metadata under `slug`.
    async fn write_issue(
        &self,
        slug: &str,
        meta: &IssueMeta,
        chapters: &[String],
    ) -> Result<WrittenIssue>;
}
