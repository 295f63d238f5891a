// src/pipeline/issue.rs

//! Issue generation: pick stories, expand them, render and store.

use std::path::PathBuf;

use chrono::{NaiveDate, Utc};

use super::context::{AppContext, blocking};
use super::render::chapter_html;
use crate::error::{AppError, Result};
use crate::models::{DateWindow, IssueMeta, IssueScope, ItemId, Period, SortCriteria};
use crate::services::StorySelector;
use crate::storage::{IssueStorage, LocalStorage};

/// Stories per issue when no limit is given.
pub const DEFAULT_LIMIT: usize = 10;

/// Which days a new issue covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueWindow {
    /// A calendar period ending on `as_of`
    Period { period: Period, as_of: NaiveDate },
    /// Free-form range text, resolved against `today`
    Custom { range: String, today: NaiveDate },
}

impl IssueWindow {
    fn resolve(&self) -> Result<(DateWindow, IssueScope)> {
        match self {
            IssueWindow::Period { period, as_of } => Ok((
                DateWindow::resolve(*as_of, *period)?,
                IssueScope::Period {
                    period: *period,
                    as_of: *as_of,
                },
            )),
            IssueWindow::Custom { range, today } => {
                let window = DateWindow::parse_range(range, *today)?;
                Ok((window, IssueScope::Range { window }))
            }
        }
    }
}

/// Output options shared by both issue commands.
#[derive(Debug, Clone)]
pub struct IssueOptions {
    pub criteria: SortCriteria,
    pub limit: usize,
    /// Write here instead of the configured issues directory
    pub output: Option<PathBuf>,
    pub persist: bool,
}

impl Default for IssueOptions {
    fn default() -> Self {
        Self {
            criteria: SortCriteria::default(),
            limit: DEFAULT_LIMIT,
            output: None,
            persist: true,
        }
    }
}

impl IssueOptions {
    /// Records are only kept for issues written to the default location.
    fn should_persist(&self) -> bool {
        self.persist && self.output.is_none()
    }
}

/// What a finished issue run produced.
#[derive(Debug, Clone)]
pub struct IssueReport {
    pub meta: IssueMeta,
    pub dir: PathBuf,
    pub chapters: Vec<String>,
    /// Row id when the issue was recorded in the database
    pub record_id: Option<i64>,
}

/// Build an issue from the best stories recorded inside `window`.
pub async fn run_new_issue(
    ctx: &AppContext,
    window: &IssueWindow,
    options: &IssueOptions,
) -> Result<IssueReport> {
    let (range, scope) = window.resolve()?;
    let repo = ctx.best_stories.clone();
    let records = blocking(move || repo.in_window(&range)).await?;
    if records.is_empty() {
        log::error!("No best stories recorded for {}", range);
        return Err(AppError::EmptySelection);
    }
    log::info!("Found {} candidate records for {}", records.len(), range);

    let candidates: Vec<ItemId> = records.iter().map(|r| r.story_id).collect();
    build_issue(ctx, scope, &candidates, options).await
}

/// Build an issue from hand-picked story ids.
pub async fn run_custom_issue(
    ctx: &AppContext,
    story_ids: &[ItemId],
    options: &IssueOptions,
) -> Result<IssueReport> {
    if story_ids.is_empty() {
        return Err(AppError::EmptySelection);
    }
    let options = IssueOptions {
        limit: story_ids.len(),
        ..options.clone()
    };
    let scope = IssueScope::Series {
        count: story_ids.len(),
    };
    build_issue(ctx, scope, story_ids, &options).await
}

async fn build_issue(
    ctx: &AppContext,
    scope: IssueScope,
    candidates: &[ItemId],
    options: &IssueOptions,
) -> Result<IssueReport> {
    let selector = StorySelector::new(ctx.source.clone(), &ctx.config.client);
    let trees = selector
        .select(candidates, options.criteria, options.limit)
        .await;
    if trees.is_empty() {
        log::error!("None of the {} candidates could be fetched", candidates.len());
        return Err(AppError::EmptySelection);
    }

    let chapters: Vec<String> = trees.iter().map(chapter_html).collect();
    let headlines: Vec<(ItemId, String)> = trees
        .iter()
        .filter_map(|tree| tree.item().as_story())
        .map(|story| (story.id, story.title.clone()))
        .collect();
    let meta = IssueMeta::new(scope, options.criteria, Utc::now(), &headlines);
    let slug = meta.scope.slug();

    let written = match &options.output {
        Some(dir) => LocalStorage::new(dir).write_issue(&slug, &meta, &chapters).await?,
        None => ctx.storage.write_issue(&slug, &meta, &chapters).await?,
    };

    let record_id = if options.should_persist() {
        let repo = ctx.issues.clone();
        let (record, formats) = (meta.clone(), written.formats.clone());
        Some(blocking(move || repo.insert(&record, &formats)).await?)
    } else {
        log::debug!("Not recording issue {}", meta.identifier);
        None
    };

    log::info!("{} ready with {} stories", meta.long_title, meta.num_stories());
    Ok(IssueReport {
        meta,
        dir: written.dir,
        chapters,
        record_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use tempfile::TempDir;

    use crate::models::{BestStoryRecord, Config, parse_day};
    use crate::services::testing::{FakeSource, comment, deleted, ranked_story, story};
    use crate::storage::Database;

    fn context(tmp: &TempDir, source: FakeSource) -> AppContext {
        let mut config = Config::default();
        config.storage.data_dir = tmp.path().to_path_buf();
        config.client.max_concurrent = 3;
        let db = Arc::new(Database::open_in_memory().unwrap());
        AppContext::with_database(config, db)
            .unwrap()
            .with_source(Arc::new(source))
    }

    fn discussion() -> FakeSource {
        FakeSource::new()
            .with(story(1, "op", &[11, 12, 13]))
            .with(comment(11, "alice", 1, &[21, 22]))
            .with(deleted(12, 1, &[31]))
            .with(comment(13, "op", 1, &[]))
            .with(comment(21, "bob", 11, &[]))
            .with(comment(22, "op", 11, &[]))
            .with(comment(31, "carol", 12, &[]))
    }

    #[tokio::test]
    async fn test_rendering_ignores_fetch_timing() {
        let tmp = TempDir::new().unwrap();
        let fast = context(&tmp, discussion());
        let slow = context(
            &tmp,
            discussion().delay(11, 40).delay(21, 25).delay(12, 5).delay(31, 30),
        );
        let options = IssueOptions {
            persist: false,
            ..IssueOptions::default()
        };

        let a = run_custom_issue(&fast, &[1], &options).await.unwrap();
        let b = run_custom_issue(&slow, &[1], &options).await.unwrap();
        assert_eq!(a.chapters, b.chapters);
        assert!(a.chapters[0].contains("<span class=\"number\">2.1</span>"));
    }

    #[tokio::test]
    async fn test_new_issue_uses_window_and_persists() {
        let tmp = TempDir::new().unwrap();
        let source = FakeSource::new()
            .with(ranked_story(1, 5, 0, 100))
            .with(ranked_story(2, 9, 0, 200))
            .with(ranked_story(3, 3, 0, 300))
            .with(ranked_story(4, 50, 0, 400));
        let ctx = context(&tmp, source);
        ctx.best_stories
            .insert_many(&[
                BestStoryRecord::new(1, parse_day("2024-01-14").unwrap()),
                BestStoryRecord::new(2, parse_day("2024-01-15").unwrap()),
                BestStoryRecord::new(3, parse_day("2024-01-15").unwrap()),
                BestStoryRecord::new(4, parse_day("2024-01-16").unwrap()),
            ])
            .unwrap();

        let window = IssueWindow::Period {
            period: Period::Daily,
            as_of: parse_day("2024-01-15").unwrap(),
        };
        let options = IssueOptions {
            limit: 2,
            ..IssueOptions::default()
        };
        let report = run_new_issue(&ctx, &window, &options).await.unwrap();

        assert_eq!(report.meta.story_ids, vec![2, 1]);
        assert_eq!(report.dir, tmp.path().join("issues/daily-2024-01-15"));
        assert!(report.dir.join("chap_01.xhtml").exists());
        assert!(report.dir.join("issue.json").exists());
        assert!(report.record_id.is_some());

        let stored = ctx.issues.list().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].period, "daily");
    }

    #[tokio::test]
    async fn test_empty_window_is_empty_selection() {
        let tmp = TempDir::new().unwrap();
        let ctx = context(&tmp, FakeSource::new());
        let window = IssueWindow::Custom {
            range: "last 2 weeks".to_string(),
            today: parse_day("2024-01-15").unwrap(),
        };

        let result = run_new_issue(&ctx, &window, &IssueOptions::default()).await;
        assert!(matches!(result, Err(AppError::EmptySelection)));
        assert!(!tmp.path().join("issues").exists());
    }

    #[tokio::test]
    async fn test_malformed_range_fails_before_any_fetch() {
        let tmp = TempDir::new().unwrap();
        let ctx = context(&tmp, FakeSource::new());
        let window = IssueWindow::Custom {
            range: "2024-01-15..2024-01-01".to_string(),
            today: parse_day("2024-01-15").unwrap(),
        };

        let result = run_new_issue(&ctx, &window, &IssueOptions::default()).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_custom_issue_with_output_is_not_recorded() {
        let tmp = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let ctx = context(&tmp, FakeSource::new().with(ranked_story(7, 1, 0, 100)));
        let options = IssueOptions {
            output: Some(out.path().to_path_buf()),
            ..IssueOptions::default()
        };

        let report = run_custom_issue(&ctx, &[7, 8], &options).await.unwrap();
        assert_eq!(report.meta.story_ids, vec![7]);
        assert_eq!(report.dir, out.path().join("series-2"));
        assert!(report.record_id.is_none());
        assert!(ctx.issues.list().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_no_fetchable_story_is_empty_selection() {
        let tmp = TempDir::new().unwrap();
        let ctx = context(&tmp, FakeSource::new().broken(5));
        let result = run_custom_issue(&ctx, &[5], &IssueOptions::default()).await;
        assert!(matches!(result, Err(AppError::EmptySelection)));
    }
}
