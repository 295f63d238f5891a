// src/pipeline/ingest.rs

//! Recording which stories were best on which day.

use chrono::NaiveDate;

use super::context::{AppContext, blocking};
use crate::error::Result;
use crate::models::{BestStoryRecord, DateWindow, ItemId};
use crate::services::ListingSource;

/// Counts for one backfill run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackfillStats {
    pub days: usize,
    pub failed_days: Vec<NaiveDate>,
    pub processed: usize,
    pub inserted: usize,
}

fn records_for(day: NaiveDate, ids: &[ItemId]) -> Vec<BestStoryRecord> {
    ids.iter().map(|id| BestStoryRecord::new(*id, day)).collect()
}

/// Record the live best stories feed under `today`; returns the new row count.
pub async fn run_update(ctx: &AppContext, today: NaiveDate) -> Result<usize> {
    let ids = ctx.hn.best_story_ids().await?;
    let repo = ctx.best_stories.clone();
    let records = records_for(today, &ids);
    let inserted = blocking(move || repo.insert_many(&records)).await?;
    log::info!(
        "Processed {} best stories for {}, {} new",
        ids.len(),
        today,
        inserted
    );
    Ok(inserted)
}

/// Walk `window` day by day and record each day's archived listing.
///
/// A day whose listing cannot be fetched or stored is logged and skipped.
pub async fn run_backfill(
    ctx: &AppContext,
    window: DateWindow,
    source: ListingSource,
) -> Result<BackfillStats> {
    let mut stats = BackfillStats::default();
    log::info!("Backfilling {} from {}", window, source);

    for day in window.days() {
        stats.days += 1;
        let ids = match ctx.listings.ids_for(source, day).await {
            Ok(ids) => ids,
            Err(e) => {
                log::warn!("Skipping {}: {}", day, e);
                stats.failed_days.push(day);
                continue;
            }
        };
        let repo = ctx.best_stories.clone();
        let records = records_for(day, &ids);
        match blocking(move || repo.insert_many(&records)).await {
            Ok(inserted) => {
                log::info!("{}: {} stories, {} new", day, ids.len(), inserted);
                stats.processed += ids.len();
                stats.inserted += inserted;
            }
            Err(e) => {
                log::warn!("Skipping {}: {}", day, e);
                stats.failed_days.push(day);
            }
        }
    }

    log::info!(
        "Backfill done: {} days, {} failed, {} new records",
        stats.days,
        stats.failed_days.len(),
        stats.inserted
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::models::{Config, parse_day};
    use crate::storage::Database;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn context(server: &MockServer) -> AppContext {
        let mut config = Config::default();
        config.sources.api_base = server.uri();
        config.sources.digest_base = format!("{}/hn-daily", server.uri());
        let db = Arc::new(Database::open_in_memory().unwrap());
        AppContext::with_database(config, db).unwrap()
    }

    #[tokio::test]
    async fn test_update_is_idempotent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/beststories.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[3, 1, 2]"))
            .mount(&server)
            .await;
        let ctx = context(&server);
        let today = parse_day("2024-01-15").unwrap();

        assert_eq!(run_update(&ctx, today).await.unwrap(), 3);
        assert_eq!(run_update(&ctx, today).await.unwrap(), 0);
        assert_eq!(ctx.best_stories.all().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_backfill_skips_failing_days() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/hn-daily/2024-01-14.html"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"<a href="https://news.ycombinator.com/item?id=10">c</a>"#),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/hn-daily/2024-01-15.html"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/hn-daily/2024-01-16.html"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<a href="https://news.ycombinator.com/item?id=10">c</a>
                   <a href="https://news.ycombinator.com/item?id=11">c</a>"#,
            ))
            .mount(&server)
            .await;

        let ctx = context(&server);
        let window =
            DateWindow::new(parse_day("2024-01-14").unwrap(), parse_day("2024-01-17").unwrap())
                .unwrap();
        let stats = run_backfill(&ctx, window, ListingSource::Digest).await.unwrap();

        assert_eq!(stats.days, 3);
        assert_eq!(stats.failed_days, vec![parse_day("2024-01-15").unwrap()]);
        assert_eq!(stats.inserted, 3);
        assert_eq!(ctx.best_stories.all().unwrap().len(), 3);
    }
}
