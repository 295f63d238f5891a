// src/storage/best_stories.rs

//! Best story dedup table.
//!
//! Each row says "story X was among the best on day D". Rows are unique per
//! `(item_id, day)` and are never removed outside of migrations.

use std::sync::Arc;

use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{Row, params};

use super::db::Database;
use crate::error::Result;
use crate::models::{BestStoryRecord, DateWindow, ItemId};

const DAY_FORMAT: &str = "%Y-%m-%d";

/// Idempotent store of best-story days.
#[derive(Clone)]
pub struct BestStoryRepository {
    db: Arc<Database>,
}

impl BestStoryRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Insert a batch in one transaction; returns how many rows were new.
    ///
    /// Pairs already present are ignored and not counted. Any fault rolls
    /// back the whole batch.
    pub fn insert_many(&self, records: &[BestStoryRecord]) -> Result<usize> {
        let mut conn = self.db.lock();
        let tx = conn.transaction()?;
        let mut inserted = 0;
        {
            let mut stmt =
                tx.prepare("INSERT OR IGNORE INTO best_story (item_id, day) VALUES (?1, ?2)")?;
            for record in records {
                let id = to_sql_id(record.story_id)?;
                inserted += stmt.execute(params![id, record.day.format(DAY_FORMAT).to_string()])?;
            }
        }
        tx.commit()?;
        Ok(inserted)
    }

    /// Records with `start <= day < end`, newest day first.
    pub fn windowed_ids(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<BestStoryRecord>> {
        let conn = self.db.lock();
        let mut stmt = conn.prepare(
            "SELECT item_id, day FROM best_story
             WHERE day >= ?1 AND day < ?2
             ORDER BY day DESC, rowid ASC",
        )?;
        let rows = stmt.query_map(
            params![
                start.format(DAY_FORMAT).to_string(),
                end.format(DAY_FORMAT).to_string()
            ],
            read_record,
        )?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Records inside `window`.
    pub fn in_window(&self, window: &DateWindow) -> Result<Vec<BestStoryRecord>> {
        self.windowed_ids(window.start, window.end)
    }

    /// Every record, newest day first.
    pub fn all(&self) -> Result<Vec<BestStoryRecord>> {
        let conn = self.db.lock();
        let mut stmt =
            conn.prepare("SELECT item_id, day FROM best_story ORDER BY day DESC, rowid ASC")?;
        let rows = stmt.query_map([], read_record)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}

fn to_sql_id(id: ItemId) -> rusqlite::Result<i64> {
    i64::try_from(id).map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

fn read_record(row: &Row<'_>) -> rusqlite::Result<BestStoryRecord> {
    let id: i64 = row.get(0)?;
    let day: String = row.get(1)?;
    let story_id = ItemId::try_from(id)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Integer, Box::new(e)))?;
    let day = NaiveDate::parse_from_str(&day, DAY_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(e)))?;
    Ok(BestStoryRecord::new(story_id, day))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    fn repo() -> BestStoryRepository {
        BestStoryRepository::new(Arc::new(Database::open_in_memory().unwrap()))
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DAY_FORMAT).unwrap()
    }

    fn record(id: ItemId, d: &str) -> BestStoryRecord {
        BestStoryRecord::new(id, day(d))
    }

    #[test]
    fn test_insert_many_is_idempotent() {
        let repo = repo();
        let batch = vec![record(1, "2024-01-14"), record(2, "2024-01-14"), record(1, "2024-01-15")];

        assert_eq!(repo.insert_many(&batch).unwrap(), 3);
        let before = repo.all().unwrap();

        assert_eq!(repo.insert_many(&batch).unwrap(), 0);
        assert_eq!(repo.all().unwrap(), before);
    }

    #[test]
    fn test_duplicates_within_batch_count_once() {
        let repo = repo();
        let batch = vec![record(7, "2024-01-14"), record(7, "2024-01-14")];
        assert_eq!(repo.insert_many(&batch).unwrap(), 1);
    }

    #[test]
    fn test_window_is_half_open() {
        let repo = repo();
        repo.insert_many(&[
            record(1, "2024-01-07"),
            record(2, "2024-01-08"),
            record(3, "2024-01-12"),
            record(4, "2024-01-15"),
            record(5, "2024-01-16"),
        ])
        .unwrap();

        let ids: Vec<ItemId> = repo
            .windowed_ids(day("2024-01-08"), day("2024-01-16"))
            .unwrap()
            .iter()
            .map(|r| r.story_id)
            .collect();
        assert_eq!(ids, vec![4, 3, 2]);
    }

    #[test]
    fn test_window_orders_by_day_desc_then_insertion() {
        let repo = repo();
        repo.insert_many(&[record(30, "2024-01-14"), record(10, "2024-01-14")])
            .unwrap();
        repo.insert_many(&[record(20, "2024-01-15")]).unwrap();

        let records = repo.windowed_ids(day("2024-01-01"), day("2024-02-01")).unwrap();
        assert_eq!(
            records,
            vec![record(20, "2024-01-15"), record(30, "2024-01-14"), record(10, "2024-01-14")]
        );
    }

    #[test]
    fn test_failed_batch_rolls_back_entirely() {
        let repo = repo();
        let batch = vec![record(1, "2024-01-14"), record(ItemId::MAX, "2024-01-14")];

        let result = repo.insert_many(&batch);
        assert!(matches!(result, Err(AppError::Store(_))));
        assert!(repo.all().unwrap().is_empty());
    }

    #[test]
    fn test_in_window_matches_windowed_ids() {
        let repo = repo();
        repo.insert_many(&[record(1, "2024-01-15")]).unwrap();
        let window = DateWindow::new(day("2024-01-15"), day("2024-01-16")).unwrap();
        assert_eq!(repo.in_window(&window).unwrap().len(), 1);
    }
}
