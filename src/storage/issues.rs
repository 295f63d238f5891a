// src/storage/issues.rs

//! Record of generated issues.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rusqlite::params;

use super::db::Database;
use crate::error::{AppError, Result};
use crate::models::IssueMeta;

/// One file written for an issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueFormat {
    pub file_name: String,
    pub file_size: u64,
    pub mimetype: String,
}

impl IssueFormat {
    pub fn new(file_name: impl Into<String>, file_size: u64, mimetype: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            file_size,
            mimetype: mimetype.into(),
        }
    }
}

/// Issue row as read back for listing.
#[derive(Debug, Clone)]
pub struct StoredIssue {
    pub id: i64,
    pub identifier: String,
    pub created_at: DateTime<Utc>,
    pub period: String,
    pub num_stories: usize,
    pub meta: IssueMeta,
    pub formats: Vec<IssueFormat>,
}

#[derive(Clone)]
pub struct IssueRepository {
    db: Arc<Database>,
}

impl IssueRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Persist an issue with its stories and files; returns the row id.
    pub fn insert(&self, meta: &IssueMeta, formats: &[IssueFormat]) -> Result<i64> {
        let mut conn = self.db.lock();
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO issue (identifier, created_at, period, num_stories, meta)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                meta.identifier,
                meta.created_at.to_rfc3339(),
                meta.scope.label(),
                i64::try_from(meta.num_stories()).unwrap_or(i64::MAX),
                serde_json::to_string(meta)?,
            ],
        )?;
        let issue_id = tx.last_insert_rowid();

        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO issue_story (issue_id, item_id, position) VALUES (?1, ?2, ?3)",
            )?;
            for (position, id) in meta.story_ids.iter().enumerate() {
                let id = i64::try_from(*id)
                    .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
                stmt.execute(params![issue_id, id, position as i64])?;
            }

            let mut stmt = tx.prepare(
                "INSERT INTO issue_format (issue_id, file_name, file_size, mimetype)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for format in formats {
                stmt.execute(params![
                    issue_id,
                    format.file_name,
                    i64::try_from(format.file_size).unwrap_or(i64::MAX),
                    format.mimetype,
                ])?;
            }
        }

        tx.commit()?;
        log::debug!("Stored issue {} as row {}", meta.identifier, issue_id);
        Ok(issue_id)
    }

    /// All issues, newest first.
    pub fn list(&self) -> Result<Vec<StoredIssue>> {
        let conn = self.db.lock();
        let mut stmt = conn.prepare(
            "SELECT id, identifier, created_at, period, num_stories, meta
             FROM issue ORDER BY created_at DESC, id DESC",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, i64>(4)?,
                    row.get::<_, String>(5)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut format_stmt = conn.prepare(
            "SELECT file_name, file_size, mimetype FROM issue_format
             WHERE issue_id = ?1 ORDER BY rowid",
        )?;

        let mut issues = Vec::with_capacity(rows.len());
        for (id, identifier, created_at, period, num_stories, meta) in rows {
            let created_at = DateTime::parse_from_rfc3339(&created_at)
                .map_err(|e| AppError::validation(format!("issue {id} created_at: {e}")))?
                .with_timezone(&Utc);
            let formats = format_stmt
                .query_map(params![id], |row| {
                    Ok(IssueFormat {
                        file_name: row.get(0)?,
                        file_size: row.get::<_, i64>(1)?.max(0) as u64,
                        mimetype: row.get(2)?,
                    })
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            issues.push(StoredIssue {
                id,
                identifier,
                created_at,
                period,
                num_stories: num_stories.max(0) as usize,
                meta: serde_json::from_str(&meta)?,
                formats,
            });
        }
        Ok(issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{IssueScope, SortCriteria};

    fn meta(secs: i64, ids: &[u64]) -> IssueMeta {
        let stories: Vec<_> = ids.iter().map(|id| (*id, format!("Story {id}"))).collect();
        IssueMeta::new(
            IssueScope::Series { count: ids.len() },
            SortCriteria::Points,
            DateTime::from_timestamp(secs, 0).unwrap(),
            &stories,
        )
    }

    #[test]
    fn test_insert_and_list() {
        let repo = IssueRepository::new(Arc::new(Database::open_in_memory().unwrap()));
        let formats = vec![
            IssueFormat::new("chap_01.xhtml", 120, "application/xhtml+xml"),
            IssueFormat::new("issue.json", 40, "application/json"),
        ];

        repo.insert(&meta(1_705_000_000, &[3, 1]), &formats).unwrap();
        repo.insert(&meta(1_705_100_000, &[9]), &[]).unwrap();

        let issues = repo.list().unwrap();
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].meta.story_ids, vec![9]);
        assert_eq!(issues[1].period, "series");
        assert_eq!(issues[1].num_stories, 2);
        assert_eq!(issues[1].formats, formats);
        assert_eq!(issues[1].meta.story_ids, vec![3, 1]);
    }

    #[test]
    fn test_duplicate_identifier_is_rejected() {
        let repo = IssueRepository::new(Arc::new(Database::open_in_memory().unwrap()));
        let issue = meta(1_705_000_000, &[1]);
        repo.insert(&issue, &[]).unwrap();
        assert!(matches!(repo.insert(&issue, &[]), Err(AppError::Store(_))));
        assert_eq!(repo.list().unwrap().len(), 1);
    }
}
