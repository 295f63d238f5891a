//! Local filesystem storage for rendered issues.
//!
//! ## Storage Layout
//!
//! ```text
//! {data_dir}/issues/
//! └── {slug}/
//!     ├── issue.json        # IssueMeta
//!     ├── chap_01.xhtml     # One chapter per story
//!     ├── chap_02.xhtml
//!     └── style/
//!         └── comments.css
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use tokio::io::AsyncWriteExt;

use crate::error::Result;
use crate::models::IssueMeta;
use crate::storage::{IssueFormat, IssueStorage, WrittenIssue};
use crate::utils::chapter_width;

const CHAPTER_MIMETYPE: &str = "application/xhtml+xml";
const META_FILE: &str = "issue.json";
const STYLESHEET_FILE: &str = "style/comments.css";

const STYLESHEET: &str = "\
ol { padding-left: 1.2em; }
li { margin-top: 0.6em; }
.comment-meta { font-size: 0.85em; color: #555; }
.comment-op { background: #fdf6e3; }
.comment-deleted { color: #999; }
.comment-links a { margin-right: 0.5em; }
.number { font-weight: bold; margin-right: 0.4em; }
footer.op { display: inline; font-weight: bold; color: #b58900; }
.op-body { border-left: 3px solid #b58900; padding-left: 0.5em; }
.replies { color: #888; }
";

/// Local filesystem storage backend.
#[derive(Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    /// Get the full path for a relative key.
    fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }

    async fn ensure_dir(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<u64> {
        let path = self.path(key);
        self.ensure_dir(&path).await?;

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(bytes.len() as u64)
    }

    async fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<u64> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.write_bytes(key, &bytes).await
    }
}

/// `chap_01.xhtml`, `chap_02.xhtml`, ... padded to fit `total`.
pub fn chapter_file_name(index: usize, total: usize) -> String {
    format!("chap_{:0width$}.xhtml", index + 1, width = chapter_width(total))
}

#[async_trait]
impl IssueStorage for LocalStorage {
    async fn write_issue(
        &self,
        slug: &str,
        meta: &IssueMeta,
        chapters: &[String],
    ) -> Result<WrittenIssue> {
        let mut formats = Vec::with_capacity(chapters.len() + 2);

        for (index, chapter) in chapters.iter().enumerate() {
            let name = chapter_file_name(index, chapters.len());
            let size = self
                .write_bytes(&format!("{slug}/{name}"), chapter.as_bytes())
                .await?;
            formats.push(IssueFormat::new(name, size, CHAPTER_MIMETYPE));
        }

        let size = self
            .write_bytes(&format!("{slug}/{STYLESHEET_FILE}"), STYLESHEET.as_bytes())
            .await?;
        formats.push(IssueFormat::new(STYLESHEET_FILE, size, "text/css"));

        let size = self.write_json(&format!("{slug}/{META_FILE}"), meta).await?;
        formats.push(IssueFormat::new(META_FILE, size, "application/json"));

        let dir = self.path(slug);
        log::info!("Wrote {} chapters to {}", chapters.len(), dir.display());
        Ok(WrittenIssue { dir, formats })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{IssueScope, SortCriteria};
    use chrono::DateTime;
    use tempfile::TempDir;

    fn meta() -> IssueMeta {
        IssueMeta::new(
            IssueScope::Series { count: 2 },
            SortCriteria::Points,
            DateTime::from_timestamp(1_705_320_000, 0).unwrap(),
            &[(1, "One".to_string()), (2, "Two".to_string())],
        )
    }

    #[tokio::test]
    async fn test_write_and_read() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        assert_eq!(storage.write_bytes("a/test.txt", b"hello").await.unwrap(), 5);
        let data = std::fs::read(tmp.path().join("a/test.txt")).unwrap();
        assert_eq!(data, b"hello".to_vec());
        assert!(!tmp.path().join("a/test.tmp").exists());
    }

    #[test]
    fn test_chapter_file_names() {
        assert_eq!(chapter_file_name(0, 3), "chap_01.xhtml");
        assert_eq!(chapter_file_name(9, 10), "chap_10.xhtml");
        assert_eq!(chapter_file_name(4, 120), "chap_005.xhtml");
    }

    #[tokio::test]
    async fn test_write_issue_layout() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        let chapters = vec!["<html>1</html>".to_string(), "<html>2</html>".to_string()];

        let written = storage
            .write_issue("series-2", &meta(), &chapters)
            .await
            .unwrap();

        assert_eq!(written.dir, tmp.path().join("series-2"));
        assert!(written.dir.join("chap_01.xhtml").exists());
        assert!(written.dir.join("chap_02.xhtml").exists());
        assert!(written.dir.join("style/comments.css").exists());

        let names: Vec<_> = written.formats.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(
            names,
            vec!["chap_01.xhtml", "chap_02.xhtml", "style/comments.css", "issue.json"]
        );
        assert_eq!(written.formats[0].file_size, 14);

        let json = std::fs::read(written.dir.join("issue.json")).unwrap();
        let loaded: IssueMeta = serde_json::from_slice(&json).unwrap();
        assert_eq!(loaded, meta());
        assert!(loaded.description.contains("There are 2 stories"));
    }
}
