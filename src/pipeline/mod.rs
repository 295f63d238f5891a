//! Pipeline entry points for hnpress operations.
//!
//! - `run_update` / `run_backfill`: Record best stories per day
//! - `run_new_issue` / `run_custom_issue`: Select, expand, render and store an issue

mod context;
mod ingest;
mod issue;
pub mod render;

pub use context::AppContext;
pub use ingest::{BackfillStats, run_backfill, run_update};
pub use issue::{
    DEFAULT_LIMIT, IssueOptions, IssueReport, IssueWindow, run_custom_issue, run_new_issue,
};
