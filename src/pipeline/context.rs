// src/pipeline/context.rs

//! Shared handles for one run, built once at startup.

use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::Config;
use crate::services::{HnClient, ItemSource, ListingClient};
use crate::storage::{BestStoryRepository, Database, IssueRepository, LocalStorage};
use crate::utils::http::create_async_client;

/// Configuration, remote clients and stores for a single invocation.
pub struct AppContext {
    pub config: Config,
    pub hn: HnClient,
    pub source: Arc<dyn ItemSource>,
    pub listings: ListingClient,
    pub best_stories: BestStoryRepository,
    pub issues: IssueRepository,
    pub storage: LocalStorage,
}

impl AppContext {
    /// Validate `config`, open the database and build the HTTP clients.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let db = Arc::new(Database::open(&config.storage.db_path)?);
        Self::with_database(config, db)
    }

    /// Same as [`AppContext::new`] with an already opened database.
    pub fn with_database(config: Config, db: Arc<Database>) -> Result<Self> {
        let client = create_async_client(&config.client)?;
        let hn = HnClient::new(client.clone(), &config.sources);
        Ok(Self {
            source: Arc::new(hn.clone()),
            hn,
            listings: ListingClient::new(client, config.sources.clone()),
            best_stories: BestStoryRepository::new(Arc::clone(&db)),
            issues: IssueRepository::new(db),
            storage: LocalStorage::new(config.issues_dir()),
            config,
        })
    }

    /// Replace the item source, e.g. with an in-memory fake.
    pub fn with_source(mut self, source: Arc<dyn ItemSource>) -> Self {
        self.source = source;
        self
    }
}

/// Run a synchronous store call on the blocking thread pool.
pub(crate) async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::Task(format!("store task failed: {e}")))?
}
