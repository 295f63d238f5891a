// src/services/fetcher.rs

//! Item fetcher for the remote record API.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use crate::error::{AppError, Result};
use crate::models::{Item, ItemId, RawItem, SourcesConfig};

/// Anything that can produce an item by id.
///
/// One call is one network round trip. Implementations do not retry; a
/// missing record is [`AppError::NotFound`] and transport failures surface
/// as [`AppError::Network`].
#[async_trait]
pub trait ItemSource: Send + Sync {
    async fn fetch(&self, id: ItemId) -> Result<Item>;
}

/// Client for the Hacker News Firebase API.
#[derive(Clone)]
pub struct HnClient {
    client: Client,
    api_base: String,
}

impl HnClient {
    pub fn new(client: Client, sources: &SourcesConfig) -> Self {
        Self {
            client,
            api_base: sources.api_base.trim_end_matches('/').to_string(),
        }
    }

    fn item_url(&self, id: ItemId) -> String {
        format!("{}/item/{}.json", self.api_base, id)
    }

    /// Ids currently listed in the best stories feed, in feed order.
    pub async fn best_story_ids(&self) -> Result<Vec<ItemId>> {
        let url = format!("{}/beststories.json", self.api_base);
        let ids = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<ItemId>>()
            .await?;
        Ok(ids)
    }
}

#[async_trait]
impl ItemSource for HnClient {
    async fn fetch(&self, id: ItemId) -> Result<Item> {
        let response = self.client.get(self.item_url(id)).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(id));
        }
        // The API answers unknown ids with a literal `null`.
        let raw: Option<RawItem> = response.error_for_status()?.json().await?;
        raw.map(Item::from).ok_or(AppError::NotFound(id))
    }
}
