//! In-memory item source for tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;

use super::fetcher::ItemSource;
use crate::error::{AppError, Result};
use crate::models::{Comment, DeletedComment, Item, ItemId, Story};

/// Serves canned items, optionally delayed or failing, and tracks how many
/// fetches were in flight at once.
#[derive(Default)]
pub struct FakeSource {
    items: HashMap<ItemId, Item>,
    broken: HashSet<ItemId>,
    delays: HashMap<ItemId, Duration>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    calls: Mutex<Vec<ItemId>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, item: Item) -> Self {
        self.items.insert(item.id(), item);
        self
    }

    /// Make `id` fail with a transport-style error.
    pub fn broken(mut self, id: ItemId) -> Self {
        self.broken.insert(id);
        self
    }

    pub fn delay(mut self, id: ItemId, millis: u64) -> Self {
        self.delays.insert(id, Duration::from_millis(millis));
        self
    }

    /// Highest number of concurrent fetches observed.
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<ItemId> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ItemSource for FakeSource {
    async fn fetch(&self, id: ItemId) -> Result<Item> {
        self.calls.lock().unwrap().push(id);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        let delay = self.delays.get(&id).copied().unwrap_or(Duration::from_millis(1));
        tokio::time::sleep(delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.broken.contains(&id) {
            return Err(AppError::Status {
                url: format!("fake://item/{id}"),
                status: 503,
            });
        }
        self.items.get(&id).cloned().ok_or(AppError::NotFound(id))
    }
}

pub fn story(id: ItemId, author: &str, kids: &[ItemId]) -> Item {
    Item::Story(Story {
        id,
        author: Some(author.to_string()),
        time: DateTime::from_timestamp(1_700_000_000 + id as i64, 0).unwrap(),
        title: format!("Story {id}"),
        url: Some(format!("https://example.com/{id}")),
        text: None,
        points: 0,
        descendants: kids.len() as u64,
        kids: kids.to_vec(),
    })
}

pub fn ranked_story(id: ItemId, points: i64, comments: u64, secs: i64) -> Item {
    Item::Story(Story {
        id,
        author: Some("pg".to_string()),
        time: DateTime::from_timestamp(secs, 0).unwrap(),
        title: format!("Story {id}"),
        url: Some(format!("https://example.com/{id}")),
        text: None,
        points,
        descendants: comments,
        kids: Vec::new(),
    })
}

pub fn comment(id: ItemId, author: &str, parent: ItemId, kids: &[ItemId]) -> Item {
    Item::Comment(Comment {
        id,
        author: author.to_string(),
        time: DateTime::from_timestamp(1_700_000_000 + id as i64, 0).unwrap(),
        text: format!("<p>comment {id}</p>"),
        parent: Some(parent),
        kids: kids.to_vec(),
    })
}

pub fn deleted(id: ItemId, parent: ItemId, kids: &[ItemId]) -> Item {
    Item::DeletedComment(DeletedComment {
        id,
        time: DateTime::from_timestamp(1_700_000_000 + id as i64, 0).unwrap(),
        parent: Some(parent),
        kids: kids.to_vec(),
    })
}
