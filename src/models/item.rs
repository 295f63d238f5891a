//! Records from the remote record API.
//!
//! The wire format is a loosely typed JSON object whose shape depends on
//! which fields are present. [`RawItem`] mirrors that shape and is decoded
//! exactly once into the tagged [`Item`] variant; nothing downstream inspects
//! for field presence.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Numeric id of a story or comment.
pub type ItemId = u64;

/// An item as it arrives over the wire.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawItem {
    pub id: ItemId,
    #[serde(default)]
    pub by: Option<String>,
    #[serde(default)]
    pub time: Option<i64>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub score: Option<i64>,
    #[serde(default)]
    pub descendants: Option<u64>,
    #[serde(default)]
    pub kids: Vec<ItemId>,
    #[serde(default)]
    pub parent: Option<ItemId>,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub dead: bool,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

/// A top-level submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Story {
    pub id: ItemId,
    pub author: Option<String>,
    pub time: DateTime<Utc>,
    pub title: String,
    pub url: Option<String>,
    pub text: Option<String>,
    pub points: i64,
    pub descendants: u64,
    pub kids: Vec<ItemId>,
}

impl Story {
    /// Link to the discussion page for this story.
    pub fn discussion_url(&self) -> String {
        format!("https://news.ycombinator.com/item?id={}", self.id)
    }

    /// Where the story points: the submitted link, or the discussion for text posts.
    pub fn source_url(&self) -> String {
        match (&self.text, &self.url) {
            (Some(_), _) | (None, None) => self.discussion_url(),
            (None, Some(url)) => url.clone(),
        }
    }
}

/// A live comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: ItemId,
    pub author: String,
    pub time: DateTime<Utc>,
    pub text: String,
    pub parent: Option<ItemId>,
    pub kids: Vec<ItemId>,
}

/// A comment whose content was removed; its replies may survive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletedComment {
    pub id: ItemId,
    pub time: DateTime<Utc>,
    pub parent: Option<ItemId>,
    pub kids: Vec<ItemId>,
}

/// Decoded item.
///
/// `MissingChild` covers records that carry neither an author nor a
/// deleted flag (flagged or dead content). Such records are pruned during
/// tree expansion: they take no numbering slot and their replies are not
/// fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    Story(Story),
    Comment(Comment),
    DeletedComment(DeletedComment),
    MissingChild(ItemId),
}

impl Item {
    pub fn id(&self) -> ItemId {
        match self {
            Item::Story(s) => s.id,
            Item::Comment(c) => c.id,
            Item::DeletedComment(d) => d.id,
            Item::MissingChild(id) => *id,
        }
    }

    /// Ordered child ids as listed by the remote API.
    pub fn kids(&self) -> &[ItemId] {
        match self {
            Item::Story(s) => &s.kids,
            Item::Comment(c) => &c.kids,
            Item::DeletedComment(d) => &d.kids,
            Item::MissingChild(_) => &[],
        }
    }

    pub fn author(&self) -> Option<&str> {
        match self {
            Item::Story(s) => s.author.as_deref(),
            Item::Comment(c) => Some(c.author.as_str()),
            Item::DeletedComment(_) | Item::MissingChild(_) => None,
        }
    }

    pub fn as_story(&self) -> Option<&Story> {
        match self {
            Item::Story(s) => Some(s),
            _ => None,
        }
    }
}

fn timestamp(secs: Option<i64>) -> DateTime<Utc> {
    secs.and_then(|s| DateTime::from_timestamp(s, 0))
        .unwrap_or_default()
}

fn is_story_kind(raw: &RawItem) -> bool {
    match raw.kind.as_deref() {
        Some("story" | "job" | "poll") => true,
        Some(_) => false,
        None => raw.title.is_some(),
    }
}

impl From<RawItem> for Item {
    fn from(raw: RawItem) -> Self {
        let time = timestamp(raw.time);

        if raw.deleted {
            return Item::DeletedComment(DeletedComment {
                id: raw.id,
                time,
                parent: raw.parent,
                kids: raw.kids,
            });
        }

        if is_story_kind(&raw) {
            return Item::Story(Story {
                id: raw.id,
                author: raw.by,
                time,
                title: raw.title.unwrap_or_default(),
                url: raw.url,
                text: raw.text,
                points: raw.score.unwrap_or(0),
                descendants: raw.descendants.unwrap_or(0),
                kids: raw.kids,
            });
        }

        match raw.by {
            Some(author) => Item::Comment(Comment {
                id: raw.id,
                author,
                time,
                text: raw.text.unwrap_or_default(),
                parent: raw.parent,
                kids: raw.kids,
            }),
            None => Item::MissingChild(raw.id),
        }
    }
}
