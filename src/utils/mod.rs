//! Utility functions and helpers.

pub mod http;

use std::collections::HashSet;

use regex::Regex;

use crate::models::ItemId;

/// Extract an item id from a discussion link such as `item?id=123`.
pub fn extract_item_id(href: &str) -> Option<ItemId> {
    let pattern = Regex::new(r"item\?id=(\d+)").ok()?;
    pattern
        .captures(href)
        .and_then(|caps| caps.get(1))
        .and_then(|id| id.as_str().parse().ok())
}

/// Extract every discussion id linked from a page, first occurrence order.
pub fn extract_item_ids(text: &str) -> Vec<ItemId> {
    let Ok(pattern) = Regex::new(r"item\?id=(\d+)") else {
        return Vec::new();
    };
    let mut seen = HashSet::new();
    pattern
        .captures_iter(text)
        .filter_map(|caps| caps.get(1)?.as_str().parse::<ItemId>().ok())
        .filter(|id| seen.insert(*id))
        .collect()
}

/// Zero-padded width for chapter numbers, at least two digits.
pub fn chapter_width(total: usize) -> usize {
    total.to_string().len().max(2)
}
