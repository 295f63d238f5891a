// src/error.rs

//! Unified error handling for the periodical builder.

use std::fmt;

use thiserror::Error;

use crate::models::ItemId;

/// Result type alias for hnpress operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Transport failure or timeout talking to a remote endpoint
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Remote endpoint answered with a status we do not handle
    #[error("Unexpected HTTP status {status} from {url}")]
    Status { url: String, status: u16 },

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// SQLite store fault
    #[error("Store error: {0}")]
    Store(#[from] rusqlite::Error),

    /// The remote record API has no record for this id
    #[error("Item {0} not found")]
    NotFound(ItemId),

    /// The root of a story tree could not be fetched
    #[error("Story root {0} is missing")]
    RootMissing(ItemId),

    /// The fetch pool was shut down while a fetch waited for a slot
    #[error("Fetch pool closed")]
    PoolClosed,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A blocking store task panicked or was cancelled
    #[error("Background task failed: {0}")]
    Task(String),

    /// Input validation error (period, range, arguments)
    #[error("Validation error: {0}")]
    Validation(String),

    /// A digest page could not be scraped
    #[error("Scrape error for {context}: {message}")]
    Scrape { context: String, message: String },

    /// No stories qualified for an issue
    #[error("No stories were found in the selected range")]
    EmptySelection,
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a scrape error with context.
    pub fn scrape(context: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Scrape {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Process exit code for this error when it reaches the CLI.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::EmptySelection => 2,
            Self::Config(_) | Self::Validation(_) | Self::Toml(_) => 99,
            _ => 1,
        }
    }
}
