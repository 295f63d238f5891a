// src/lib.rs

//! hnpress: numbered, navigable Hacker News periodicals.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
