//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlState`: one site's frontier, visited set, and collected articles
//! - `EngineStatus`: lifecycle of the engine that owns a `CrawlState`

mod crawl_state;
mod engine_status;

// Re-export main types
pub use crawl_state::{question_headlines, ArticleMap, ArticleOccurrence, CrawlState};
pub use engine_status::EngineStatus;
