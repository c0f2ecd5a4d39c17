//! Crawler module for fetching pages and driving site crawls
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching behind the `Fetcher` trait
//! - HTML title and link extraction
//! - The per-site crawl engine
//! - Bounded concurrent scheduling of many sites

mod engine;
mod fetcher;
mod parser;
mod scheduler;

pub use engine::{CrawlEngine, CrawlReport, EngineSettings};
pub use fetcher::{build_http_client, FetchError, FetchedPage, Fetcher, HttpFetcher};
pub use parser::{parse_page, unescape_html, ParsedPage, UNTITLED};
pub use scheduler::{Scheduler, SiteReport};

use crate::config::Config;
use crate::sites::SiteRegistry;
use crate::storage::{LoadMode, SnapshotStore};
use crate::CrawlError;
use std::sync::Arc;

/// Runs a complete crawl of every configured site
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Resolve the configured site ids to policies
/// 2. Build the shared HTTP client
/// 3. Run one engine per site, at most `max_concurrent_sites` at a time
///
/// # Returns
///
/// * `Ok(Vec<SiteReport>)` - Every site reached an outcome, successful or not
/// * `Err(CrawlError)` - The crawl could not be started
pub async fn crawl(config: Config, mode: LoadMode) -> Result<Vec<SiteReport>, CrawlError> {
    let registry = SiteRegistry::from_ids(config.sites.as_slice())?;
    let fetcher = HttpFetcher::from_config(&config)?;
    let store = SnapshotStore::new(&config.output.state_dir);

    let scheduler = Scheduler::new(
        registry.into_policies(),
        Arc::new(fetcher),
        store,
        EngineSettings::from(&config.crawler),
        config.crawler.max_concurrent_sites,
    )
    .with_load_mode(mode);

    Ok(scheduler.run().await)
}
