//! Crawl engine - one site's fetch-and-expand loop
//!
//! Each iteration:
//! 1. Picks a frontier URL uniformly at random
//! 2. Fetches it; a failed fetch just marks the URL visited
//! 3. Normalizes the title and records an article if the URL classifies as one
//! 4. Adds followable, unvisited outbound links to the frontier
//! 5. Saves a snapshot every `checkpoint_interval` visited URLs
//!
//! The loop ends `Completed` once the article target is met, `Starved` when
//! the frontier runs dry first, or `Failed` if a snapshot cannot be saved.

use crate::config::CrawlerConfig;
use crate::crawler::fetcher::{FetchedPage, Fetcher};
use crate::crawler::parser::unescape_html;
use crate::sites::SitePolicy;
use crate::state::{CrawlState, EngineStatus};
use crate::storage::{LoadMode, SnapshotStore};
use crate::CrawlError;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Per-engine limits, taken from the `[crawler]` configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    /// Stop once this many distinct article titles are collected
    pub article_target: usize,

    /// Save after this many visited URLs
    pub checkpoint_interval: usize,
}

impl From<&CrawlerConfig> for EngineSettings {
    fn from(config: &CrawlerConfig) -> Self {
        Self {
            article_target: config.article_target,
            checkpoint_interval: config.checkpoint_interval,
        }
    }
}

/// Summary of one finished site crawl
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlReport {
    pub site: String,
    pub status: EngineStatus,
    pub visited: usize,
    pub frontier: usize,
    pub articles: usize,
    /// Fetches attempted during this run
    pub fetched: usize,
    /// Fetches that failed during this run
    pub fetch_failures: usize,
    pub elapsed: Duration,
}

/// Drives one site's crawl
pub struct CrawlEngine {
    policy: Arc<dyn SitePolicy>,
    fetcher: Arc<dyn Fetcher>,
    store: SnapshotStore,
    state: CrawlState,
    settings: EngineSettings,
    status: EngineStatus,
    rng: StdRng,
    since_checkpoint: usize,
    fetched: usize,
    fetch_failures: usize,
}

impl CrawlEngine {
    /// Creates an engine over an already-loaded state
    pub fn new(
        policy: Arc<dyn SitePolicy>,
        fetcher: Arc<dyn Fetcher>,
        store: SnapshotStore,
        state: CrawlState,
        settings: EngineSettings,
    ) -> Self {
        Self {
            policy,
            fetcher,
            store,
            state,
            settings,
            status: EngineStatus::Idle,
            rng: StdRng::from_os_rng(),
            since_checkpoint: 0,
            fetched: 0,
            fetch_failures: 0,
        }
    }

    /// Creates an engine, loading the site's state from `store`
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlEngine)` - Engine ready to run
    /// * `Err(CrawlError)` - The existing snapshot is unreadable
    pub fn open(
        policy: Arc<dyn SitePolicy>,
        fetcher: Arc<dyn Fetcher>,
        store: SnapshotStore,
        mode: &LoadMode,
        settings: EngineSettings,
    ) -> Result<Self, CrawlError> {
        let state = store.load_with(mode, policy.id(), policy.root_url())?;
        Ok(Self::new(policy, fetcher, store, state, settings))
    }

    /// Replaces the random source with a seeded one
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn site(&self) -> &str {
        self.policy.id()
    }

    pub fn state(&self) -> &CrawlState {
        &self.state
    }

    pub fn status(&self) -> EngineStatus {
        self.status
    }

    /// Runs iterations until a terminal status is reached
    pub async fn run(mut self) -> Result<CrawlReport, CrawlError> {
        let start_time = Instant::now();

        tracing::info!(
            site = self.site(),
            frontier = self.state.frontier().len(),
            visited = self.state.visited().len(),
            articles = self.state.article_count(),
            "Crawling"
        );

        while self.step().await?.is_none() {}

        let report = self.report(start_time.elapsed());
        tracing::info!(
            site = %report.site,
            status = %report.status,
            frontier = report.frontier,
            visited = report.visited,
            articles = report.articles,
            fetched = report.fetched,
            failures = report.fetch_failures,
            "Crawled in {:?}",
            report.elapsed
        );
        Ok(report)
    }

    /// Performs one iteration
    ///
    /// # Returns
    ///
    /// * `Ok(None)` - The engine is still running
    /// * `Ok(Some(status))` - The engine has reached a terminal status
    /// * `Err(CrawlError)` - A snapshot could not be saved; the engine is `Failed`
    pub async fn step(&mut self) -> Result<Option<EngineStatus>, CrawlError> {
        if self.status.is_terminal() {
            return Ok(Some(self.status));
        }
        if self.status == EngineStatus::Idle {
            self.transition(EngineStatus::Running)?;
        }

        if let Some(status) = self.terminal_condition() {
            return self.finish(status).map(Some);
        }

        let Some(url) = self.state.sample_frontier(&mut self.rng) else {
            return self.finish(EngineStatus::Starved).map(Some);
        };
        self.visit(url).await;

        self.since_checkpoint += 1;
        if self.since_checkpoint >= self.settings.checkpoint_interval {
            self.persist()?;
            tracing::info!(
                site = self.site(),
                frontier = self.state.frontier().len(),
                visited = self.state.visited().len(),
                articles = self.state.article_count(),
                "Checkpoint saved"
            );
        }

        match self.terminal_condition() {
            Some(status) => self.finish(status).map(Some),
            None => Ok(None),
        }
    }

    fn terminal_condition(&self) -> Option<EngineStatus> {
        if self.state.article_count() >= self.settings.article_target {
            Some(EngineStatus::Completed)
        } else if self.state.frontier().is_empty() {
            Some(EngineStatus::Starved)
        } else {
            None
        }
    }

    /// Fetches one URL and folds the result into the state
    async fn visit(&mut self, url: String) {
        self.fetched += 1;
        let root = self.policy.root_url().clone();

        match self.fetcher.fetch(&url, &root).await {
            Ok(page) => self.absorb(url, page),
            Err(e) => {
                self.fetch_failures += 1;
                tracing::debug!(site = self.site(), url = %url, error = %e, "Fetch failed");
                self.state.mark_visited(&url);
            }
        }
    }

    fn absorb(&mut self, url: String, page: FetchedPage) {
        let title = self.policy.normalize_title(&unescape_html(&page.title));
        let is_article = self.policy.is_article(&url);

        self.state.mark_visited(&url);
        tracing::debug!(
            site = self.site(),
            url = %url,
            title = %title,
            raw_title = %page.title,
            is_article,
            "Visited page"
        );

        if is_article {
            self.state.record_article(title, page.title, url);
        }

        for link in page.links {
            if !self.state.is_visited(&link) && self.policy.may_follow(&link) {
                self.state.push_frontier(link);
            }
        }
    }

    /// Final save, then the terminal transition
    fn finish(&mut self, status: EngineStatus) -> Result<EngineStatus, CrawlError> {
        self.persist()?;
        if status == EngineStatus::Starved {
            tracing::warn!(
                site = self.site(),
                articles = self.state.article_count(),
                target = self.settings.article_target,
                "Ran out of URLs before reaching the article target"
            );
        }
        self.transition(status)?;
        Ok(status)
    }

    fn persist(&mut self) -> Result<(), CrawlError> {
        match self.store.save(&self.state) {
            Ok(()) => {
                self.since_checkpoint = 0;
                Ok(())
            }
            Err(e) => {
                tracing::error!(site = self.site(), error = %e, "Failed to save snapshot");
                self.transition(EngineStatus::Failed)?;
                Err(e.into())
            }
        }
    }

    fn transition(&mut self, to: EngineStatus) -> Result<(), CrawlError> {
        if !self.status.can_transition_to(to) {
            return Err(CrawlError::InvalidTransition {
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }

    fn report(&self, elapsed: Duration) -> CrawlReport {
        CrawlReport {
            site: self.site().to_string(),
            status: self.status,
            visited: self.state.visited().len(),
            frontier: self.state.frontier().len(),
            articles: self.state.article_count(),
            fetched: self.fetched,
            fetch_failures: self.fetch_failures,
            elapsed,
        }
    }
}
