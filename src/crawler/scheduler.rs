//! Scheduler for running many site engines at once
//!
//! This module handles:
//! - Starting one engine per configured site
//! - Keeping at most `max_concurrent_sites` engines active, starting the next
//!   pending site as soon as one finishes
//! - Collecting each site's outcome without letting one failure stop the rest

use crate::crawler::engine::{CrawlEngine, CrawlReport, EngineSettings};
use crate::crawler::fetcher::Fetcher;
use crate::sites::SitePolicy;
use crate::storage::{LoadMode, SnapshotStore};
use crate::CrawlError;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::task::JoinSet;

/// Final outcome of one site
#[derive(Debug)]
pub struct SiteReport {
    pub site: String,
    pub outcome: Result<CrawlReport, CrawlError>,
}

impl SiteReport {
    /// True when the engine ended `Completed` or `Starved`
    pub fn is_success(&self) -> bool {
        matches!(&self.outcome, Ok(report) if report.status.is_success())
    }
}

/// Runs engines for a set of sites with bounded concurrency
pub struct Scheduler {
    policies: Vec<Arc<dyn SitePolicy>>,
    fetcher: Arc<dyn Fetcher>,
    store: SnapshotStore,
    mode: LoadMode,
    settings: EngineSettings,
    max_active: usize,
}

impl Scheduler {
    /// Creates a scheduler that resumes every site from its snapshot
    ///
    /// A `max_active` of zero is treated as one.
    pub fn new(
        policies: Vec<Arc<dyn SitePolicy>>,
        fetcher: Arc<dyn Fetcher>,
        store: SnapshotStore,
        settings: EngineSettings,
        max_active: usize,
    ) -> Self {
        Self {
            policies,
            fetcher,
            store,
            mode: LoadMode::Resume,
            settings,
            max_active: max_active.max(1),
        }
    }

    pub fn with_load_mode(mut self, mode: LoadMode) -> Self {
        self.mode = mode;
        self
    }

    /// Crawls every site to a terminal status
    ///
    /// Reports are returned in the order the sites were given.
    pub async fn run(self) -> Vec<SiteReport> {
        let order: Vec<String> = self.policies.iter().map(|p| p.id().to_string()).collect();
        let mut pending: VecDeque<Arc<dyn SitePolicy>> = self.policies.into_iter().collect();
        let mut active = JoinSet::new();
        let mut reports = Vec::with_capacity(order.len());

        tracing::info!(
            sites = order.len(),
            max_active = self.max_active,
            "Starting crawl"
        );

        loop {
            while active.len() < self.max_active {
                let Some(policy) = pending.pop_front() else {
                    break;
                };
                active.spawn(run_site(
                    policy,
                    Arc::clone(&self.fetcher),
                    self.store.clone(),
                    self.mode.clone(),
                    self.settings,
                ));
            }

            match active.join_next().await {
                Some(Ok(report)) => {
                    log_outcome(&report);
                    reports.push(report);
                }
                // run_site never panics itself; the engine runs in its own task
                Some(Err(e)) => tracing::error!(error = %e, "Site supervisor task failed"),
                None => break,
            }
        }

        reports.sort_by_key(|report| {
            order
                .iter()
                .position(|id| *id == report.site)
                .unwrap_or(usize::MAX)
        });
        reports
    }
}

/// Runs one site's engine in its own task so a panic stays with that site
async fn run_site(
    policy: Arc<dyn SitePolicy>,
    fetcher: Arc<dyn Fetcher>,
    store: SnapshotStore,
    mode: LoadMode,
    settings: EngineSettings,
) -> SiteReport {
    let site = policy.id().to_string();

    let task = tokio::spawn(async move {
        let engine = CrawlEngine::open(policy, fetcher, store, &mode, settings)?;
        engine.run().await
    });

    let outcome = match task.await {
        Ok(outcome) => outcome,
        Err(e) => Err(CrawlError::TaskAborted {
            site: site.clone(),
            message: e.to_string(),
        }),
    };

    SiteReport { site, outcome }
}

fn log_outcome(report: &SiteReport) {
    match &report.outcome {
        Ok(crawl) => tracing::info!(
            site = %report.site,
            status = %crawl.status,
            articles = crawl.articles,
            "Site finished"
        ),
        Err(e) => tracing::error!(site = %report.site, error = %e, "Site failed"),
    }
}
