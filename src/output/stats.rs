//! Statistics read back from site snapshots
//!
//! This module provides functionality for summarizing what each site's
//! snapshot holds without running a crawl.

use crate::sites::SitePolicy;
use crate::storage::SnapshotStore;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Counts taken from one site's snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteStatistics {
    /// Number of URLs already fetched
    pub visited: usize,

    /// Number of URLs waiting to be fetched
    pub frontier: usize,

    /// Number of distinct normalized article titles
    pub articles: usize,

    /// Titles ending with a question mark
    pub question_headlines: Vec<String>,

    /// When the snapshot was written
    pub saved_at: DateTime<Utc>,
}

/// What was found for one site
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotStatus {
    /// No snapshot has been written yet
    Missing,

    Loaded(SiteStatistics),

    /// A snapshot exists but cannot be used
    Unreadable(String),
}

/// Statistics for every requested site, in registry order
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    pub sites: Vec<(String, SnapshotStatus)>,
}

impl CrawlStatistics {
    /// Total distinct articles over every readable snapshot
    pub fn total_articles(&self) -> usize {
        self.loaded().map(|stats| stats.articles).sum()
    }

    /// Total question headlines over every readable snapshot
    pub fn total_questions(&self) -> usize {
        self.loaded().map(|stats| stats.question_headlines.len()).sum()
    }

    fn loaded(&self) -> impl Iterator<Item = &SiteStatistics> {
        self.sites.iter().filter_map(|(_, status)| match status {
            SnapshotStatus::Loaded(stats) => Some(stats),
            _ => None,
        })
    }
}

/// Loads statistics for each site from its snapshot
///
/// An unreadable snapshot is reported for that site and does not stop the rest.
pub fn load_statistics(store: &SnapshotStore, policies: &[Arc<dyn SitePolicy>]) -> CrawlStatistics {
    let sites = policies
        .iter()
        .map(|policy| {
            let status = match store.read(policy.id()) {
                Ok(None) => SnapshotStatus::Missing,
                Ok(Some(snapshot)) => SnapshotStatus::Loaded(SiteStatistics {
                    visited: snapshot.visited.len(),
                    frontier: snapshot.frontier.len(),
                    articles: snapshot.articles.len(),
                    question_headlines: crate::state::question_headlines(&snapshot.articles)
                        .map(str::to_string)
                        .collect(),
                    saved_at: snapshot.saved_at,
                }),
                Err(e) => SnapshotStatus::Unreadable(e.to_string()),
            };
            (policy.id().to_string(), status)
        })
        .collect();

    CrawlStatistics { sites }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    for (site, status) in &stats.sites {
        match status {
            SnapshotStatus::Missing => println!("{}: no snapshot", site),
            SnapshotStatus::Unreadable(reason) => println!("{}: unreadable ({})", site, reason),
            SnapshotStatus::Loaded(site_stats) => {
                let share = if site_stats.articles > 0 {
                    (site_stats.question_headlines.len() as f64 / site_stats.articles as f64)
                        * 100.0
                } else {
                    0.0
                };
                println!("{}:", site);
                println!("  Saved at: {}", site_stats.saved_at.to_rfc3339());
                println!("  Visited: {}", site_stats.visited);
                println!("  Frontier: {}", site_stats.frontier);
                println!(
                    "  Articles: {} ({} questions, {:.1}%)",
                    site_stats.articles,
                    site_stats.question_headlines.len(),
                    share
                );
            }
        }
    }

    println!();
    println!(
        "Total: {} articles, {} question headlines",
        stats.total_articles(),
        stats.total_questions()
    );
}
