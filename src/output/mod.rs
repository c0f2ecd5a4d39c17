//! Output module for reporting crawl results
//!
//! This module handles:
//! - Summarizing saved site snapshots
//! - Printing per-site statistics

pub mod stats;

pub use stats::{load_statistics, print_statistics, CrawlStatistics, SiteStatistics, SnapshotStatus};
