//! Betteridge-Crawl: headline discovery for a fixed set of news sites
//!
//! This crate explores each configured news site's link graph, classifies the
//! pages it visits as articles or not, and keeps a resumable per-site snapshot
//! of its progress on disk. Sites are crawled concurrently, each by its own
//! engine with its own state.

pub mod config;
pub mod crawler;
pub mod output;
pub mod sites;
pub mod state;
pub mod storage;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for crawl operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Site policy error: {0}")]
    Policy(#[from] PolicyError),

    #[error("State error: {0}")]
    State(#[from] StateError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Invalid engine transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::EngineStatus,
        to: state::EngineStatus,
    },

    #[error("Crawl task for {site} did not finish: {message}")]
    TaskAborted { site: String, message: String },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Errors raised while building site policies, before any crawling starts
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("Unknown site '{0}'")]
    UnknownSite(String),

    #[error("Site '{0}' is configured more than once")]
    DuplicateSite(String),

    #[error("Invalid article pattern for {site}: {source}")]
    InvalidPattern { site: String, source: regex::Error },

    #[error("Invalid root URL for {site}: {source}")]
    InvalidRoot {
        site: String,
        source: ::url::ParseError,
    },
}

/// Errors from loading or saving a site's crawl snapshot
#[derive(Debug, Error)]
pub enum StateError {
    #[error("Snapshot {path} exists but cannot be parsed: {reason}")]
    CorruptState { path: PathBuf, reason: String },

    #[error("Snapshot {path} has unsupported version {version}")]
    UnsupportedVersion { path: PathBuf, version: u64 },

    #[error("Snapshot {path} belongs to site '{found}', expected '{expected}'")]
    SiteMismatch {
        path: PathBuf,
        expected: String,
        found: String,
    },

    #[error("Failed to read snapshot {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to persist snapshot {path}: {source}")]
    Persistence {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Result type alias for crawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for snapshot operations
pub type StateResult<T> = std::result::Result<T, StateError>;

// Re-export commonly used types
pub use config::Config;
pub use sites::{SitePolicy, SiteRegistry};
pub use state::{CrawlState, EngineStatus};
pub use storage::{LoadMode, SnapshotStore};
