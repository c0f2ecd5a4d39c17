//! Configuration module for Betteridge-Crawl
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! The configuration is read once at startup and passed by value from there on.
//!
//! # Example
//!
//! ```no_run
//! use betteridge_crawl::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawl.toml")).unwrap();
//! println!("Article target per site: {}", config.crawler.article_target);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, OutputConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
