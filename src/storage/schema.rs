//! Snapshot file format and versioning
//!
//! A snapshot is one JSON document per site:
//!
//! ```text
//! {
//!   "version": 1,
//!   "site": "nytimes",
//!   "saved_at": "2014-03-02T12:00:00Z",
//!   "visited": ["https://..."],
//!   "frontier": ["https://..."],
//!   "articles": { "Normalized title": [{ "raw_title": "...", "url": "..." }] }
//! }
//! ```
//!
//! Downstream tooling reads `site` and `articles` directly, so the shape of
//! those two fields is fixed. Any change to the layout bumps the version.

use crate::state::{ArticleMap, CrawlState};
use crate::{StateError, StateResult};
use chrono::{DateTime, Utc};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::Path;

/// Current snapshot layout version
pub const SNAPSHOT_VERSION: u64 = 1;

/// A snapshot as read back from disk
#[derive(Debug, Clone, Deserialize)]
pub struct Snapshot {
    pub version: u64,
    pub site: String,
    pub saved_at: DateTime<Utc>,
    pub visited: BTreeSet<String>,
    pub frontier: IndexSet<String>,
    pub articles: ArticleMap,
}

impl Snapshot {
    pub fn into_state(self) -> CrawlState {
        CrawlState::from_parts(self.site, self.visited, self.frontier, self.articles)
    }
}

/// Borrowed view of a state, serialized without cloning it
#[derive(Serialize)]
pub(crate) struct SnapshotRef<'a> {
    version: u64,
    site: &'a str,
    saved_at: DateTime<Utc>,
    visited: &'a BTreeSet<String>,
    frontier: &'a IndexSet<String>,
    articles: &'a ArticleMap,
}

impl<'a> SnapshotRef<'a> {
    pub(crate) fn capture(state: &'a CrawlState) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            site: state.site(),
            saved_at: Utc::now(),
            visited: state.visited(),
            frontier: state.frontier(),
            articles: state.articles(),
        }
    }
}

/// Parses snapshot bytes, checking the version tag before the layout
pub(crate) fn decode(path: &Path, bytes: &[u8]) -> StateResult<Snapshot> {
    let corrupt = |reason: String| StateError::CorruptState {
        path: path.to_path_buf(),
        reason,
    };

    let value: Value = serde_json::from_slice(bytes).map_err(|e| corrupt(e.to_string()))?;

    let version = value
        .get("version")
        .and_then(Value::as_u64)
        .ok_or_else(|| corrupt("missing version tag".to_string()))?;

    if version != SNAPSHOT_VERSION {
        return Err(StateError::UnsupportedVersion {
            path: path.to_path_buf(),
            version,
        });
    }

    serde_json::from_value(value).map_err(|e| corrupt(e.to_string()))
}
