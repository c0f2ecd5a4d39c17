//! Atomic per-site snapshot files
//!
//! Each site owns one file, `state_<site>.json`, inside the state directory.
//! Saves write `state_<site>.json.tmp` next to it, flush and fsync it, then
//! rename it over the canonical file, so the canonical file is always a
//! complete snapshot. A leftover temporary file from an interrupted save is
//! never read and is overwritten by the next save.

use crate::state::CrawlState;
use crate::storage::reconcile::reconcile;
use crate::storage::schema::{decode, Snapshot, SnapshotRef};
use crate::{StateError, StateResult};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use url::Url;

/// How an engine's initial state is obtained
#[derive(Debug, Clone, Default)]
pub enum LoadMode {
    /// Continue from the site's snapshot if there is one
    #[default]
    Resume,

    /// Ignore any snapshot and start from the root
    Fresh,

    /// Resume, replacing the articles with the reconciliation of a previous
    /// run's snapshot (held by `previous`) against the resumed ones
    Reconcile { previous: SnapshotStore },
}

/// Reads and writes site snapshots under one directory
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Canonical snapshot path for a site
    pub fn snapshot_path(&self, site: &str) -> PathBuf {
        self.dir.join(format!("state_{}.json", site))
    }

    fn temp_path(&self, site: &str) -> PathBuf {
        self.dir.join(format!("state_{}.json.tmp", site))
    }

    /// Reads a site's snapshot
    ///
    /// # Returns
    ///
    /// * `Ok(Some(Snapshot))` - The snapshot exists and parsed
    /// * `Ok(None)` - No snapshot has been written for this site
    /// * `Err(StateError)` - The file exists but could not be read or parsed
    pub fn read(&self, site: &str) -> StateResult<Option<Snapshot>> {
        let path = self.snapshot_path(site);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StateError::Read { path, source }),
        };

        let snapshot = decode(&path, &bytes)?;
        if snapshot.site != site {
            return Err(StateError::SiteMismatch {
                path,
                expected: site.to_string(),
                found: snapshot.site,
            });
        }
        Ok(Some(snapshot))
    }

    /// Loads a site's state, or a fresh one rooted at `root` if none exists
    ///
    /// An existing but unreadable snapshot is an error, never a silent reset.
    pub fn load(&self, site: &str, root: &Url) -> StateResult<CrawlState> {
        match self.read(site)? {
            Some(snapshot) => Ok(snapshot.into_state()),
            None => Ok(CrawlState::new(site, root)),
        }
    }

    /// Loads a site's state and reconciles its articles against `previous`
    pub fn load_reconciled(
        &self,
        site: &str,
        root: &Url,
        previous: &SnapshotStore,
    ) -> StateResult<CrawlState> {
        let mut state = self.load(site, root)?;
        let old = previous
            .read(site)?
            .map(|snapshot| snapshot.articles)
            .unwrap_or_default();

        let merged = reconcile(&old, state.articles());
        tracing::info!(
            site,
            previous = old.len(),
            current = state.article_count(),
            merged = merged.len(),
            "Reconciled articles against previous run"
        );
        state.replace_articles(merged);
        Ok(state)
    }

    /// Obtains a site's starting state according to `mode`
    pub fn load_with(&self, mode: &LoadMode, site: &str, root: &Url) -> StateResult<CrawlState> {
        match mode {
            LoadMode::Resume => self.load(site, root),
            LoadMode::Fresh => Ok(CrawlState::new(site, root)),
            LoadMode::Reconcile { previous } => self.load_reconciled(site, root, previous),
        }
    }

    /// Persists the full state, atomically replacing the site's snapshot
    pub fn save(&self, state: &CrawlState) -> StateResult<()> {
        let path = self.snapshot_path(state.site());
        let temp = self.temp_path(state.site());

        self.write_temp(&temp, state)
            .and_then(|()| fs::rename(&temp, &path))
            .map_err(|source| StateError::Persistence { path, source })
    }

    fn write_temp(&self, temp: &Path, state: &CrawlState) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;

        let mut writer = BufWriter::new(File::create(temp)?);
        serde_json::to_writer(&mut writer, &SnapshotRef::capture(state))?;
        writer.flush()?;

        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn root() -> Url {
        Url::parse("https://news.example.com/").unwrap()
    }

    fn sample_state() -> CrawlState {
        let mut state = CrawlState::new("example", &root());
        state.mark_visited("https://news.example.com/");
        state.push_frontier("https://news.example.com/a".to_string());
        state.push_frontier("https://news.example.com/b".to_string());
        state.record_article(
            "Is it?".to_string(),
            "Is it? - Example".to_string(),
            "https://news.example.com/2014/is-it".to_string(),
        );
        state
    }

    #[test]
    fn test_missing_snapshot_loads_fresh() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path());

        let state = store.load("example", &root()).unwrap();
        assert_eq!(state, CrawlState::new("example", &root()));
    }

    #[test]
    fn test_saved_state_reloads() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path());
        let state = sample_state();

        store.save(&state).unwrap();
        let loaded = store.load("example", &root()).unwrap();

        assert_eq!(loaded, state);
        assert!(!dir.path().join("state_example.json.tmp").exists());
    }

    #[test]
    fn test_save_creates_state_dir() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path().join("nested").join("state"));

        store.save(&sample_state()).unwrap();
        assert!(store.snapshot_path("example").exists());
    }

    #[test]
    fn test_corrupt_snapshot_is_fatal() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path());
        fs::write(store.snapshot_path("example"), b"{ not json").unwrap();

        let result = store.load("example", &root());
        assert!(matches!(result, Err(StateError::CorruptState { .. })));
    }

    #[test]
    fn test_snapshot_for_other_site_is_rejected() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path());
        store.save(&sample_state()).unwrap();
        fs::rename(
            store.snapshot_path("example"),
            store.snapshot_path("other"),
        )
        .unwrap();

        let result = store.load("other", &root());
        assert!(matches!(result, Err(StateError::SiteMismatch { .. })));
    }

    #[test]
    fn test_interrupted_save_leaves_previous_snapshot() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path());
        let state = sample_state();
        store.save(&state).unwrap();

        // A crash after the temp file was written but before the rename
        fs::write(
            dir.path().join("state_example.json.tmp"),
            b"{\"version\": 1, \"site\": \"exa",
        )
        .unwrap();

        let loaded = store.load("example", &root()).unwrap();
        assert_eq!(loaded, state);

        // The next save simply replaces the leftover
        let mut next = loaded.clone();
        next.push_frontier("https://news.example.com/c".to_string());
        store.save(&next).unwrap();
        assert_eq!(store.load("example", &root()).unwrap(), next);
    }

    #[test]
    fn test_unwritable_dir_is_persistence_error() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, b"file").unwrap();
        let store = SnapshotStore::new(&blocker);

        let result = store.save(&sample_state());
        assert!(matches!(result, Err(StateError::Persistence { .. })));
    }

    #[test]
    fn test_fresh_mode_ignores_snapshot() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path());
        store.save(&sample_state()).unwrap();

        let state = store.load_with(&LoadMode::Fresh, "example", &root()).unwrap();
        assert_eq!(state, CrawlState::new("example", &root()));
    }

    #[test]
    fn test_reconcile_mode_merges_previous_articles() {
        let previous_dir = TempDir::new().unwrap();
        let previous = SnapshotStore::new(previous_dir.path());
        let mut old = CrawlState::new("example", &root());
        old.record_article("Is it?".into(), "Is it? | Old".into(), "https://old/1".into());
        old.record_article("Stale".into(), "Stale".into(), "https://old/2".into());
        previous.save(&old).unwrap();

        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path());
        let current = sample_state();
        store.save(&current).unwrap();

        let mode = LoadMode::Reconcile { previous };
        let state = store.load_with(&mode, "example", &root()).unwrap();

        assert_eq!(state.article_count(), 1);
        assert_eq!(state.articles()["Is it?"][0].raw_title, "Is it? | Old");
        assert_eq!(state.visited(), current.visited());
        assert_eq!(state.frontier(), current.frontier());
    }

    #[test]
    fn test_reconcile_without_previous_snapshot_keeps_current() {
        let previous_dir = TempDir::new().unwrap();
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path());
        store.save(&sample_state()).unwrap();

        let state = store
            .load_reconciled("example", &root(), &SnapshotStore::new(previous_dir.path()))
            .unwrap();
        assert_eq!(state, sample_state());
    }
}
