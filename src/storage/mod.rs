//! Storage module for persisting crawl state
//!
//! This module handles everything that touches a site's snapshot file:
//! - The versioned JSON snapshot layout
//! - Atomic saves (write temporary file, fsync, rename)
//! - Loading with resume, fresh, or reconcile semantics
//! - Reconciling a previous run's articles with the current ones

mod reconcile;
mod schema;
mod snapshot;

pub use reconcile::reconcile;
pub use schema::{Snapshot, SNAPSHOT_VERSION};
pub use snapshot::{LoadMode, SnapshotStore};
