//! Immutable catalog snapshots and their publication
//!
//! A [`Snapshot`] pairs the relationship graph with the token index built
//! from it. Refreshes build a whole new snapshot and swap it in through a
//! `watch` channel, so a query pins one `Arc<Snapshot>` for its lifetime and
//! never sees a half-built index.

use crate::catalog::{load_snapshot, CatalogSnapshot, MonsterGraph};
use crate::error::FindError;
use crate::index::{build_index, load_sheets, CuratorSheets, MonsterIndex};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

#[derive(Debug)]
pub struct Snapshot {
    pub graph: MonsterGraph,
    pub index: MonsterIndex,
}

impl Snapshot {
    /// Validate the catalog and build its index
    pub fn build(catalog: CatalogSnapshot, sheets: &CuratorSheets) -> Result<Self, FindError> {
        let graph = MonsterGraph::build(catalog)?;
        let index = build_index(&graph, sheets);
        Ok(Self { graph, index })
    }

    /// Load the catalog (and optional curator sheets) from JSON files
    pub fn load(catalog_path: &Path, sheets_path: Option<&Path>) -> Result<Self, FindError> {
        let catalog = load_snapshot(catalog_path)?;
        let sheets = match sheets_path {
            Some(path) => load_sheets(path)?,
            None => CuratorSheets::default(),
        };
        Self::build(catalog, &sheets)
    }
}

/// Write side of the snapshot channel
pub struct SnapshotPublisher {
    tx: watch::Sender<Option<Arc<Snapshot>>>,
}

/// Read side; cheap to clone, one per finder
#[derive(Clone)]
pub struct SnapshotReader {
    rx: watch::Receiver<Option<Arc<Snapshot>>>,
}

impl SnapshotPublisher {
    pub fn new() -> (Self, SnapshotReader) {
        let (tx, rx) = watch::channel(None);
        (Self { tx }, SnapshotReader { rx })
    }

    /// Replace the current snapshot. In-flight queries keep the one they pinned.
    pub fn publish(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let snapshot = Arc::new(snapshot);
        info!(
            "Publishing catalog snapshot with {} monsters",
            snapshot.graph.len()
        );
        self.tx.send_replace(Some(snapshot.clone()));
        snapshot
    }
}

impl SnapshotReader {
    /// A reader that already holds a snapshot and has no publisher
    pub fn fixed(snapshot: Arc<Snapshot>) -> Self {
        let (_tx, rx) = watch::channel(Some(snapshot));
        Self { rx }
    }

    /// The latest snapshot, if one was published
    pub fn current(&self) -> Option<Arc<Snapshot>> {
        self.rx.borrow().clone()
    }

    /// Wait until a snapshot exists and return it
    pub async fn ready(&self) -> Result<Arc<Snapshot>, FindError> {
        if let Some(snapshot) = self.current() {
            return Ok(snapshot);
        }
        let mut rx = self.rx.clone();
        let guard = rx
            .wait_for(Option::is_some)
            .await
            .map_err(|_| FindError::SnapshotUnavailable)?;
        guard.clone().ok_or(FindError::SnapshotUnavailable)
    }
}
