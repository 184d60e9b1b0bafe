//! Append-only log of modifier-looking tokens that matched no known modifier
//!
//! Queries only push into an unbounded channel; a single writer task owns the
//! seen-set and the optional log file. Duplicates are dropped by the writer.

use std::collections::BTreeSet;
use std::path::PathBuf;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct TypoLog {
    tx: mpsc::UnboundedSender<String>,
}

pub struct TypoLogWriter {
    rx: mpsc::UnboundedReceiver<String>,
    seen: BTreeSet<String>,
    path: Option<PathBuf>,
}

/// Create a log handle and the writer that drains it
pub fn typo_log(path: Option<PathBuf>) -> (TypoLog, TypoLogWriter) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        TypoLog { tx },
        TypoLogWriter {
            rx,
            seen: BTreeSet::new(),
            path,
        },
    )
}

impl TypoLog {
    /// Best effort; a closed writer just drops the entry
    pub fn record(&self, token: &str) {
        if self.tx.send(token.to_string()).is_err() {
            debug!("Typo log writer gone, dropping '{}'", token);
        }
    }
}

impl TypoLogWriter {
    /// Drain until every `TypoLog` handle is dropped; returns the distinct typos seen
    pub async fn run(mut self) -> BTreeSet<String> {
        while let Some(token) = self.rx.recv().await {
            if !self.seen.insert(token.clone()) {
                continue;
            }
            if let Some(path) = &self.path {
                if let Err(e) = append_line(path, &token).await {
                    warn!("Failed to append typo to {}: {}", path.display(), e);
                }
            }
        }
        self.seen
    }
}

async fn append_line(path: &PathBuf, line: &str) -> std::io::Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(format!("{}\n", line).as_bytes()).await?;
    file.flush().await
}
