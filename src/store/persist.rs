//! Background document writer.
//!
//! Mutations hand a serialized snapshot to [`Persister::write`] and return
//! immediately. A single task drains the queue, so snapshots land on disk in
//! the order they were taken. Bursts coalesce: only the newest queued snapshot
//! is written.

use std::path::{Path, PathBuf};

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::observability::metrics;

enum PersistCommand {
    Write(String),
    Flush(oneshot::Sender<()>),
}

/// Handle to the writer task. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Persister {
    tx: mpsc::UnboundedSender<PersistCommand>,
}

impl std::fmt::Debug for PersistCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PersistCommand::Write(snapshot) => write!(f, "Write({} bytes)", snapshot.len()),
            PersistCommand::Flush(_) => write!(f, "Flush"),
        }
    }
}

impl Persister {
    /// Spawn the writer task on the current Tokio runtime.
    pub fn spawn(path: PathBuf) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run(path, rx));
        Self { tx }
    }

    /// Queue a snapshot for writing. Never blocks, never fails the caller.
    pub fn write(&self, snapshot: String) {
        if self.tx.send(PersistCommand::Write(snapshot)).is_err() {
            warn!("Persistence writer stopped; snapshot dropped");
        }
    }

    /// Wait until every snapshot queued before this call has been written.
    pub async fn flush(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send(PersistCommand::Flush(ack_tx)).is_ok() {
            let _ = ack_rx.await;
        }
    }
}

async fn run(path: PathBuf, mut rx: mpsc::UnboundedReceiver<PersistCommand>) {
    debug!(path = %path.display(), "Persistence writer started");

    while let Some(command) = rx.recv().await {
        let mut latest = None;
        let mut acks = Vec::new();

        match command {
            PersistCommand::Write(snapshot) => latest = Some(snapshot),
            PersistCommand::Flush(ack) => acks.push(ack),
        }
        while let Ok(next) = rx.try_recv() {
            match next {
                PersistCommand::Write(snapshot) => latest = Some(snapshot),
                PersistCommand::Flush(ack) => acks.push(ack),
            }
        }

        if let Some(snapshot) = latest {
            match write_document(&path, &snapshot).await {
                Ok(()) => {
                    metrics::record_persist(true, snapshot.len());
                    debug!(path = %path.display(), bytes = snapshot.len(), "Document persisted");
                }
                Err(e) => {
                    metrics::record_persist(false, snapshot.len());
                    warn!(path = %path.display(), error = %e, "Failed to persist document");
                }
            }
        }

        for ack in acks {
            let _ = ack.send(());
        }
    }

    debug!(path = %path.display(), "Persistence writer stopped");
}

/// Write to a sibling temp file, then rename over the target.
async fn write_document(path: &Path, contents: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    tokio::fs::write(&tmp, contents).await?;
    tokio::fs::rename(&tmp, path).await
}
