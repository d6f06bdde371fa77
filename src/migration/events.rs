use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use serde::{Serialize, Serializer};
use serde_json::{Value, json};
use tokio::sync::mpsc;

use crate::warning;

/// One unit of the ordered status stream delivered while a migration runs.
///
/// Each event renders as a self-contained JSON object. `Completed` and `Error`
/// end the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Status {
        status: String,
    },
    Fetched {
        total: usize,
        playlist_name: String,
    },
    Processing {
        current_track: String,
        artist: String,
        progress: usize,
        total: usize,
        added: usize,
        skipped: usize,
    },
    Completed {
        added: usize,
        skipped: usize,
        playlist_id: String,
    },
    Error {
        error: String,
    },
}

impl ProgressEvent {
    pub fn status(status: impl Into<String>) -> Self {
        ProgressEvent::Status {
            status: status.into(),
        }
    }

    pub fn error(error: impl Into<String>) -> Self {
        ProgressEvent::Error {
            error: error.into(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ProgressEvent::Completed { .. } | ProgressEvent::Error { .. }
        )
    }

    pub fn to_json(&self) -> Value {
        match self {
            ProgressEvent::Status { status } => json!({ "status": status }),
            ProgressEvent::Fetched {
                total,
                playlist_name,
            } => json!({
                "status": "Playlist fetched",
                "total": total,
                "playlist_name": playlist_name,
            }),
            ProgressEvent::Processing {
                current_track,
                artist,
                progress,
                total,
                added,
                skipped,
            } => json!({
                "status": "processing",
                "current_track": current_track,
                "artist": artist,
                "progress": progress,
                "total": total,
                "added": added,
                "skipped": skipped,
            }),
            ProgressEvent::Completed {
                added,
                skipped,
                playlist_id,
            } => json!({
                "status": "completed",
                "added": added,
                "skipped": skipped,
                "playlist_id": playlist_id,
            }),
            ProgressEvent::Error { error } => json!({ "error": error }),
        }
    }
}

impl Serialize for ProgressEvent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// Producer side of a migration's event stream.
///
/// Emitting waits while the channel is full. If the consumer has gone away the
/// event is dropped and the migration keeps running; the disconnect is logged
/// once.
#[derive(Clone)]
pub struct EventSink {
    tx: mpsc::Sender<ProgressEvent>,
    detached: Arc<AtomicBool>,
}

impl EventSink {
    pub fn new(tx: mpsc::Sender<ProgressEvent>) -> Self {
        EventSink {
            tx,
            detached: Arc::new(AtomicBool::new(false)),
        }
    }

    pub async fn emit(&self, event: ProgressEvent) {
        if self.tx.send(event).await.is_err() && !self.detached.swap(true, Ordering::SeqCst) {
            warning!("Progress consumer disconnected, migration continues in the background");
        }
    }
}
