use std::{sync::Arc, time::Duration};

use tokio::{sync::mpsc, time::sleep};

use crate::{
    config,
    error::MigrationError,
    migration::{
        DestinationCatalog, EventSink, PlaylistPopulator, ProgressEvent, SourceCatalog,
        SourcePlaylistReader, TrackResolver,
    },
    types::CatalogTrack,
};

/// Capacity of the channel between the migration worker and its consumer.
pub const EVENT_BUFFER: usize = 64;

pub const PLAYLIST_DESCRIPTION: &str = "Converted from Spotify with spot2yt";

/// Where a migration currently stands.
///
/// `Errored` is reachable from `Fetching`, `PlaylistCreated` and `Processing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationState {
    Fetching,
    PlaylistCreated,
    Processing(usize),
    Completed,
    Errored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TrackOutcome {
    Added,
    Skipped,
}

/// In-memory bookkeeping for one migration run. Nothing here is persisted.
///
/// `added + skipped == cursor <= tracks.len()` holds between any two steps.
#[derive(Debug, Clone)]
pub struct MigrationJob {
    source_playlist_ref: String,
    playlist_name: String,
    destination_playlist_id: Option<String>,
    tracks: Vec<CatalogTrack>,
    added_count: usize,
    skipped_count: usize,
    cursor: usize,
    state: MigrationState,
}

impl MigrationJob {
    fn new(source_playlist_ref: &str) -> Self {
        MigrationJob {
            source_playlist_ref: source_playlist_ref.to_string(),
            playlist_name: String::new(),
            destination_playlist_id: None,
            tracks: Vec::new(),
            added_count: 0,
            skipped_count: 0,
            cursor: 0,
            state: MigrationState::Fetching,
        }
    }

    fn record(&mut self, outcome: TrackOutcome) {
        match outcome {
            TrackOutcome::Added => self.added_count += 1,
            TrackOutcome::Skipped => self.skipped_count += 1,
        }
        self.cursor += 1;
        debug_assert_eq!(self.added_count + self.skipped_count, self.cursor);
        debug_assert!(self.cursor <= self.tracks.len());
    }

    pub fn source_playlist_ref(&self) -> &str {
        &self.source_playlist_ref
    }

    pub fn playlist_name(&self) -> &str {
        &self.playlist_name
    }

    pub fn destination_playlist_id(&self) -> Option<&str> {
        self.destination_playlist_id.as_deref()
    }

    pub fn tracks(&self) -> &[CatalogTrack] {
        &self.tracks
    }

    pub fn total(&self) -> usize {
        self.tracks.len()
    }

    pub fn added_count(&self) -> usize {
        self.added_count
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped_count
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn state(&self) -> MigrationState {
        self.state
    }
}

/// Drives one playlist migration from source fetch to completion summary.
///
/// Tracks are handled strictly one after another in source order, with a fixed
/// pause after each one to stay polite with the destination API.
pub struct MigrationOrchestrator {
    reader: SourcePlaylistReader,
    resolver: TrackResolver,
    populator: PlaylistPopulator,
    track_delay: Duration,
}

impl MigrationOrchestrator {
    pub fn new(source: Arc<dyn SourceCatalog>, destination: Arc<dyn DestinationCatalog>) -> Self {
        MigrationOrchestrator {
            reader: SourcePlaylistReader::new(source),
            resolver: TrackResolver::new(Arc::clone(&destination)),
            populator: PlaylistPopulator::new(destination),
            track_delay: config::track_delay(),
        }
    }

    pub fn with_track_delay(mut self, track_delay: Duration) -> Self {
        self.track_delay = track_delay;
        self
    }

    pub fn playlist_title(&self, playlist_name: &str) -> String {
        format!("{} – {}", self.reader.source_name(), playlist_name)
    }

    /// Runs the migration on a background task and returns the receiving end
    /// of its event stream.
    ///
    /// The stream always ends with exactly one `completed` or `error` event.
    /// Dropping the receiver does not stop the migration.
    pub fn spawn(self, playlist_ref: String) -> mpsc::Receiver<ProgressEvent> {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let sink = EventSink::new(tx);

        tokio::spawn(async move {
            let worker_sink = sink.clone();
            let worker =
                tokio::spawn(async move { self.run(&playlist_ref, &worker_sink).await });

            if let Err(e) = worker.await {
                sink.emit(ProgressEvent::error(format!("Migration aborted: {}", e)))
                    .await;
            }
        });

        rx
    }

    /// Runs the migration to its end, emitting every event into `sink`, and
    /// returns the final job state.
    pub async fn run(&self, playlist_ref: &str, sink: &EventSink) -> MigrationJob {
        let mut job = MigrationJob::new(playlist_ref);

        if let Err(e) = self.drive(&mut job, sink).await {
            job.state = MigrationState::Errored;
            sink.emit(ProgressEvent::error(e.to_string())).await;
        }

        job
    }

    async fn drive(&self, job: &mut MigrationJob, sink: &EventSink) -> Result<(), MigrationError> {
        loop {
            let state = job.state;
            job.state = match state {
                MigrationState::Fetching => {
                    sink.emit(ProgressEvent::status(format!(
                        "Fetching {} playlist...",
                        self.reader.source_name()
                    )))
                    .await;

                    let (name, tracks) = self.reader.read(&job.source_playlist_ref).await?;
                    job.playlist_name = name;
                    job.tracks = tracks;

                    sink.emit(ProgressEvent::Fetched {
                        total: job.total(),
                        playlist_name: job.playlist_name.clone(),
                    })
                    .await;

                    MigrationState::PlaylistCreated
                }
                MigrationState::PlaylistCreated => {
                    sink.emit(ProgressEvent::status(format!(
                        "Creating {} playlist...",
                        self.populator.destination_name()
                    )))
                    .await;

                    let title = self.playlist_title(&job.playlist_name);
                    let playlist_id = self
                        .populator
                        .create_playlist(&title, PLAYLIST_DESCRIPTION)
                        .await?;
                    job.destination_playlist_id = Some(playlist_id);

                    MigrationState::Processing(0)
                }
                MigrationState::Processing(index) if index < job.total() => {
                    self.process_track(job, index, sink).await?;
                    MigrationState::Processing(index + 1)
                }
                MigrationState::Processing(_) => MigrationState::Completed,
                MigrationState::Completed => {
                    sink.emit(ProgressEvent::Completed {
                        added: job.added_count,
                        skipped: job.skipped_count,
                        playlist_id: job.destination_playlist_id.clone().unwrap_or_default(),
                    })
                    .await;
                    return Ok(());
                }
                MigrationState::Errored => return Ok(()),
            };
        }
    }

    async fn process_track(
        &self,
        job: &mut MigrationJob,
        index: usize,
        sink: &EventSink,
    ) -> Result<(), MigrationError> {
        let track = job.tracks[index].clone();

        sink.emit(ProgressEvent::Processing {
            current_track: track.title.clone(),
            artist: track.primary_artist.clone(),
            progress: index + 1,
            total: job.total(),
            added: job.added_count,
            skipped: job.skipped_count,
        })
        .await;

        let matched = self.resolver.resolve(&track).await?;

        let outcome = match (matched.found, matched.destination_id, &job.destination_playlist_id) {
            (true, Some(destination_id), Some(playlist_id)) => {
                if self.populator.add_track(playlist_id, &destination_id).await? {
                    TrackOutcome::Added
                } else {
                    TrackOutcome::Skipped
                }
            }
            _ => TrackOutcome::Skipped,
        };
        job.record(outcome);

        if !self.track_delay.is_zero() {
            sleep(self.track_delay).await;
        }

        Ok(())
    }
}
