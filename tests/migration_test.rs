use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use spot2yt::error::MigrationError;
use spot2yt::migration::*;
use spot2yt::types::{
    PlaylistItem, PlaylistMeta, PlaylistPage, SearchHit, Session, Track, TrackArtist,
};
use tokio::sync::mpsc;

const PLAYLIST_URL: &str = "https://open.spotify.com/playlist/37i9dQZF1DXcBWIGoYBM5M";

// Helper function to create a playlist entry with one artist
fn entry(id: &str, name: &str, artist: &str) -> PlaylistItem {
    PlaylistItem {
        track: Some(Track {
            id: Some(id.to_string()),
            name: name.to_string(),
            artists: vec![TrackArtist {
                id: Some(format!("{}-artist", id)),
                name: artist.to_string(),
            }],
            duration_ms: 180_000,
            uri: format!("spotify:track:{}", id),
            is_local: false,
        }),
    }
}

fn hit(destination_id: &str) -> SearchHit {
    SearchHit {
        destination_id: destination_id.to_string(),
        display_title: destination_id.to_string(),
        artists: vec![],
        duration: Some("3:00".to_string()),
    }
}

struct FakeSource {
    name: String,
    pages: Vec<Vec<PlaylistItem>>,
    session_valid: bool,
    requested_cursors: Mutex<Vec<Option<String>>>,
}

impl FakeSource {
    fn new(name: &str, pages: Vec<Vec<PlaylistItem>>) -> Self {
        FakeSource {
            name: name.to_string(),
            pages,
            session_valid: true,
            requested_cursors: Mutex::new(Vec::new()),
        }
    }

    fn expired(mut self) -> Self {
        self.session_valid = false;
        self
    }
}

#[async_trait]
impl SourceCatalog for FakeSource {
    fn name(&self) -> &str {
        "Spotify"
    }

    async fn authenticate(&self) -> Result<Session, MigrationError> {
        if self.session_valid {
            Ok(Session {
                access_token: "token".to_string(),
            })
        } else {
            Err(MigrationError::AuthExpired)
        }
    }

    async fn fetch_playlist_page(
        &self,
        _session: &Session,
        _playlist_id: &str,
        cursor: Option<&str>,
    ) -> Result<PlaylistPage, MigrationError> {
        self.requested_cursors
            .lock()
            .unwrap()
            .push(cursor.map(str::to_string));

        let index: usize = cursor.map(|c| c.parse().unwrap()).unwrap_or(0);
        let items = self.pages.get(index).cloned().unwrap_or_default();
        let next = (index + 1 < self.pages.len()).then(|| (index + 1).to_string());
        Ok(PlaylistPage { items, next })
    }

    async fn fetch_playlist_meta(
        &self,
        _session: &Session,
        _playlist_id: &str,
    ) -> Result<PlaylistMeta, MigrationError> {
        Ok(PlaylistMeta {
            name: self.name.clone(),
        })
    }
}

#[derive(Default)]
struct FakeDestination {
    /// Title prefixes the search knows, with the id returned for them.
    known: Vec<(String, String)>,
    fail_create: bool,
    /// Title prefixes whose search fails with a transport error.
    fail_search: Vec<String>,
    /// Title prefixes whose search panics.
    panic_search: Vec<String>,
    fail_add: Vec<String>,
    /// Number of searches answered before the session expires.
    searches_before_expiry: Option<usize>,
    searches: Mutex<usize>,
    playlists: Mutex<Vec<(String, String, Vec<String>)>>,
}

impl FakeDestination {
    fn knowing(known: &[(&str, &str)]) -> Self {
        FakeDestination {
            known: known
                .iter()
                .map(|(t, id)| (t.to_string(), id.to_string()))
                .collect(),
            ..Default::default()
        }
    }

    fn playlists(&self) -> Vec<(String, String, Vec<String>)> {
        self.playlists.lock().unwrap().clone()
    }
}

#[async_trait]
impl DestinationCatalog for FakeDestination {
    fn name(&self) -> &str {
        "YouTube Music"
    }

    async fn create_playlist(
        &self,
        title: &str,
        description: &str,
    ) -> Result<String, MigrationError> {
        if self.fail_create {
            return Err(MigrationError::Search("quota exceeded".to_string()));
        }
        let mut playlists = self.playlists.lock().unwrap();
        let id = format!("PL{}", playlists.len() + 1);
        playlists.push((title.to_string(), description.to_string(), Vec::new()));
        Ok(id)
    }

    async fn search_songs(&self, query: &str) -> Result<Vec<SearchHit>, MigrationError> {
        if self.panic_search.iter().any(|t| query.starts_with(t.as_str())) {
            panic!("boom");
        }
        if self.fail_search.iter().any(|t| query.starts_with(t.as_str())) {
            return Err(MigrationError::Search("500 Internal Server Error".to_string()));
        }

        let mut searches = self.searches.lock().unwrap();
        if self
            .searches_before_expiry
            .is_some_and(|limit| *searches >= limit)
        {
            return Err(MigrationError::AuthExpired);
        }
        *searches += 1;

        Ok(self
            .known
            .iter()
            .filter(|(title, _)| query.starts_with(title.as_str()))
            .map(|(_, id)| hit(id))
            .collect())
    }

    async fn add_items(
        &self,
        playlist_id: &str,
        destination_ids: &[String],
    ) -> Result<(), MigrationError> {
        if destination_ids.iter().any(|id| self.fail_add.contains(id)) {
            return Err(MigrationError::AddItems("STATUS_FAILED".to_string()));
        }
        let index: usize = playlist_id.trim_start_matches("PL").parse().unwrap();
        let mut playlists = self.playlists.lock().unwrap();
        playlists[index - 1].2.extend(destination_ids.iter().cloned());
        Ok(())
    }
}

fn orchestrator(source: Arc<FakeSource>, destination: Arc<FakeDestination>) -> MigrationOrchestrator {
    MigrationOrchestrator::new(source, destination).with_track_delay(Duration::ZERO)
}

async fn collect(mut rx: mpsc::Receiver<ProgressEvent>) -> Vec<ProgressEvent> {
    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    events
}

async fn run_job(
    source: Arc<FakeSource>,
    destination: Arc<FakeDestination>,
) -> (MigrationJob, Vec<ProgressEvent>) {
    let (tx, rx) = mpsc::channel(1024);
    let sink = EventSink::new(tx);
    let job = orchestrator(source, destination)
        .run(PLAYLIST_URL, &sink)
        .await;
    drop(sink);
    (job, collect(rx).await)
}

fn without_status(events: Vec<ProgressEvent>) -> Vec<ProgressEvent> {
    events
        .into_iter()
        .filter(|e| !matches!(e, ProgressEvent::Status { .. }))
        .collect()
}

fn road_trip() -> Vec<PlaylistItem> {
    vec![
        entry("t1", "Highway Song", "The Drivers"),
        entry("t2", "Obscure B-Side", "Nobody Knows"),
        entry("t3", "Open Road", "Wheels"),
    ]
}

#[tokio::test]
async fn test_road_trip_event_sequence() {
    let source = Arc::new(FakeSource::new("Road Trip", vec![road_trip()]));
    let destination = Arc::new(FakeDestination::knowing(&[
        ("Highway Song", "vid1"),
        ("Open Road", "vid3"),
    ]));

    let events = collect(orchestrator(source, destination.clone()).spawn(PLAYLIST_URL.to_string())).await;

    let processing = |current_track: &str, artist: &str, progress, added, skipped| {
        ProgressEvent::Processing {
            current_track: current_track.to_string(),
            artist: artist.to_string(),
            progress,
            total: 3,
            added,
            skipped,
        }
    };

    assert_eq!(
        without_status(events),
        vec![
            ProgressEvent::Fetched {
                total: 3,
                playlist_name: "Road Trip".to_string(),
            },
            processing("Highway Song", "The Drivers", 1, 0, 0),
            processing("Obscure B-Side", "Nobody Knows", 2, 1, 0),
            processing("Open Road", "Wheels", 3, 1, 1),
            ProgressEvent::Completed {
                added: 2,
                skipped: 1,
                playlist_id: "PL1".to_string(),
            },
        ]
    );

    let playlists = destination.playlists();
    assert_eq!(playlists.len(), 1);
    assert_eq!(playlists[0].0, "Spotify – Road Trip");
    assert_eq!(playlists[0].1, PLAYLIST_DESCRIPTION);
    assert_eq!(playlists[0].2, vec!["vid1".to_string(), "vid3".to_string()]);
}

#[tokio::test]
async fn test_status_markers_precede_fetch_and_create() {
    let source = Arc::new(FakeSource::new("Road Trip", vec![road_trip()]));
    let destination = Arc::new(FakeDestination::default());

    let (_, events) = run_job(source, destination).await;

    assert_eq!(events[0], ProgressEvent::status("Fetching Spotify playlist..."));
    assert!(matches!(events[1], ProgressEvent::Fetched { total: 3, .. }));
    assert_eq!(events[2], ProgressEvent::status("Creating YouTube Music playlist..."));
    assert!(matches!(events[3], ProgressEvent::Processing { progress: 1, .. }));
}

#[tokio::test]
async fn test_counts_add_up_when_completed() {
    let source = Arc::new(FakeSource::new("Road Trip", vec![road_trip()]));
    let destination = Arc::new(FakeDestination {
        fail_add: vec!["vid3".to_string()],
        ..FakeDestination::knowing(&[("Highway Song", "vid1"), ("Open Road", "vid3")])
    });

    let (job, events) = run_job(source, destination).await;

    assert_eq!(job.state(), MigrationState::Completed);
    assert_eq!(job.added_count(), 1);
    assert_eq!(job.skipped_count(), 2);
    assert_eq!(job.added_count() + job.skipped_count(), job.total());
    assert_eq!(job.cursor(), job.total());
    assert_eq!(
        events.last(),
        Some(&ProgressEvent::Completed {
            added: 1,
            skipped: 2,
            playlist_id: "PL1".to_string(),
        })
    );
}

#[tokio::test]
async fn test_playlist_creation_failure_emits_single_error() {
    let source = Arc::new(FakeSource::new("Road Trip", vec![road_trip()]));
    let destination = Arc::new(FakeDestination {
        fail_create: true,
        ..FakeDestination::knowing(&[("Highway Song", "vid1")])
    });

    let (job, events) = run_job(source, destination.clone()).await;

    assert_eq!(job.state(), MigrationState::Errored);
    assert!(
        !events
            .iter()
            .any(|e| matches!(e, ProgressEvent::Processing { .. }))
    );
    let errors: Vec<&ProgressEvent> = events.iter().filter(|e| e.is_terminal()).collect();
    assert_eq!(errors.len(), 1);
    match errors[0] {
        ProgressEvent::Error { error } => assert!(error.starts_with("Failed to create playlist")),
        other => panic!("unexpected terminal event {:?}", other),
    }
    assert!(destination.playlists().is_empty());
}

#[tokio::test]
async fn test_empty_playlist_still_creates_destination() {
    let source = Arc::new(FakeSource::new(
        "Nothing Here",
        vec![vec![PlaylistItem { track: None }]],
    ));
    let destination = Arc::new(FakeDestination::default());

    let (job, events) = run_job(source, destination.clone()).await;

    assert_eq!(job.state(), MigrationState::Completed);
    assert_eq!(
        without_status(events),
        vec![
            ProgressEvent::Fetched {
                total: 0,
                playlist_name: "Nothing Here".to_string(),
            },
            ProgressEvent::Completed {
                added: 0,
                skipped: 0,
                playlist_id: "PL1".to_string(),
            },
        ]
    );
    assert_eq!(destination.playlists().len(), 1);
}

#[tokio::test]
async fn test_empty_search_result_is_a_skip() {
    let destination: Arc<FakeDestination> = Arc::new(FakeDestination::default());
    let resolver = TrackResolver::new(destination);

    let tracks = normalize_items(road_trip());
    for track in &tracks {
        let matched = resolver.resolve(track).await.unwrap();
        assert!(!matched.found);
        assert_eq!(matched.destination_id, None);
    }
}

#[tokio::test]
async fn test_failed_search_is_a_skip_and_batch_continues() {
    let source = Arc::new(FakeSource::new("Road Trip", vec![road_trip()]));
    let destination = Arc::new(FakeDestination {
        fail_search: vec!["Obscure B-Side".to_string()],
        ..FakeDestination::knowing(&[
            ("Highway Song", "vid1"),
            ("Obscure B-Side", "vid2"),
            ("Open Road", "vid3"),
        ])
    });

    let (job, events) = run_job(source, destination.clone()).await;

    assert_eq!(job.state(), MigrationState::Completed);
    assert!(matches!(
        events[events.len() - 2],
        ProgressEvent::Processing {
            progress: 3,
            added: 1,
            skipped: 1,
            ..
        }
    ));
    assert_eq!(
        events.last(),
        Some(&ProgressEvent::Completed {
            added: 2,
            skipped: 1,
            playlist_id: "PL1".to_string(),
        })
    );
    assert_eq!(
        destination.playlists()[0].2,
        vec!["vid1".to_string(), "vid3".to_string()]
    );
}

#[tokio::test]
async fn test_panic_while_processing_emits_single_error() {
    let source = Arc::new(FakeSource::new("Road Trip", vec![road_trip()]));
    let destination = Arc::new(FakeDestination {
        panic_search: vec!["Obscure B-Side".to_string()],
        ..FakeDestination::knowing(&[("Highway Song", "vid1"), ("Open Road", "vid3")])
    });

    let events = collect(orchestrator(source, destination.clone()).spawn(PLAYLIST_URL.to_string())).await;

    let terminal: Vec<&ProgressEvent> = events.iter().filter(|e| e.is_terminal()).collect();
    assert_eq!(terminal.len(), 1);
    match terminal[0] {
        ProgressEvent::Error { error } => {
            assert!(error.starts_with("Migration aborted"));
            assert!(error.contains("boom"));
        }
        other => panic!("unexpected terminal event {:?}", other),
    }
    assert_eq!(events.last(), Some(terminal[0]));
    assert!(
        !events
            .iter()
            .any(|e| matches!(e, ProgressEvent::Completed { .. }))
    );
    assert_eq!(destination.playlists()[0].2, vec!["vid1".to_string()]);
}

#[tokio::test]
async fn test_first_search_result_wins() {
    let destination = Arc::new(FakeDestination::knowing(&[
        ("Highway Song", "first"),
        ("Highway", "second"),
    ]));
    let resolver = TrackResolver::new(destination);

    let tracks = normalize_items(road_trip());
    let matched = resolver.resolve(&tracks[0]).await.unwrap();

    assert!(matched.found);
    assert_eq!(matched.destination_id.as_deref(), Some("first"));
    assert_eq!(build_query(&tracks[0]), "Highway Song The Drivers");
}

#[tokio::test]
async fn test_running_twice_creates_two_playlists() {
    let destination = Arc::new(FakeDestination::knowing(&[
        ("Highway Song", "vid1"),
        ("Open Road", "vid3"),
    ]));

    for _ in 0..2 {
        let source = Arc::new(FakeSource::new("Road Trip", vec![road_trip()]));
        let (job, _) = run_job(source, destination.clone()).await;
        assert_eq!(job.state(), MigrationState::Completed);
    }

    let playlists = destination.playlists();
    assert_eq!(playlists.len(), 2);
    assert_eq!(playlists[0].0, playlists[1].0);
    assert_eq!(playlists[0].2, playlists[1].2);
}

#[tokio::test]
async fn test_adding_same_track_twice_keeps_duplicates() {
    let destination = Arc::new(FakeDestination::default());
    let populator = PlaylistPopulator::new(destination.clone());

    let playlist_id = populator
        .create_playlist("Spotify – Road Trip", PLAYLIST_DESCRIPTION)
        .await
        .unwrap();
    assert!(populator.add_track(&playlist_id, "vid1").await.unwrap());
    assert!(populator.add_track(&playlist_id, "vid1").await.unwrap());

    assert_eq!(
        destination.playlists()[0].2,
        vec!["vid1".to_string(), "vid1".to_string()]
    );
}

#[tokio::test]
async fn test_expired_source_session_before_fetch() {
    let source = Arc::new(FakeSource::new("Road Trip", vec![road_trip()]).expired());
    let destination = Arc::new(FakeDestination::knowing(&[("Highway Song", "vid1")]));

    let events = collect(orchestrator(source, destination.clone()).spawn(PLAYLIST_URL.to_string())).await;

    assert_eq!(
        without_status(events),
        vec![ProgressEvent::error("Session expired. Please login again.")]
    );
    assert!(destination.playlists().is_empty());
}

#[tokio::test]
async fn test_invalid_playlist_reference() {
    let source = Arc::new(FakeSource::new("Road Trip", vec![road_trip()]));
    let destination = Arc::new(FakeDestination::default());

    let (tx, rx) = mpsc::channel(16);
    let sink = EventSink::new(tx);
    let job = orchestrator(source, destination.clone())
        .run("https://example.com/album/xyz", &sink)
        .await;
    drop(sink);
    let events = collect(rx).await;

    assert_eq!(job.state(), MigrationState::Errored);
    assert!(matches!(
        events.last(),
        Some(ProgressEvent::Error { error }) if error.starts_with("Invalid playlist reference")
    ));
    assert!(destination.playlists().is_empty());
}

#[tokio::test]
async fn test_pages_are_followed_in_order() {
    let source = Arc::new(FakeSource::new(
        "Long Drive",
        vec![
            vec![entry("a", "A", "Artist A"), entry("b", "B", "Artist B")],
            vec![entry("c", "C", "Artist C")],
            vec![entry("d", "D", "Artist D")],
        ],
    ));
    let destination = Arc::new(FakeDestination::default());

    let (job, _) = run_job(source.clone(), destination).await;

    let titles: Vec<&str> = job.tracks().iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["A", "B", "C", "D"]);
    assert_eq!(
        *source.requested_cursors.lock().unwrap(),
        vec![None, Some("1".to_string()), Some("2".to_string())]
    );
}

#[tokio::test]
async fn test_destination_session_expiring_mid_job() {
    let source = Arc::new(FakeSource::new("Road Trip", vec![road_trip()]));
    let destination = Arc::new(FakeDestination {
        searches_before_expiry: Some(1),
        ..FakeDestination::knowing(&[("Highway Song", "vid1"), ("Open Road", "vid3")])
    });

    let (job, events) = run_job(source, destination.clone()).await;

    assert_eq!(job.state(), MigrationState::Errored);
    assert_eq!(job.added_count(), 1);
    assert_eq!(job.cursor(), 1);
    assert_eq!(
        events.last(),
        Some(&ProgressEvent::error("Session expired. Please login again."))
    );
    assert!(
        !events
            .iter()
            .any(|e| matches!(e, ProgressEvent::Completed { .. }))
    );
    assert_eq!(destination.playlists()[0].2, vec!["vid1".to_string()]);
}

#[tokio::test]
async fn test_dropped_consumer_does_not_stop_migration() {
    let source = Arc::new(FakeSource::new("Road Trip", vec![road_trip()]));
    let destination = Arc::new(FakeDestination::knowing(&[
        ("Highway Song", "vid1"),
        ("Open Road", "vid3"),
    ]));

    let (tx, rx) = mpsc::channel(EVENT_BUFFER);
    drop(rx);
    let job = orchestrator(source, destination.clone())
        .run(PLAYLIST_URL, &EventSink::new(tx))
        .await;

    assert_eq!(job.state(), MigrationState::Completed);
    assert_eq!(destination.playlists()[0].2.len(), 2);
}
