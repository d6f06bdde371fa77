use serde_json::json;
use spot2yt::migration::ProgressEvent;

#[test]
fn test_status_event_json() {
    assert_eq!(
        ProgressEvent::status("Fetching Spotify playlist...").to_json(),
        json!({ "status": "Fetching Spotify playlist..." })
    );
}

#[test]
fn test_fetched_event_json() {
    let event = ProgressEvent::Fetched {
        total: 3,
        playlist_name: "Road Trip".to_string(),
    };

    assert_eq!(
        event.to_json(),
        json!({ "status": "Playlist fetched", "total": 3, "playlist_name": "Road Trip" })
    );
}

#[test]
fn test_processing_event_json() {
    let event = ProgressEvent::Processing {
        current_track: "Highway Song".to_string(),
        artist: "The Drivers".to_string(),
        progress: 1,
        total: 3,
        added: 0,
        skipped: 0,
    };

    assert_eq!(
        event.to_json(),
        json!({
            "status": "processing",
            "current_track": "Highway Song",
            "artist": "The Drivers",
            "progress": 1,
            "total": 3,
            "added": 0,
            "skipped": 0,
        })
    );
}

#[test]
fn test_terminal_events() {
    let completed = ProgressEvent::Completed {
        added: 2,
        skipped: 1,
        playlist_id: "PLabc".to_string(),
    };
    let error = ProgressEvent::error("Session expired. Please login again.");

    assert!(completed.is_terminal());
    assert!(error.is_terminal());
    assert!(!ProgressEvent::status("Creating YouTube Music playlist...").is_terminal());

    assert_eq!(
        completed.to_json(),
        json!({ "status": "completed", "added": 2, "skipped": 1, "playlist_id": "PLabc" })
    );
    assert_eq!(
        serde_json::to_string(&error).unwrap(),
        r#"{"error":"Session expired. Please login again."}"#
    );
}
