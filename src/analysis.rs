//! Mood and genre summary of a playlist.
//!
//! The report is built from at most the first 50 tracks. Energy and valence
//! come from the catalog's audio features; when those are unavailable every
//! track counts as neutral (0.5/0.5). Genres are aggregated over at most 20
//! distinct artists and only the five most frequent are kept.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::{
    error::MigrationError,
    migration::SourceCatalog,
    spotify::SpotifyClient,
    types::{Artist, AudioFeatures, Track},
    utils, warning,
};

pub const MAX_ANALYZED_TRACKS: u32 = 50;
pub const MAX_GENRE_ARTISTS: usize = 20;
pub const TOP_GENRES: usize = 5;
pub const NEUTRAL: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub mood_label: String,
    pub avg_energy: f64,
    pub avg_valence: f64,
    pub energy_curve: Vec<f64>,
    pub valence_curve: Vec<f64>,
    pub genres: BTreeMap<String, usize>,
    pub track_count: usize,
}

/// Energy/valence figures derived from audio features.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSummary {
    pub avg_energy: f64,
    pub avg_valence: f64,
    pub energy_curve: Vec<f64>,
    pub valence_curve: Vec<f64>,
    pub track_count: usize,
}

/// Builds the curves and averages for `track_total` tracks.
///
/// `features` holds one entry per track the catalog answered for, `None` where
/// it had nothing. If nothing usable came back at all, the whole playlist is
/// reported as neutral.
pub fn summarize_features(features: &[Option<AudioFeatures>], track_total: usize) -> FeatureSummary {
    if features.iter().all(Option::is_none) {
        return FeatureSummary {
            avg_energy: NEUTRAL,
            avg_valence: NEUTRAL,
            energy_curve: vec![NEUTRAL; track_total],
            valence_curve: vec![NEUTRAL; track_total],
            track_count: track_total,
        };
    }

    let mut total_energy = 0.0;
    let mut total_valence = 0.0;
    let mut valid = 0usize;
    let mut energy_curve = Vec::with_capacity(features.len());
    let mut valence_curve = Vec::with_capacity(features.len());

    for feature in features {
        match feature {
            Some(f) => {
                total_energy += f.energy;
                total_valence += f.valence;
                energy_curve.push(utils::round2(f.energy));
                valence_curve.push(utils::round2(f.valence));
                valid += 1;
            }
            None => {
                energy_curve.push(NEUTRAL);
                valence_curve.push(NEUTRAL);
            }
        }
    }

    // valid > 0: the all-None case returned above
    FeatureSummary {
        avg_energy: total_energy / valid as f64,
        avg_valence: total_valence / valid as f64,
        energy_curve,
        valence_curve,
        track_count: valid,
    }
}

pub fn mood_label(avg_energy: f64, avg_valence: f64) -> &'static str {
    if avg_energy > 0.65 {
        if avg_valence > 0.6 {
            "Exuberant / Pumped"
        } else {
            "Intense / Aggressive"
        }
    } else if avg_energy < 0.35 {
        if avg_valence > 0.6 {
            "Peaceful / Calm"
        } else {
            "Melancholic / Sad"
        }
    } else if avg_valence > 0.6 {
        "Happy / Chill"
    } else if avg_valence < 0.4 {
        "Moody / Dark"
    } else {
        "Balanced / Focused"
    }
}

/// Counts genres over `artists` and keeps the `TOP_GENRES` most frequent.
/// Ties keep the order in which genres were first seen.
pub fn top_genres(artists: &[Artist]) -> Vec<(String, usize)> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();

    for genre in artists.iter().flat_map(|a| a.genres.iter()) {
        let count = counts.entry(genre.clone()).or_insert_with(|| {
            order.push(genre.clone());
            0
        });
        *count += 1;
    }

    let mut ranked: Vec<(String, usize)> = order
        .into_iter()
        .map(|genre| {
            let count = counts.get(&genre).copied().unwrap_or_default();
            (genre, count)
        })
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(TOP_GENRES);
    ranked
}

/// Track ids and distinct artist ids (first-seen order) of the analyzable
/// tracks.
pub fn collect_ids(tracks: &[Track]) -> (Vec<String>, Vec<String>) {
    let mut track_ids = Vec::new();
    let mut artist_ids = Vec::new();
    let mut seen = HashSet::new();

    for track in tracks {
        let Some(id) = &track.id else { continue };
        track_ids.push(id.clone());
        for artist_id in track.artists.iter().filter_map(|a| a.id.as_ref()) {
            if seen.insert(artist_id.clone()) {
                artist_ids.push(artist_id.clone());
            }
        }
    }

    (track_ids, artist_ids)
}

pub fn build_report(summary: FeatureSummary, genres: Vec<(String, usize)>) -> AnalysisReport {
    AnalysisReport {
        mood_label: mood_label(summary.avg_energy, summary.avg_valence).to_string(),
        avg_energy: utils::round2(summary.avg_energy),
        avg_valence: utils::round2(summary.avg_valence),
        energy_curve: summary.energy_curve,
        valence_curve: summary.valence_curve,
        genres: genres.into_iter().collect(),
        track_count: summary.track_count,
    }
}

/// Fetches what the report needs from Spotify and builds it.
///
/// A failed audio-feature request is not an error: the report falls back to
/// neutral values.
pub async fn analyze_playlist(
    client: &SpotifyClient,
    playlist_ref: &str,
) -> Result<AnalysisReport, MigrationError> {
    let playlist_id = utils::parse_playlist_id(playlist_ref).ok_or_else(|| {
        MigrationError::SourceFetch(format!("Invalid playlist reference: {}", playlist_ref))
    })?;

    let session = client.authenticate().await?;
    let tracks = client
        .first_tracks(&session, &playlist_id, MAX_ANALYZED_TRACKS)
        .await?;

    let (track_ids, artist_ids) = collect_ids(&tracks);
    if track_ids.is_empty() {
        return Err(MigrationError::SourceFetch(
            "Playlist has no analyzable tracks".to_string(),
        ));
    }

    let features = match client.audio_features(&session, &track_ids).await {
        Ok(features) => features,
        Err(e) => {
            warning!("Audio features fetch failed (likely restricted): {}", e);
            Vec::new()
        }
    };
    let summary = summarize_features(&features, track_ids.len());

    let genre_artist_ids: Vec<String> = artist_ids.into_iter().take(MAX_GENRE_ARTISTS).collect();
    let genres = if genre_artist_ids.is_empty() {
        Vec::new()
    } else {
        top_genres(&client.artists(&session, &genre_artist_ids).await?)
    };

    Ok(build_report(summary, genres))
}
