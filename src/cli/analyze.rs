use std::sync::Arc;

use tabled::Table;

use crate::{
    analysis::analyze_playlist,
    cli::spinner,
    error,
    info,
    management::{FileTokenStore, TokenManager},
    spotify::SpotifyClient,
    types::GenreTableRow,
};

pub async fn analyze(playlist: String) {
    let client = SpotifyClient::new(TokenManager::new(Arc::new(
        FileTokenStore::default_location(),
    )));

    let pb = spinner("Analyzing playlist...");
    let result = analyze_playlist(&client, &playlist).await;
    pb.finish_and_clear();

    let report = match result {
        Ok(r) => r,
        Err(e) => error!("Analysis failed. Err: {}", e),
    };

    info!("Mood: {}", report.mood_label);
    info!(
        "Energy {:.2} / Valence {:.2} over {} tracks",
        report.avg_energy, report.avg_valence, report.track_count
    );

    if report.genres.is_empty() {
        info!("No genres available.");
        return;
    }

    let mut rows: Vec<GenreTableRow> = report
        .genres
        .into_iter()
        .map(|(genre, artists)| GenreTableRow { genre, artists })
        .collect();
    rows.sort_by(|a, b| b.artists.cmp(&a.artists));

    println!("{}", Table::new(rows));
}
