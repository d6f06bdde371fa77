use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};

pub fn generate_code_verifier() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(128)
        .map(char::from)
        .collect()
}

pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Extracts a Spotify playlist id from a share URL, a `spotify:playlist:` URI
/// or a bare id.
///
/// Returns `None` for anything that does not look like one of those.
pub fn parse_playlist_id(playlist_ref: &str) -> Option<String> {
    let trimmed = playlist_ref.trim();

    let candidate = if let Some(rest) = trimmed.strip_prefix("spotify:playlist:") {
        rest
    } else if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        let without_query = trimmed.split(['?', '#']).next().unwrap_or_default();
        let mut segments = without_query.trim_end_matches('/').rsplit('/');
        let id = segments.next()?;
        if segments.next()? != "playlist" {
            return None;
        }
        id
    } else {
        trimmed
    };

    if !candidate.is_empty() && candidate.chars().all(|c| c.is_ascii_alphanumeric()) {
        Some(candidate.to_string())
    } else {
        None
    }
}

/// Rounds to two decimals, the precision analysis figures are reported with.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
