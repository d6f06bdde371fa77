use thiserror::Error;

/// Failures surfaced by the catalog clients and the migration pipeline.
///
/// Setup-phase variants (`AuthExpired`, `SourceFetch`, `PlaylistCreate`) are
/// fatal to a migration. `Search` and `AddItems` are per-track failures that the
/// pipeline turns into skips.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Session expired. Please login again.")]
    AuthExpired,

    #[error("{0}")]
    SourceFetch(String),

    #[error("Failed to create playlist: {0}")]
    PlaylistCreate(String),

    #[error("search failed: {0}")]
    Search(String),

    #[error("adding items failed: {0}")]
    AddItems(String),

    #[error("{0} not configured")]
    NotConfigured(&'static str),

    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MigrationError {
    /// Maps a 401 to a session failure, everything else to the supplied error.
    pub fn from_status(status: reqwest::StatusCode, otherwise: MigrationError) -> Self {
        if status == reqwest::StatusCode::UNAUTHORIZED {
            MigrationError::AuthExpired
        } else {
            otherwise
        }
    }
}
