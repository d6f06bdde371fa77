//! # Spotify Integration Module
//!
//! This module is the source-catalog side of a migration. It implements the
//! OAuth 2.0 PKCE login, paginated playlist reads, and the extra lookups the
//! analysis report needs.
//!
//! ## Architecture
//!
//! ```text
//! Migration pipeline / Analysis
//!          ↓
//! SpotifyClient (SourceCatalog)
//!     ├── Authentication (OAuth 2.0 PKCE, token refresh via TokenManager)
//!     ├── Playlist Operations (items pagination, name lookup)
//!     └── Analysis Lookups (audio features, artists)
//!          ↓
//! HTTP Layer (reqwest, JSON)
//!          ↓
//! Spotify Web API
//! ```
//!
//! ## Core Modules
//!
//! ### Authentication Module
//!
//! [`auth`] - Implements OAuth 2.0 PKCE (Proof Key for Code Exchange) flow:
//! - **Complete Auth Flow**: From the authorize URL to the stored token
//! - **PKCE Security**: No client secret is needed or stored
//! - **Token Refresh**: Exchanges refresh tokens for fresh access tokens
//!
//! ### Playlist Module
//!
//! [`playlist`] - [`SpotifyClient`], the migration source:
//! - **Pagination**: Follows `next` links until the playlist is exhausted
//! - **Session Handling**: Every call asks the token manager for a valid token
//! - **Retry Logic**: 502 Bad Gateway and 429 Too Many Requests are retried
//!
//! ### Analysis Module
//!
//! [`analysis`] - Audio features and artist genres for the mood report.
//!
//! ## API Coverage
//!
//! - `GET /playlists/{id}/tracks` - Playlist entries, 100 per page
//! - `GET /playlists/{id}?fields=name` - Playlist name
//! - `GET /audio-features?ids=` - Energy and valence per track
//! - `GET /artists?ids=` - Artist genres
//! - `POST /api/token` - Token exchange and refresh operations
//!
//! ## Error Types
//!
//! All functions return [`crate::error::MigrationError`]. A 401 from the API
//! or an unusable stored token is `AuthExpired`; everything else arrives as
//! `Http` and is wrapped by the pipeline as a source fetch failure.

pub mod analysis;
pub mod auth;
pub mod playlist;

pub use playlist::SpotifyClient;
