//! # Migration Pipeline
//!
//! Moves one playlist from the source catalog to the destination catalog:
//!
//! ```text
//! MigrationOrchestrator
//!     ├── SourcePlaylistReader   (paginate, filter, normalize)
//!     ├── PlaylistPopulator      (create playlist)
//!     └── per track, in order:
//!           TrackResolver        (search, first result wins)
//!           PlaylistPopulator    (add, failure = skip)
//!           ProgressEvent        (pushed to the consumer)
//! ```
//!
//! Setup failures (session, fetch, playlist creation) end the run with a
//! single `error` event, and so does a destination session expiring mid-run.
//! Any other per-track failure is logged and counted as a skip.
//!
//! The pipeline only sees the [`SourceCatalog`] and [`DestinationCatalog`]
//! traits, so the Spotify and YouTube Music clients can be swapped for
//! in-memory fakes.

mod catalog;
mod events;
mod orchestrator;
mod populator;
mod reader;
mod resolver;

pub use catalog::{DestinationCatalog, SourceCatalog};
pub use events::{EventSink, ProgressEvent};
pub use orchestrator::{
    EVENT_BUFFER, MigrationJob, MigrationOrchestrator, MigrationState, PLAYLIST_DESCRIPTION,
};
pub use populator::PlaylistPopulator;
pub use reader::{SourcePlaylistReader, UNKNOWN_ARTIST, normalize_items};
pub use resolver::{TrackResolver, build_query};
