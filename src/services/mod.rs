pub mod mapper;

pub mod paginator;
pub use paginator::{EpisodePaginator, NumberedEpisode};

pub mod sync;
pub use sync::{
    AddAnimeOutcome, CatalogSynchronizer, SyncError, SyncFailure, UpdateEpisodesOutcome,
};
