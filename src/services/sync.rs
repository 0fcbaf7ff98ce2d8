//! Catalog synchronization runs.
//!
//! [`CatalogSynchronizer::add_new_anime`] imports an anime with its full
//! episode listing; [`CatalogSynchronizer::update_anime_episodes`] refreshes
//! the mutable anime fields and appends episodes from the last upstream
//! page. Neither returns `Err`: failures are reported in the outcome with a
//! machine-readable reason and the stage the run stopped in.
//!
//! Writes are not wrapped in a transaction. A failure after the anime row
//! is inserted leaves that row behind, and a later add reports it as
//! already existing.

use crate::clients::http::FetchError;
use crate::clients::jikan::{JikanAnime, JikanClient};
use crate::db::{CatalogStore, StoreError};
use crate::domain::{AnimeId, MalId, SeasonId, SyncStage};
use crate::models::anime::{AnimeUpdate, NewAnime};
use crate::models::episode::NewEpisode;
use crate::models::season::{NewSeason, SeasonRecord};
use crate::services::mapper;
use crate::services::paginator::{EpisodePaginator, NumberedEpisode};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::{Instrument, debug, error, info, info_span};

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    RateLimitExceeded(String),

    #[error("{0}")]
    Upstream(String),

    #[error("{0}")]
    ResponseFormat(String),

    #[error("{0}")]
    Persistence(#[from] StoreError),
}

impl From<FetchError> for SyncError {
    fn from(err: FetchError) -> Self {
        let message = err.to_string();
        match err {
            FetchError::NotFound { .. } => Self::NotFound(message),
            FetchError::RateLimitExceeded { .. } => Self::RateLimitExceeded(message),
            FetchError::ResponseFormat { .. } => Self::ResponseFormat(message),
            FetchError::Upstream { .. }
            | FetchError::UnexpectedContentType { .. }
            | FetchError::Transport(_) => Self::Upstream(message),
        }
    }
}

impl SyncError {
    #[must_use]
    pub const fn kind(&self) -> SyncFailure {
        match self {
            Self::NotFound(_) => SyncFailure::NotFound,
            Self::RateLimitExceeded(_) => SyncFailure::RateLimited,
            Self::Upstream(_) => SyncFailure::UpstreamError,
            Self::ResponseFormat(_) => SyncFailure::FormatError,
            Self::Persistence(_) => SyncFailure::PersistenceError,
        }
    }
}

/// Reason code attached to an unsuccessful outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncFailure {
    AlreadyExists,
    NotFound,
    RateLimited,
    UpstreamError,
    FormatError,
    PersistenceError,
}

impl SyncFailure {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AlreadyExists => "already_exists",
            Self::NotFound => "not_found",
            Self::RateLimited => "rate_limited",
            Self::UpstreamError => "upstream_error",
            Self::FormatError => "format_error",
            Self::PersistenceError => "persistence_error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddAnimeOutcome {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<SyncFailure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_stage: Option<SyncStage>,
    pub anime_id: Option<AnimeId>,
    pub episode_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateEpisodesOutcome {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<SyncFailure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_stage: Option<SyncStage>,
    pub anime_id: Option<AnimeId>,
    pub new_episodes_count: usize,
}

/// Stage tracker for one run.
struct SyncRun {
    operation: &'static str,
    stage: SyncStage,
}

impl SyncRun {
    const fn new(operation: &'static str) -> Self {
        Self {
            operation,
            stage: SyncStage::Idle,
        }
    }

    fn advance(&mut self, next: SyncStage) {
        debug_assert!(!self.stage.is_terminal(), "sync run already finished");
        debug!(from = %self.stage, to = %next, "Sync stage transition");
        self.stage = next;
    }

    /// Marks the run failed and returns the stage it failed in.
    fn fail(&mut self, err: &SyncError) -> SyncStage {
        let failed_in = self.stage;
        error!(stage = %failed_in, reason = err.kind().as_str(), error = %err, "Sync run failed");
        self.advance(SyncStage::Failed);
        record_run(self.operation, err.kind().as_str());
        failed_in
    }

    fn finish(&mut self, outcome: &'static str) {
        self.advance(SyncStage::Done);
        record_run(self.operation, outcome);
    }
}

fn record_run(operation: &'static str, outcome: &'static str) {
    metrics::counter!(
        "catalog_sync_runs_total",
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);
}

pub struct CatalogSynchronizer {
    jikan: Arc<JikanClient>,
    paginator: EpisodePaginator,
    store: Arc<dyn CatalogStore>,
}

impl CatalogSynchronizer {
    pub fn new(jikan: Arc<JikanClient>, store: Arc<dyn CatalogStore>, max_pages: u32) -> Self {
        Self {
            paginator: EpisodePaginator::new(jikan.clone(), max_pages),
            jikan,
            store,
        }
    }

    /// Imports an anime and every upstream episode.
    ///
    /// Returns an unsuccessful outcome without writing anything when the
    /// MAL id is already stored.
    pub async fn add_new_anime(&self, mal_id: MalId) -> AddAnimeOutcome {
        let span = info_span!("sync", operation = "add", mal_id = %mal_id);

        async move {
            let mut run = SyncRun::new("add");
            match self.try_add(&mut run, mal_id).await {
                Ok(outcome) => outcome,
                Err(err) => {
                    let failed_in = run.fail(&err);
                    AddAnimeOutcome {
                        success: false,
                        message: err.to_string(),
                        reason: Some(err.kind()),
                        failed_stage: Some(failed_in),
                        anime_id: None,
                        episode_count: 0,
                    }
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn try_add(
        &self,
        run: &mut SyncRun,
        mal_id: MalId,
    ) -> Result<AddAnimeOutcome, SyncError> {
        run.advance(SyncStage::Checking);
        if let Some(existing) = self.store.find_anime_by_mal_id(mal_id).await? {
            info!(anime_id = %existing.id, "Anime already exists, skipping");
            run.finish(SyncFailure::AlreadyExists.as_str());
            return Ok(AddAnimeOutcome {
                success: false,
                message: format!("Anime with MAL ID {mal_id} already exists."),
                reason: Some(SyncFailure::AlreadyExists),
                failed_stage: None,
                anime_id: Some(existing.id),
                episode_count: 0,
            });
        }

        run.advance(SyncStage::Fetching);
        let anime = self.jikan.get_anime_full(mal_id).await?;
        let episodes = self.paginator.fetch_all_episodes(mal_id).await?;
        info!(title = %anime.title, episodes = episodes.len(), "Fetched upstream catalog entry");

        run.advance(SyncStage::Mapping);
        let new_anime = map_new_anime(mal_id, &anime);
        let display_title = new_anime.title.clone();

        run.advance(SyncStage::Writing);
        let record = self.store.insert_anime(new_anime).await?;
        let season = self.store.insert_season(NewSeason::first(record.id)).await?;

        let rows = build_episodes(season.id, &episodes, &anime, &display_title);
        let episode_count = rows.len();
        if !rows.is_empty() {
            self.store.insert_episodes(rows).await?;
            record_inserted(episode_count);
        }

        run.finish("success");
        info!(anime_id = %record.id, episodes = episode_count, "Added anime");

        Ok(AddAnimeOutcome {
            success: true,
            message: format!("Successfully added {display_title} with {episode_count} episodes"),
            reason: None,
            failed_stage: None,
            anime_id: Some(record.id),
            episode_count,
        })
    }

    /// Refreshes anime fields and appends episodes missing from the store.
    ///
    /// Only the last upstream page is consulted, so gaps earlier in the
    /// listing are not backfilled.
    pub async fn update_anime_episodes(&self, mal_id: MalId) -> UpdateEpisodesOutcome {
        let span = info_span!("sync", operation = "update", mal_id = %mal_id);

        async move {
            let mut run = SyncRun::new("update");
            match self.try_update(&mut run, mal_id).await {
                Ok(outcome) => outcome,
                Err(err) => {
                    let failed_in = run.fail(&err);
                    UpdateEpisodesOutcome {
                        success: false,
                        message: err.to_string(),
                        reason: Some(err.kind()),
                        failed_stage: Some(failed_in),
                        anime_id: None,
                        new_episodes_count: 0,
                    }
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn try_update(
        &self,
        run: &mut SyncRun,
        mal_id: MalId,
    ) -> Result<UpdateEpisodesOutcome, SyncError> {
        run.advance(SyncStage::Fetching);
        let anime = self.jikan.get_anime_full(mal_id).await?;
        let latest = self.paginator.fetch_latest_episodes_page(mal_id).await?;

        if latest.is_empty() {
            run.finish("no_episodes");
            return Ok(UpdateEpisodesOutcome {
                success: true,
                message: "No episodes available for this anime".to_string(),
                reason: None,
                failed_stage: None,
                anime_id: None,
                new_episodes_count: 0,
            });
        }
        debug!(count = latest.len(), "Episodes on last upstream page");

        run.advance(SyncStage::Checking);
        let existing = self
            .store
            .find_anime_by_mal_id(mal_id)
            .await?
            .ok_or_else(|| SyncError::NotFound(format!("Anime with MAL ID {mal_id} not found")))?;

        run.advance(SyncStage::Mapping);
        let update = map_update(&anime);
        let display_title = update.title.clone();

        run.advance(SyncStage::Writing);
        self.store.update_anime(existing.id, update).await?;
        let season = self.first_season(existing.id).await?;

        let known: HashSet<i32> = self
            .store
            .find_episode_numbers(season.id)
            .await?
            .into_iter()
            .collect();
        let fresh: Vec<NumberedEpisode> = latest
            .into_iter()
            .filter(|ep| !known.contains(&ep.number))
            .collect();

        let rows = build_episodes(season.id, &fresh, &anime, &display_title);
        let new_count = rows.len();
        if rows.is_empty() {
            info!("No new episodes to add");
        } else {
            self.store.insert_episodes(rows).await?;
            record_inserted(new_count);
            info!(count = new_count, "Added new episodes");
        }

        run.finish("success");
        Ok(UpdateEpisodesOutcome {
            success: true,
            message: format!("Updated anime and added {new_count} new episodes"),
            reason: None,
            failed_stage: None,
            anime_id: Some(existing.id),
            new_episodes_count: new_count,
        })
    }

    async fn first_season(&self, anime_id: AnimeId) -> Result<SeasonRecord, SyncError> {
        let seasons = self.store.find_seasons_by_anime(anime_id).await?;
        match seasons.into_iter().next() {
            Some(season) => Ok(season),
            None => {
                debug!(anime_id = %anime_id, "Creating missing first season");
                Ok(self.store.insert_season(NewSeason::first(anime_id)).await?)
            }
        }
    }
}

fn record_inserted(count: usize) {
    metrics::counter!("catalog_sync_episodes_inserted_total")
        .increment(u64::try_from(count).unwrap_or(u64::MAX));
}

fn display_title(anime: &JikanAnime) -> String {
    mapper::select_title(anime.title_english.as_deref(), &anime.title)
}

fn map_new_anime(mal_id: MalId, anime: &JikanAnime) -> NewAnime {
    NewAnime {
        mal_id,
        title: display_title(anime),
        original_title: anime.title_japanese.clone(),
        synopsis: anime.synopsis.clone(),
        cover_image: anime.cover_image().map(str::to_string),
        trailer_url: mapper::normalize_trailer_url(anime.trailer_url()),
        age_rating: mapper::map_age_rating(anime.rating.as_deref().unwrap_or_default()),
        status: mapper::map_lifecycle_status(anime.status.as_deref().unwrap_or_default()),
        release_date: anime.aired_from().map(str::to_string),
        end_date: anime.aired_to().map(str::to_string),
        score: anime.score,
    }
}

fn map_update(anime: &JikanAnime) -> AnimeUpdate {
    AnimeUpdate {
        title: display_title(anime),
        synopsis: anime.synopsis.clone(),
        status: mapper::map_lifecycle_status(anime.status.as_deref().unwrap_or_default()),
        end_date: anime.aired_to().map(str::to_string),
        score: anime.score,
    }
}

fn build_episodes(
    season_id: SeasonId,
    episodes: &[NumberedEpisode],
    anime: &JikanAnime,
    anime_title: &str,
) -> Vec<NewEpisode> {
    let duration = mapper::parse_runtime_minutes(anime.duration.as_deref().unwrap_or_default());

    episodes
        .iter()
        .map(|NumberedEpisode { number, episode }| NewEpisode {
            season_id,
            number: *number,
            title: mapper::episode_title(episode, *number),
            synopsis: Some(mapper::episode_synopsis(episode, *number, anime_title)),
            duration,
            air_date: episode
                .aired
                .clone()
                .or_else(|| anime.aired_from().map(str::to_string)),
            filler: episode.filler,
            recap: episode.recap,
        })
        .collect()
}
