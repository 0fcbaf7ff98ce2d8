use crate::domain::{AnimeId, MalId, SeasonId};
use crate::models::anime::{AnimeRecord, AnimeUpdate, NewAnime, RecentAnime};
use crate::models::episode::{EpisodeRecord, NewEpisode, RecentEpisode};
use crate::models::season::{NewSeason, SeasonRecord};
use anyhow::Result;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Statement,
};
use std::fmt;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

pub mod migrator;
pub mod repositories;

/// Errors raised by the persistence gateway.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("Invalid {table} row {id}: {reason}")]
    InvalidRow {
        table: &'static str,
        id: i32,
        reason: String,
    },
}

impl StoreError {
    pub fn invalid_row(table: &'static str, id: i32, reason: impl fmt::Display) -> Self {
        Self::InvalidRow {
            table,
            id,
            reason: reason.to_string(),
        }
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// The persistence operations the catalog synchronizer depends on.
///
/// `insert_anime` must reject a second row with the same MAL id; the
/// synchronizer's own existence check is a plain read-then-write.
#[async_trait::async_trait]
pub trait CatalogStore: Send + Sync {
    async fn find_anime_by_mal_id(&self, mal_id: MalId) -> StoreResult<Option<AnimeRecord>>;

    async fn insert_anime(&self, anime: NewAnime) -> StoreResult<AnimeRecord>;

    async fn update_anime(&self, id: AnimeId, update: AnimeUpdate) -> StoreResult<()>;

    /// Seasons of an anime ordered by season number.
    async fn find_seasons_by_anime(&self, anime_id: AnimeId) -> StoreResult<Vec<SeasonRecord>>;

    async fn insert_season(&self, season: NewSeason) -> StoreResult<SeasonRecord>;

    /// Episode numbers already stored for a season, ascending.
    async fn find_episode_numbers(&self, season_id: SeasonId) -> StoreResult<Vec<i32>>;

    async fn insert_episodes(&self, episodes: Vec<NewEpisode>) -> StoreResult<()>;
}

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    /// Single-connection in-memory database, mainly for tests.
    pub async fn in_memory() -> Result<Self> {
        Self::with_pool_options("sqlite::memory:", 1, 1).await
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn anime_repo(&self) -> repositories::anime::AnimeRepository {
        repositories::anime::AnimeRepository::new(self.conn.clone())
    }

    fn season_repo(&self) -> repositories::season::SeasonRepository {
        repositories::season::SeasonRepository::new(self.conn.clone())
    }

    fn episode_repo(&self) -> repositories::episode::EpisodeRepository {
        repositories::episode::EpisodeRepository::new(self.conn.clone())
    }

    pub async fn get_anime(&self, id: AnimeId) -> StoreResult<Option<AnimeRecord>> {
        self.anime_repo().get(id).await
    }

    pub async fn recent_anime(&self, limit: u64) -> StoreResult<Vec<RecentAnime>> {
        self.anime_repo().recent(limit).await
    }

    pub async fn recent_episodes(&self, limit: u64) -> StoreResult<Vec<RecentEpisode>> {
        self.episode_repo().recent(limit).await
    }

    pub async fn episodes_for_season(&self, season_id: SeasonId) -> StoreResult<Vec<EpisodeRecord>> {
        self.episode_repo().list_for_season(season_id).await
    }
}

#[async_trait::async_trait]
impl CatalogStore for Store {
    async fn find_anime_by_mal_id(&self, mal_id: MalId) -> StoreResult<Option<AnimeRecord>> {
        self.anime_repo().find_by_mal_id(mal_id).await
    }

    async fn insert_anime(&self, anime: NewAnime) -> StoreResult<AnimeRecord> {
        self.anime_repo().insert(anime).await
    }

    async fn update_anime(&self, id: AnimeId, update: AnimeUpdate) -> StoreResult<()> {
        self.anime_repo().update(id, update).await
    }

    async fn find_seasons_by_anime(&self, anime_id: AnimeId) -> StoreResult<Vec<SeasonRecord>> {
        self.season_repo().find_by_anime(anime_id).await
    }

    async fn insert_season(&self, season: NewSeason) -> StoreResult<SeasonRecord> {
        self.season_repo().insert(season).await
    }

    async fn find_episode_numbers(&self, season_id: SeasonId) -> StoreResult<Vec<i32>> {
        self.episode_repo().numbers_for_season(season_id).await
    }

    async fn insert_episodes(&self, episodes: Vec<NewEpisode>) -> StoreResult<()> {
        self.episode_repo().insert_many(episodes).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AgeRating, AnimeStatus};

    fn new_anime(mal_id: i32) -> NewAnime {
        NewAnime {
            mal_id: MalId::new(mal_id),
            title: "Death Note".to_string(),
            original_title: Some("デスノート".to_string()),
            synopsis: Some("A notebook.".to_string()),
            cover_image: None,
            trailer_url: None,
            age_rating: AgeRating::R,
            status: AnimeStatus::Completed,
            release_date: Some("2006-10-04T00:00:00+00:00".to_string()),
            end_date: Some("2007-06-27T00:00:00+00:00".to_string()),
            score: Some(8.62),
        }
    }

    fn new_episode(season_id: SeasonId, number: i32) -> NewEpisode {
        NewEpisode {
            season_id,
            number,
            title: format!("Episode {number}"),
            synopsis: None,
            duration: 23,
            air_date: None,
            filler: false,
            recap: false,
        }
    }

    #[tokio::test]
    async fn insert_and_find_anime_by_mal_id() {
        let store = Store::in_memory().await.unwrap();

        let inserted = store.insert_anime(new_anime(1535)).await.unwrap();
        assert_eq!(inserted.mal_id, Some(MalId::new(1535)));
        assert_eq!(inserted.age_rating, AgeRating::R);

        let found = store
            .find_anime_by_mal_id(MalId::new(1535))
            .await
            .unwrap()
            .expect("anime should exist");
        assert_eq!(found.id, inserted.id);
        assert_eq!(found.title, "Death Note");

        assert!(
            store
                .find_anime_by_mal_id(MalId::new(1))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn duplicate_mal_id_is_rejected() {
        let store = Store::in_memory().await.unwrap();
        store.insert_anime(new_anime(1535)).await.unwrap();

        let err = store.insert_anime(new_anime(1535)).await.unwrap_err();
        assert!(matches!(err, StoreError::Database(_)));
    }

    #[tokio::test]
    async fn update_overwrites_mutable_fields() {
        let store = Store::in_memory().await.unwrap();
        let anime = store.insert_anime(new_anime(21)).await.unwrap();

        store
            .update_anime(
                anime.id,
                AnimeUpdate {
                    title: "One Piece".to_string(),
                    synopsis: None,
                    status: AnimeStatus::Ongoing,
                    end_date: None,
                    score: Some(8.7),
                },
            )
            .await
            .unwrap();

        let updated = store.get_anime(anime.id).await.unwrap().unwrap();
        assert_eq!(updated.title, "One Piece");
        assert_eq!(updated.status, AnimeStatus::Ongoing);
        assert_eq!(updated.synopsis, None);
        assert_eq!(updated.end_date, None);
        assert_eq!(updated.age_rating, AgeRating::R);
    }

    #[tokio::test]
    async fn seasons_are_ordered_by_number() {
        let store = Store::in_memory().await.unwrap();
        let anime = store.insert_anime(new_anime(5)).await.unwrap();

        store
            .insert_season(NewSeason {
                anime_id: anime.id,
                number: 2,
                title: None,
            })
            .await
            .unwrap();
        store.insert_season(NewSeason::first(anime.id)).await.unwrap();

        let seasons = store.find_seasons_by_anime(anime.id).await.unwrap();
        let numbers: Vec<i32> = seasons.iter().map(|s| s.number).collect();
        assert_eq!(numbers, vec![1, 2]);
        assert_eq!(seasons[0].title.as_deref(), Some("Season 1"));
    }

    #[tokio::test]
    async fn episode_numbers_are_unique_per_season() {
        let store = Store::in_memory().await.unwrap();
        let anime = store.insert_anime(new_anime(30)).await.unwrap();
        let season = store.insert_season(NewSeason::first(anime.id)).await.unwrap();

        store
            .insert_episodes(vec![new_episode(season.id, 2), new_episode(season.id, 1)])
            .await
            .unwrap();
        assert_eq!(
            store.find_episode_numbers(season.id).await.unwrap(),
            vec![1, 2]
        );

        let err = store
            .insert_episodes(vec![new_episode(season.id, 2)])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Database(_)));
    }

    #[tokio::test]
    async fn empty_episode_batch_is_a_no_op() {
        let store = Store::in_memory().await.unwrap();
        store.insert_episodes(Vec::new()).await.unwrap();
    }

    #[tokio::test]
    async fn large_batches_are_chunked() {
        let store = Store::in_memory().await.unwrap();
        let anime = store.insert_anime(new_anime(21)).await.unwrap();
        let season = store.insert_season(NewSeason::first(anime.id)).await.unwrap();

        let episodes = (1..=1200).map(|n| new_episode(season.id, n)).collect();
        store.insert_episodes(episodes).await.unwrap();

        let numbers = store.find_episode_numbers(season.id).await.unwrap();
        assert_eq!(numbers.len(), 1200);
        assert_eq!(numbers.last(), Some(&1200));
    }

    #[tokio::test]
    async fn recent_listings_join_anime_titles() {
        let store = Store::in_memory().await.unwrap();
        let anime = store.insert_anime(new_anime(1535)).await.unwrap();
        let season = store.insert_season(NewSeason::first(anime.id)).await.unwrap();
        store
            .insert_episodes(vec![new_episode(season.id, 1)])
            .await
            .unwrap();

        let recent_anime = store.recent_anime(10).await.unwrap();
        assert_eq!(recent_anime.len(), 1);
        assert_eq!(recent_anime[0].title, "Death Note");

        let recent_episodes = store.recent_episodes(10).await.unwrap();
        assert_eq!(recent_episodes.len(), 1);
        assert_eq!(recent_episodes[0].anime_title, "Death Note");
        assert_eq!(recent_episodes[0].episode_number, 1);
        assert_eq!(recent_episodes[0].anime_id, anime.id);
    }

    #[tokio::test]
    async fn invalid_stored_enum_fails_fast() {
        let store = Store::in_memory().await.unwrap();
        let anime = store.insert_anime(new_anime(99)).await.unwrap();

        store
            .conn
            .execute_unprepared(&format!(
                "UPDATE anime SET age_rating = 'MA' WHERE id = {}",
                anime.id
            ))
            .await
            .unwrap();

        let err = store.get_anime(anime.id).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidRow { table: "anime", .. }));
    }
}
