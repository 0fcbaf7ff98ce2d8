use super::StoreResult;
use crate::domain::{AnimeId, SeasonId};
use crate::entities::{anime, episode, prelude::*, season};
use crate::models::episode::{EpisodeRecord, NewEpisode, RecentEpisode};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, JoinType, NotSet, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Set,
};
use tracing::info;

/// Rows per INSERT statement, keeping each batch under SQLite's bound-parameter limit.
const INSERT_CHUNK_SIZE: usize = 500;

#[derive(Debug, FromQueryResult)]
struct RecentEpisodeRow {
    id: i32,
    number: i32,
    anime_id: i32,
    anime_title: String,
    created_at: String,
}

/// Repository for episode rows.
pub struct EpisodeRepository {
    conn: DatabaseConnection,
}

impl EpisodeRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn map_model(m: episode::Model) -> EpisodeRecord {
        EpisodeRecord {
            id: m.id,
            season_id: SeasonId::new(m.season_id),
            number: m.number,
            title: m.title,
            synopsis: m.synopsis,
            duration: m.duration,
            air_date: m.air_date,
            filler: m.filler,
            recap: m.recap,
            created_at: m.created_at,
        }
    }

    pub async fn numbers_for_season(&self, season_id: SeasonId) -> StoreResult<Vec<i32>> {
        let numbers = Episode::find()
            .select_only()
            .column(episode::Column::Number)
            .filter(episode::Column::SeasonId.eq(season_id.value()))
            .order_by_asc(episode::Column::Number)
            .into_tuple::<i32>()
            .all(&self.conn)
            .await?;

        Ok(numbers)
    }

    pub async fn list_for_season(&self, season_id: SeasonId) -> StoreResult<Vec<EpisodeRecord>> {
        let rows = Episode::find()
            .filter(episode::Column::SeasonId.eq(season_id.value()))
            .order_by_asc(episode::Column::Number)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(Self::map_model).collect())
    }

    pub async fn insert_many(&self, episodes: Vec<NewEpisode>) -> StoreResult<()> {
        if episodes.is_empty() {
            return Ok(());
        }

        let total = episodes.len();
        let now = chrono::Utc::now().to_rfc3339();
        let active_models: Vec<episode::ActiveModel> = episodes
            .into_iter()
            .map(|ep| episode::ActiveModel {
                id: NotSet,
                season_id: Set(ep.season_id.value()),
                number: Set(ep.number),
                title: Set(ep.title),
                synopsis: Set(ep.synopsis),
                duration: Set(ep.duration),
                air_date: Set(ep.air_date),
                filler: Set(ep.filler),
                recap: Set(ep.recap),
                created_at: Set(now.clone()),
            })
            .collect();

        for chunk in active_models.chunks(INSERT_CHUNK_SIZE) {
            Episode::insert_many(chunk.to_vec())
                .exec(&self.conn)
                .await?;
        }

        info!(count = total, "Inserted episodes");
        Ok(())
    }

    pub async fn recent(&self, limit: u64) -> StoreResult<Vec<RecentEpisode>> {
        let rows = Episode::find()
            .select_only()
            .column(episode::Column::Id)
            .column(episode::Column::Number)
            .column(episode::Column::CreatedAt)
            .column_as(anime::Column::Id, "anime_id")
            .column_as(anime::Column::Title, "anime_title")
            .join(JoinType::InnerJoin, episode::Relation::Season.def())
            .join(JoinType::InnerJoin, season::Relation::Anime.def())
            .order_by_desc(episode::Column::CreatedAt)
            .order_by_desc(episode::Column::Id)
            .limit(limit)
            .into_model::<RecentEpisodeRow>()
            .all(&self.conn)
            .await?;

        Ok(rows
            .into_iter()
            .map(|r| RecentEpisode {
                id: r.id,
                episode_number: r.number,
                anime_id: AnimeId::new(r.anime_id),
                anime_title: r.anime_title,
                created_at: r.created_at,
            })
            .collect())
    }
}
