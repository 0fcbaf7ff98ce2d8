use super::{StoreError, StoreResult};
use crate::domain::{AnimeId, MalId};
use crate::entities::{anime, prelude::*};
use crate::models::anime::{AnimeRecord, AnimeUpdate, NewAnime, RecentAnime};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, NotSet, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use tracing::{debug, info};

pub struct AnimeRepository {
    conn: DatabaseConnection,
}

impl AnimeRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn map_model(model: anime::Model) -> StoreResult<AnimeRecord> {
        let age_rating = model
            .age_rating
            .parse()
            .map_err(|e| StoreError::invalid_row("anime", model.id, e))?;
        let status = model
            .status
            .parse()
            .map_err(|e| StoreError::invalid_row("anime", model.id, e))?;

        Ok(AnimeRecord {
            id: AnimeId::new(model.id),
            mal_id: model.mal_id.map(MalId::new),
            title: model.title,
            original_title: model.original_title,
            synopsis: model.synopsis,
            cover_image: model.cover_image,
            trailer_url: model.trailer_url,
            age_rating,
            status,
            release_date: model.release_date,
            end_date: model.end_date,
            score: model.score,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }

    pub async fn find_by_mal_id(&self, mal_id: MalId) -> StoreResult<Option<AnimeRecord>> {
        Anime::find()
            .filter(anime::Column::MalId.eq(mal_id.value()))
            .one(&self.conn)
            .await?
            .map(Self::map_model)
            .transpose()
    }

    pub async fn get(&self, id: AnimeId) -> StoreResult<Option<AnimeRecord>> {
        Anime::find_by_id(id.value())
            .one(&self.conn)
            .await?
            .map(Self::map_model)
            .transpose()
    }

    pub async fn insert(&self, anime: NewAnime) -> StoreResult<AnimeRecord> {
        let now = chrono::Utc::now().to_rfc3339();
        let active_model = anime::ActiveModel {
            id: NotSet,
            mal_id: Set(Some(anime.mal_id.value())),
            title: Set(anime.title),
            original_title: Set(anime.original_title),
            synopsis: Set(anime.synopsis),
            cover_image: Set(anime.cover_image),
            trailer_url: Set(anime.trailer_url),
            age_rating: Set(anime.age_rating.as_str().to_string()),
            status: Set(anime.status.as_str().to_string()),
            release_date: Set(anime.release_date),
            end_date: Set(anime.end_date),
            score: Set(anime.score),
            created_at: Set(now.clone()),
            updated_at: Set(now),
        };

        let model = active_model.insert(&self.conn).await?;
        info!(anime_id = model.id, title = %model.title, "Inserted anime");
        Self::map_model(model)
    }

    pub async fn update(&self, id: AnimeId, update: AnimeUpdate) -> StoreResult<()> {
        let result = Anime::update_many()
            .col_expr(anime::Column::Title, Expr::value(update.title))
            .col_expr(anime::Column::Synopsis, Expr::value(update.synopsis))
            .col_expr(anime::Column::Status, Expr::value(update.status.as_str()))
            .col_expr(anime::Column::EndDate, Expr::value(update.end_date))
            .col_expr(anime::Column::Score, Expr::value(update.score))
            .col_expr(
                anime::Column::UpdatedAt,
                Expr::value(chrono::Utc::now().to_rfc3339()),
            )
            .filter(anime::Column::Id.eq(id.value()))
            .exec(&self.conn)
            .await?;

        debug!(anime_id = %id, rows = result.rows_affected, "Updated anime fields");
        Ok(())
    }

    pub async fn recent(&self, limit: u64) -> StoreResult<Vec<RecentAnime>> {
        let rows = Anime::find()
            .order_by_desc(anime::Column::CreatedAt)
            .order_by_desc(anime::Column::Id)
            .limit(limit)
            .all(&self.conn)
            .await?;

        Ok(rows
            .into_iter()
            .map(|m| RecentAnime {
                id: AnimeId::new(m.id),
                mal_id: m.mal_id.map(MalId::new),
                title: m.title,
                cover_image: m.cover_image,
                created_at: m.created_at,
            })
            .collect())
    }
}
