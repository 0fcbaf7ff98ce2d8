use super::StoreResult;
use crate::domain::{AnimeId, SeasonId};
use crate::entities::{prelude::*, season};
use crate::models::season::{NewSeason, SeasonRecord};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, NotSet, QueryFilter,
    QueryOrder, Set,
};
use tracing::info;

pub struct SeasonRepository {
    conn: DatabaseConnection,
}

impl SeasonRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn map_model(model: season::Model) -> SeasonRecord {
        SeasonRecord {
            id: SeasonId::new(model.id),
            anime_id: AnimeId::new(model.anime_id),
            number: model.number,
            title: model.title,
        }
    }

    pub async fn find_by_anime(&self, anime_id: AnimeId) -> StoreResult<Vec<SeasonRecord>> {
        let rows = Season::find()
            .filter(season::Column::AnimeId.eq(anime_id.value()))
            .order_by_asc(season::Column::Number)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(Self::map_model).collect())
    }

    pub async fn insert(&self, season: NewSeason) -> StoreResult<SeasonRecord> {
        let active_model = season::ActiveModel {
            id: NotSet,
            anime_id: Set(season.anime_id.value()),
            number: Set(season.number),
            title: Set(season.title),
        };

        let model = active_model.insert(&self.conn).await?;
        info!(
            anime_id = model.anime_id,
            season = model.number,
            "Created season"
        );
        Ok(Self::map_model(model))
    }
}
