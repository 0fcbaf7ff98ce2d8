use crate::domain::{AnimeId, SeasonId};
use serde::Serialize;

/// Number of the implicit season every fetched episode is flattened into.
pub const DEFAULT_SEASON_NUMBER: i32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeasonRecord {
    pub id: SeasonId,
    pub anime_id: AnimeId,
    pub number: i32,
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSeason {
    pub anime_id: AnimeId,
    pub number: i32,
    pub title: Option<String>,
}

impl NewSeason {
    #[must_use]
    pub fn first(anime_id: AnimeId) -> Self {
        Self {
            anime_id,
            number: DEFAULT_SEASON_NUMBER,
            title: Some(format!("Season {DEFAULT_SEASON_NUMBER}")),
        }
    }
}
