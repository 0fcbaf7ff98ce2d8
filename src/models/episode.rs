use crate::domain::{AnimeId, SeasonId};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EpisodeRecord {
    pub id: i32,
    pub season_id: SeasonId,
    pub number: i32,
    pub title: String,
    pub synopsis: Option<String>,
    pub duration: i32,
    pub air_date: Option<String>,
    pub filler: bool,
    pub recap: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEpisode {
    pub season_id: SeasonId,
    pub number: i32,
    pub title: String,
    pub synopsis: Option<String>,
    /// Runtime in minutes.
    pub duration: i32,
    pub air_date: Option<String>,
    pub filler: bool,
    pub recap: bool,
}

/// Row shown in the admin "recent episodes" listing.
#[derive(Debug, Clone, Serialize)]
pub struct RecentEpisode {
    pub id: i32,
    pub episode_number: i32,
    pub anime_id: AnimeId,
    pub anime_title: String,
    pub created_at: String,
}
