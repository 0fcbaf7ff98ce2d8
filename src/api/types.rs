use serde::{Deserialize, Serialize};

use crate::models::anime::RecentAnime;
use crate::models::episode::RecentEpisode;

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AddAnimeRequest {
    pub mal_id: i32,
}

#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecentAnimeDto {
    pub id: i32,
    pub mal_id: Option<i32>,
    pub title: String,
    pub cover_image: Option<String>,
    pub created_at: String,
}

impl From<RecentAnime> for RecentAnimeDto {
    fn from(anime: RecentAnime) -> Self {
        Self {
            id: anime.id.value(),
            mal_id: anime.mal_id.map(|id| id.value()),
            title: anime.title,
            cover_image: anime.cover_image,
            created_at: anime.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecentEpisodeDto {
    pub id: i32,
    pub episode_number: i32,
    pub anime_id: i32,
    pub anime_title: String,
    pub created_at: String,
}

impl From<RecentEpisode> for RecentEpisodeDto {
    fn from(episode: RecentEpisode) -> Self {
        Self {
            id: episode.id,
            episode_number: episode.episode_number,
            anime_id: episode.anime_id.value(),
            anime_title: episode.anime_title,
            created_at: episode.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthLiveResponse {
    pub status: String,
    pub uptime_seconds: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthReadyResponse {
    pub ready: bool,
    pub checks: HealthReadinessChecks,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthReadinessChecks {
    pub database: bool,
}
