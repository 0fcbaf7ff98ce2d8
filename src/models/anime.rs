use crate::domain::{AgeRating, AnimeId, AnimeStatus, MalId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimeRecord {
    pub id: AnimeId,
    pub mal_id: Option<MalId>,
    pub title: String,
    pub original_title: Option<String>,
    pub synopsis: Option<String>,
    pub cover_image: Option<String>,
    pub trailer_url: Option<String>,
    pub age_rating: AgeRating,
    pub status: AnimeStatus,
    pub release_date: Option<String>,
    pub end_date: Option<String>,
    pub score: Option<f32>,
    pub created_at: String,
    pub updated_at: String,
}

/// Fields written when an anime is first synchronized.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAnime {
    pub mal_id: MalId,
    pub title: String,
    pub original_title: Option<String>,
    pub synopsis: Option<String>,
    pub cover_image: Option<String>,
    pub trailer_url: Option<String>,
    pub age_rating: AgeRating,
    pub status: AnimeStatus,
    pub release_date: Option<String>,
    pub end_date: Option<String>,
    pub score: Option<f32>,
}

/// Mutable fields refreshed on every incremental synchronization.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimeUpdate {
    pub title: String,
    pub synopsis: Option<String>,
    pub status: AnimeStatus,
    pub end_date: Option<String>,
    pub score: Option<f32>,
}

/// Row shown in the admin "recently added" listing.
#[derive(Debug, Clone, Serialize)]
pub struct RecentAnime {
    pub id: AnimeId,
    pub mal_id: Option<MalId>,
    pub title: String,
    pub cover_image: Option<String>,
    pub created_at: String,
}
