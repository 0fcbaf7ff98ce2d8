use super::http::{FetchClient, FetchError};
use crate::domain::MalId;
use serde::Deserialize;

pub const JIKAN_API: &str = "https://api.jikan.moe/v4";

#[derive(Debug, Deserialize)]
struct JikanResponse<T> {
    data: T,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JikanAnime {
    pub mal_id: i32,
    pub title: String,
    pub title_english: Option<String>,
    pub title_japanese: Option<String>,
    pub synopsis: Option<String>,
    pub images: Option<Images>,
    pub trailer: Option<Trailer>,
    pub rating: Option<String>,
    pub status: Option<String>,
    pub aired: Option<Aired>,
    pub duration: Option<String>,
    pub score: Option<f32>,
}

impl JikanAnime {
    #[must_use]
    pub fn cover_image(&self) -> Option<&str> {
        self.images
            .as_ref()
            .and_then(|i| i.jpg.as_ref())
            .and_then(|jpg| jpg.large_image_url.as_deref())
    }

    #[must_use]
    pub fn trailer_url(&self) -> Option<&str> {
        self.trailer.as_ref().and_then(|t| t.url.as_deref())
    }

    #[must_use]
    pub fn aired_from(&self) -> Option<&str> {
        self.aired.as_ref().and_then(|a| a.from.as_deref())
    }

    #[must_use]
    pub fn aired_to(&self) -> Option<&str> {
        self.aired.as_ref().and_then(|a| a.to.as_deref())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Images {
    pub jpg: Option<ImageSet>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageSet {
    pub large_image_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Trailer {
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Aired {
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JikanEpisode {
    pub mal_id: Option<i32>,
    pub title: Option<String>,
    pub title_english: Option<String>,
    pub title_romanji: Option<String>,
    pub title_japanese: Option<String>,
    pub aired: Option<String>,
    pub synopsis: Option<String>,
    #[serde(default)]
    pub filler: bool,
    #[serde(default)]
    pub recap: bool,
}

/// One page of `/anime/{id}/episodes`.
#[derive(Debug, Clone, Deserialize)]
pub struct EpisodePage {
    pub data: Vec<JikanEpisode>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

impl EpisodePage {
    #[must_use]
    pub fn has_next_page(&self) -> bool {
        self.pagination.as_ref().is_some_and(|p| p.has_next_page)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Pagination {
    pub last_visible_page: Option<u32>,
    #[serde(default)]
    pub has_next_page: bool,
    pub items: Option<PaginationItems>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaginationItems {
    pub total: Option<u32>,
    pub per_page: Option<u32>,
}

pub struct JikanClient {
    fetch: FetchClient,
    base_url: String,
}

impl JikanClient {
    pub fn new(fetch: FetchClient, base_url: impl Into<String>) -> Self {
        Self {
            fetch,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub async fn get_anime_full(&self, mal_id: MalId) -> Result<JikanAnime, FetchError> {
        let url = format!("{}/anime/{}/full", self.base_url, mal_id);
        let response: JikanResponse<JikanAnime> = self.fetch.fetch_json(&url, mal_id).await?;
        Ok(response.data)
    }

    pub async fn get_episodes_page(
        &self,
        mal_id: MalId,
        page: u32,
    ) -> Result<EpisodePage, FetchError> {
        let url = format!("{}/anime/{}/episodes?page={}", self.base_url, mal_id, page);
        self.fetch.fetch_json(&url, mal_id).await
    }
}
