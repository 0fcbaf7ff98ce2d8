use crate::clients::http::FetchError;
use crate::clients::jikan::{EpisodePage, JikanClient, JikanEpisode};
use crate::domain::MalId;
use std::sync::Arc;
use tracing::{debug, warn};

/// Page size assumed when the upstream pagination block omits it.
pub const DEFAULT_PER_PAGE: u32 = 100;

/// An upstream episode paired with its 1-based position in the full listing.
#[derive(Debug, Clone)]
pub struct NumberedEpisode {
    pub number: i32,
    pub episode: JikanEpisode,
}

pub struct EpisodePaginator {
    jikan: Arc<JikanClient>,
    max_pages: u32,
}

impl EpisodePaginator {
    pub fn new(jikan: Arc<JikanClient>, max_pages: u32) -> Self {
        Self {
            jikan,
            max_pages: max_pages.max(1),
        }
    }

    /// Walks every episode page in order until upstream reports no next page.
    pub async fn fetch_all_episodes(
        &self,
        mal_id: MalId,
    ) -> Result<Vec<NumberedEpisode>, FetchError> {
        let mut episodes = Vec::new();
        let mut page = 1;

        loop {
            let result = self.jikan.get_episodes_page(mal_id, page).await?;
            let has_next = result.has_next_page();
            debug!(
                mal_id = %mal_id,
                page,
                count = result.data.len(),
                has_next,
                "Fetched episode page"
            );

            for episode in result.data {
                let number = position(0, episodes.len())?;
                episodes.push(NumberedEpisode { number, episode });
            }

            if !has_next {
                break;
            }
            if page >= self.max_pages {
                warn!(
                    mal_id = %mal_id,
                    max_pages = self.max_pages,
                    "Stopping episode pagination at page cap"
                );
                break;
            }
            page += 1;
        }

        Ok(episodes)
    }

    /// Fetches only the final page of the listing.
    ///
    /// Page 1 is always requested to locate the last page; it is reused
    /// when it is also the last page. The last page comes from
    /// `items.total / per_page`, or from `last_visible_page` when upstream
    /// omits the item total.
    pub async fn fetch_latest_episodes_page(
        &self,
        mal_id: MalId,
    ) -> Result<Vec<NumberedEpisode>, FetchError> {
        let first = self.jikan.get_episodes_page(mal_id, 1).await?;
        let Some((last_page, per_page)) = last_page(&first) else {
            debug!(mal_id = %mal_id, "Upstream reports no episodes");
            return Ok(Vec::new());
        };

        let page = if last_page == 1 {
            first
        } else {
            debug!(mal_id = %mal_id, last_page, "Fetching last episode page");
            self.jikan.get_episodes_page(mal_id, last_page).await?
        };

        let offset = (last_page - 1) * per_page;
        page.data
            .into_iter()
            .enumerate()
            .map(|(idx, episode)| {
                Ok(NumberedEpisode {
                    number: position(offset, idx)?,
                    episode,
                })
            })
            .collect()
    }
}

/// Last page number and page size, or `None` when the listing is empty.
fn last_page(first: &EpisodePage) -> Option<(u32, u32)> {
    let pagination = first.pagination.as_ref()?;
    let items = pagination.items.as_ref();
    let per_page = items
        .and_then(|i| i.per_page)
        .filter(|&n| n > 0)
        .unwrap_or(DEFAULT_PER_PAGE);

    let last = match items.and_then(|i| i.total) {
        Some(total) => total.div_ceil(per_page),
        None => pagination.last_visible_page.unwrap_or(0),
    };
    (last > 0).then_some((last, per_page))
}

fn position(offset: u32, index: usize) -> Result<i32, FetchError> {
    u32::try_from(index)
        .ok()
        .and_then(|i| offset.checked_add(i)?.checked_add(1))
        .and_then(|n| i32::try_from(n).ok())
        .ok_or_else(|| FetchError::response_format("episode position out of range", ""))
}
