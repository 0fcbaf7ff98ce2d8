//! Normalization of upstream catalog fields into stored values.
//!
//! Every function here is total: unrecognized input falls back to a fixed
//! default instead of failing the run.

use crate::clients::jikan::JikanEpisode;
use crate::domain::{AgeRating, AnimeStatus};
use regex::Regex;
use std::sync::OnceLock;

/// Runtime assumed when the upstream duration string carries no minutes.
pub const DEFAULT_RUNTIME_MINUTES: i32 = 24;

const YOUTUBE_EMBED_PREFIX: &str = "https://www.youtube.com/embed/";

fn get_regex(re: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    re.get_or_init(|| Regex::new(pattern).expect("Invalid regex pattern defined in code"))
}

#[must_use]
pub fn map_age_rating(rating: &str) -> AgeRating {
    match rating {
        "G - All Ages" => AgeRating::G,
        "PG - Children" => AgeRating::Pg,
        "PG-13 - Teens 13 or older" => AgeRating::Pg13,
        "R - 17+ (violence & profanity)" => AgeRating::R,
        "R+ - Mild Nudity" => AgeRating::RPlus,
        "Rx - Hentai" => AgeRating::Rx,
        _ => AgeRating::default(),
    }
}

#[must_use]
pub fn map_lifecycle_status(status: &str) -> AnimeStatus {
    match status {
        "Currently Airing" => AnimeStatus::Ongoing,
        "Finished Airing" => AnimeStatus::Completed,
        "Not yet aired" => AnimeStatus::Upcoming,
        _ => AnimeStatus::default(),
    }
}

/// Extracts minutes from strings like `"23 min per ep"` or `"1 hr 30 min"`.
///
/// Only the first `<digits> min` group counts, so hours are ignored.
#[must_use]
pub fn parse_runtime_minutes(duration: &str) -> i32 {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = get_regex(&RE, r"(\d+)\s*min");

    re.captures(duration)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(DEFAULT_RUNTIME_MINUTES)
}

/// Rewrites a YouTube watch/short/legacy URL into its embed form.
///
/// URLs already in embed form are returned unchanged; anything without a
/// recognizable 11-character video id yields `None`.
#[must_use]
pub fn normalize_trailer_url(url: Option<&str>) -> Option<String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = get_regex(
        &RE,
        r"(?:https?://)?(?:www\.)?(?:youtube\.com/(?:[^/\n\s]+/\S+/|(?:v|e(?:mbed)?)/|\S*?[?&]v=)|youtu\.be/)([a-zA-Z0-9_-]{11})",
    );

    let url = url?.trim();
    if url.is_empty() {
        return None;
    }
    if url.contains("youtube.com/embed/") {
        return Some(url.to_string());
    }

    let id = re.captures(url)?.get(1)?.as_str();
    Some(format!("{YOUTUBE_EMBED_PREFIX}{id}"))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Prefers the alternate (usually English) title when it has content.
#[must_use]
pub fn select_title(alternate: Option<&str>, primary: &str) -> String {
    non_empty(alternate).unwrap_or(primary).to_string()
}

#[must_use]
pub fn episode_title(episode: &JikanEpisode, number: i32) -> String {
    non_empty(episode.title_romanji.as_deref())
        .or_else(|| non_empty(episode.title_english.as_deref()))
        .or_else(|| non_empty(episode.title.as_deref()))
        .or_else(|| non_empty(episode.title_japanese.as_deref()))
        .map_or_else(|| format!("Episode {number}"), str::to_string)
}

#[must_use]
pub fn episode_synopsis(episode: &JikanEpisode, number: i32, anime_title: &str) -> String {
    non_empty(episode.synopsis.as_deref())
        .map_or_else(|| format!("Episode {number} of {anime_title}"), str::to_string)
}
