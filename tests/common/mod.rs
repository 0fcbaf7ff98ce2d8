#![allow(dead_code)]

use anisync::api;
use anisync::clients::http::{FetchError, HttpTransport, RawResponse};
use anisync::config::Config;
use anisync::state::AppState;
use axum::Router;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const BASE_URL: &str = "http://jikan.test/v4";

/// In-process stand-in for the Jikan API keyed by request path.
#[derive(Clone, Default)]
pub struct FakeJikan {
    routes: Arc<Mutex<HashMap<String, Vec<RawResponse>>>>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl FakeJikan {
    /// Always answer `path` with `body`.
    pub fn serve(&self, path: &str, body: Value) {
        self.routes
            .lock()
            .unwrap()
            .insert(path.to_string(), vec![RawResponse::json(200, body.to_string())]);
    }

    /// Answer `path` with each response in turn, repeating the last one.
    pub fn serve_sequence(&self, path: &str, responses: Vec<RawResponse>) {
        self.routes
            .lock()
            .unwrap()
            .insert(path.to_string(), responses);
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl HttpTransport for FakeJikan {
    async fn get(&self, url: &str) -> Result<RawResponse, FetchError> {
        let path = url.trim_start_matches(BASE_URL).to_string();
        self.requests.lock().unwrap().push(path.clone());

        let mut routes = self.routes.lock().unwrap();
        let Some(queue) = routes.get_mut(&path) else {
            return Ok(RawResponse::json(404, r#"{"status":404}"#));
        };
        if queue.len() > 1 {
            Ok(queue.remove(0))
        } else {
            Ok(queue[0].clone())
        }
    }
}

pub fn test_config() -> Config {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    config.general.max_db_connections = 1;
    config.general.min_db_connections = 1;
    config.jikan.base_url = BASE_URL.to_string();
    config.jikan.request_delay_ms = 0;
    config.jikan.retry_backoff_ms = 0;
    config
}

pub async fn test_state(fake: &FakeJikan) -> AppState {
    AppState::with_transport(test_config(), fake.clone(), None)
        .await
        .expect("Failed to create app state")
}

pub fn test_router(state: AppState) -> Router {
    api::router(Arc::new(state))
}

pub fn death_note_detail() -> Value {
    json!({
        "data": {
            "mal_id": 1535,
            "title": "Death Note",
            "title_english": null,
            "title_japanese": "デスノート",
            "synopsis": "A shinigami, as a god of death, can kill any person.",
            "images": {"jpg": {"large_image_url": "https://cdn.myanimelist.net/images/anime/9/9453l.jpg"}},
            "trailer": {"url": null, "embed_url": null},
            "rating": "R - 17+ (violence & profanity)",
            "status": "Finished Airing",
            "aired": {"from": "2006-10-04T00:00:00+00:00", "to": "2007-06-27T00:00:00+00:00"},
            "duration": "24 min per ep",
            "score": 8.62
        }
    })
}

pub fn episode_page(range: std::ops::RangeInclusive<i32>, has_next: bool, total: i32) -> Value {
    let data: Vec<Value> = range
        .map(|n| {
            json!({
                "mal_id": n,
                "title": format!("Episode title {n}"),
                "title_romanji": null,
                "aired": "2006-10-04T00:00:00+00:00",
                "filler": false,
                "recap": n == 26
            })
        })
        .collect();

    json!({
        "pagination": {
            "last_visible_page": 1,
            "has_next_page": has_next,
            "items": {"count": data.len(), "total": total, "per_page": 100}
        },
        "data": data
    })
}

pub fn serve_death_note(fake: &FakeJikan) {
    fake.serve("/anime/1535/full", death_note_detail());
    fake.serve("/anime/1535/episodes?page=1", episode_page(1..=37, false, 37));
}
