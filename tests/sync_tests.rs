mod common;

use anisync::clients::http::RawResponse;
use anisync::db::CatalogStore;
use anisync::domain::{AgeRating, AnimeStatus, MalId};
use anisync::services::SyncFailure;
use common::{FakeJikan, episode_page, serve_death_note, test_state};

#[tokio::test]
async fn test_death_note_end_to_end() {
    let fake = FakeJikan::default();
    serve_death_note(&fake);
    let state = test_state(&fake).await;

    let outcome = state.synchronizer.add_new_anime(MalId::new(1535)).await;
    assert!(outcome.success, "{}", outcome.message);
    assert_eq!(outcome.episode_count, 37);
    assert_eq!(outcome.message, "Successfully added Death Note with 37 episodes");

    let anime = state
        .store
        .find_anime_by_mal_id(MalId::new(1535))
        .await
        .unwrap()
        .expect("anime should be stored");
    assert_eq!(anime.title, "Death Note");
    assert_eq!(anime.age_rating, AgeRating::R);
    assert_eq!(anime.status, AnimeStatus::Completed);
    assert_eq!(anime.trailer_url, None);
    assert_eq!(anime.release_date.as_deref(), Some("2006-10-04T00:00:00+00:00"));

    let seasons = state.store.find_seasons_by_anime(anime.id).await.unwrap();
    assert_eq!(seasons.len(), 1);

    let episodes = state.store.episodes_for_season(seasons[0].id).await.unwrap();
    assert_eq!(episodes.len(), 37);
    assert_eq!(
        episodes.iter().map(|e| e.number).collect::<Vec<_>>(),
        (1..=37).collect::<Vec<_>>()
    );
    assert!(episodes.iter().all(|e| e.duration == 24));
    assert!(episodes.iter().filter(|e| e.recap).count() == 1);
    assert_eq!(episodes[0].title, "Episode title 1");
}

#[tokio::test]
async fn test_add_is_idempotent() {
    let fake = FakeJikan::default();
    serve_death_note(&fake);
    let state = test_state(&fake).await;

    let first = state.synchronizer.add_new_anime(MalId::new(1535)).await;
    let requests_after_first = fake.requests().len();
    let second = state.synchronizer.add_new_anime(MalId::new(1535)).await;

    assert!(first.success);
    assert!(!second.success);
    assert_eq!(second.reason, Some(SyncFailure::AlreadyExists));
    assert_eq!(second.message, "Anime with MAL ID 1535 already exists.");
    // The existence check short-circuits before any upstream call.
    assert_eq!(fake.requests().len(), requests_after_first);

    let recent = state.store.recent_anime(10).await.unwrap();
    assert_eq!(recent.len(), 1);
}

#[tokio::test]
async fn test_rate_limited_requests_are_retried() {
    let fake = FakeJikan::default();
    serve_death_note(&fake);
    fake.serve_sequence(
        "/anime/1535/full",
        vec![
            RawResponse::json(429, r#"{"status":429}"#),
            RawResponse::json(429, r#"{"status":429}"#),
            RawResponse::json(200, common::death_note_detail().to_string()),
        ],
    );
    let state = test_state(&fake).await;

    let outcome = state.synchronizer.add_new_anime(MalId::new(1535)).await;
    assert!(outcome.success, "{}", outcome.message);

    let detail_requests = fake
        .requests()
        .iter()
        .filter(|p| p.as_str() == "/anime/1535/full")
        .count();
    assert_eq!(detail_requests, 3);
}

#[tokio::test]
async fn test_rate_limit_exhaustion_fails_run() {
    let fake = FakeJikan::default();
    fake.serve_sequence(
        "/anime/1535/full",
        vec![RawResponse::json(429, r#"{"status":429}"#)],
    );
    let state = test_state(&fake).await;

    let outcome = state.synchronizer.add_new_anime(MalId::new(1535)).await;
    assert!(!outcome.success);
    assert_eq!(outcome.reason, Some(SyncFailure::RateLimited));
    assert_eq!(fake.requests().len(), 5);
    assert!(state.store.recent_anime(10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_update_after_add_keeps_numbering_consistent() {
    let fake = FakeJikan::default();
    fake.serve("/anime/21/full", {
        let mut detail = common::death_note_detail();
        detail["data"]["mal_id"] = 21.into();
        detail["data"]["title"] = "One Piece".into();
        detail["data"]["status"] = "Currently Airing".into();
        detail
    });
    fake.serve("/anime/21/episodes?page=1", episode_page(1..=100, true, 205));
    fake.serve("/anime/21/episodes?page=2", episode_page(101..=200, true, 205));
    fake.serve("/anime/21/episodes?page=3", episode_page(201..=205, false, 205));
    let state = test_state(&fake).await;

    let added = state.synchronizer.add_new_anime(MalId::new(21)).await;
    assert_eq!(added.episode_count, 205);

    fake.serve("/anime/21/episodes?page=1", episode_page(1..=100, true, 207));
    fake.serve("/anime/21/episodes?page=3", episode_page(201..=207, false, 207));

    let updated = state.synchronizer.update_anime_episodes(MalId::new(21)).await;
    assert!(updated.success, "{}", updated.message);
    assert_eq!(updated.new_episodes_count, 2);

    let again = state.synchronizer.update_anime_episodes(MalId::new(21)).await;
    assert_eq!(again.new_episodes_count, 0);

    let anime_id = added.anime_id.unwrap();
    let seasons = state.store.find_seasons_by_anime(anime_id).await.unwrap();
    let numbers = state.store.find_episode_numbers(seasons[0].id).await.unwrap();
    assert_eq!(numbers, (1..=207).collect::<Vec<_>>());

    let anime = state.store.get_anime(anime_id).await.unwrap().unwrap();
    assert_eq!(anime.status, AnimeStatus::Ongoing);
}
