//! Recent additions command handler

use crate::state::AppState;

pub async fn cmd_recent(state: &AppState, limit: u64) -> anyhow::Result<()> {
    let limit = limit.clamp(1, 100);
    let anime = state.store.recent_anime(limit).await?;
    let episodes = state.store.recent_episodes(limit).await?;

    if anime.is_empty() {
        println!("No anime in the catalog yet.");
        println!();
        println!("Add anime with: anisync add <MAL_ID>");
        return Ok(());
    }

    println!("Recently Added Anime");
    println!("{:-<70}", "");
    for entry in anime {
        let mal_id = entry
            .mal_id
            .map_or_else(|| "-".to_string(), |id| id.to_string());
        println!("• {} (ID: {} | MAL: {})", entry.title, entry.id, mal_id);
        println!("  Added: {}", entry.created_at);
    }

    println!();
    println!("Recently Added Episodes");
    println!("{:-<70}", "");
    for episode in episodes {
        println!(
            "• {} - Episode {} (added {})",
            episode.anime_title, episode.episode_number, episode.created_at
        );
    }

    Ok(())
}
