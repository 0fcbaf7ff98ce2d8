//! Add and update command handlers

use crate::domain::MalId;
use crate::state::AppState;

fn positive_mal_id(mal_id: i32) -> anyhow::Result<MalId> {
    if mal_id <= 0 {
        anyhow::bail!("Invalid MAL ID: {mal_id}. ID must be a positive integer");
    }
    Ok(MalId::new(mal_id))
}

pub async fn cmd_add_anime(state: &AppState, mal_id: i32) -> anyhow::Result<()> {
    let mal_id = positive_mal_id(mal_id)?;
    println!("Adding anime with MAL ID {mal_id}...");

    let outcome = state.synchronizer.add_new_anime(mal_id).await;
    if !outcome.success {
        anyhow::bail!(outcome.message);
    }

    println!("✓ {}", outcome.message);
    if let Some(id) = outcome.anime_id {
        println!("  Anime ID: {id}");
    }
    Ok(())
}

pub async fn cmd_update_episodes(state: &AppState, mal_id: i32) -> anyhow::Result<()> {
    let mal_id = positive_mal_id(mal_id)?;
    println!("Fetching latest episodes for MAL ID {mal_id}...");

    let outcome = state.synchronizer.update_anime_episodes(mal_id).await;
    if !outcome.success {
        anyhow::bail!(outcome.message);
    }

    println!("✓ {}", outcome.message);
    Ok(())
}
