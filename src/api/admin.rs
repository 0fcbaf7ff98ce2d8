//! Admin endpoints that front the catalog synchronizer.
//!
//! The sync endpoints answer with the outcome object itself; its `reason`
//! selects the HTTP status.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::validation::{validate_limit, validate_mal_id};
use super::{
    AddAnimeRequest, ApiError, ApiResponse, AppState, LimitQuery, RecentAnimeDto,
    RecentEpisodeDto,
};
use crate::services::SyncFailure;

const fn outcome_status(reason: Option<SyncFailure>) -> StatusCode {
    match reason {
        None => StatusCode::OK,
        Some(SyncFailure::AlreadyExists) => StatusCode::CONFLICT,
        Some(SyncFailure::NotFound) => StatusCode::NOT_FOUND,
        Some(SyncFailure::RateLimited) => StatusCode::TOO_MANY_REQUESTS,
        Some(SyncFailure::UpstreamError | SyncFailure::FormatError) => StatusCode::BAD_GATEWAY,
        Some(SyncFailure::PersistenceError) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// `POST /api/admin/anime`
pub async fn add_anime(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AddAnimeRequest>,
) -> Result<Response, ApiError> {
    let mal_id = validate_mal_id(payload.mal_id)?;
    let outcome = state.synchronizer.add_new_anime(mal_id).await;
    Ok((outcome_status(outcome.reason), Json(outcome)).into_response())
}

/// `POST /api/admin/anime/{mal_id}/episodes/sync`
pub async fn sync_episodes(
    State(state): State<Arc<AppState>>,
    Path(mal_id): Path<i32>,
) -> Result<Response, ApiError> {
    let mal_id = validate_mal_id(mal_id)?;
    let outcome = state.synchronizer.update_anime_episodes(mal_id).await;
    Ok((outcome_status(outcome.reason), Json(outcome)).into_response())
}

/// `GET /api/admin/recent-anime`
pub async fn recent_anime(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<ApiResponse<Vec<RecentAnimeDto>>>, ApiError> {
    let limit = validate_limit(query.limit)?;
    let rows = state.store.recent_anime(limit).await?;
    Ok(Json(ApiResponse::success(
        rows.into_iter().map(RecentAnimeDto::from).collect(),
    )))
}

/// `GET /api/admin/recent-episodes`
pub async fn recent_episodes(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<ApiResponse<Vec<RecentEpisodeDto>>>, ApiError> {
    let limit = validate_limit(query.limit)?;
    let rows = state.store.recent_episodes(limit).await?;
    Ok(Json(ApiResponse::success(
        rows.into_iter().map(RecentEpisodeDto::from).collect(),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_status_mapping() {
        assert_eq!(outcome_status(None), StatusCode::OK);
        assert_eq!(
            outcome_status(Some(SyncFailure::AlreadyExists)),
            StatusCode::CONFLICT
        );
        assert_eq!(
            outcome_status(Some(SyncFailure::NotFound)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            outcome_status(Some(SyncFailure::RateLimited)),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            outcome_status(Some(SyncFailure::FormatError)),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            outcome_status(Some(SyncFailure::PersistenceError)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
