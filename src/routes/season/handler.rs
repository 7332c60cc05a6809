use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;

use crate::{
    AppState,
    error::AppError,
    routes::league::League,
    utils::{require_non_blank, success_to_api_response},
};

use super::model::{CreateSeasonRequest, Season};

#[axum::debug_handler]
pub async fn create_season(
    State(state): State<AppState>,
    WithRejection(Path(league_id), _): WithRejection<Path<i64>, AppError>,
    WithRejection(Json(req), _): WithRejection<Json<CreateSeasonRequest>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    require_non_blank("name", &req.name)?;
    if req.counting_games < 0 {
        return Err(AppError::BadRequest("countingGames must not be negative".into()));
    }
    if !League::exists(&state.pool, league_id).await? {
        return Err(AppError::NotFound("league not found".into()));
    }

    let season = Season::create(&state.pool, league_id, &req).await?;
    tracing::info!(season_id = season.id, league_id, "season created");

    Ok((StatusCode::CREATED, success_to_api_response(season)))
}

#[axum::debug_handler]
pub async fn list_seasons(
    State(state): State<AppState>,
    WithRejection(Path(league_id), _): WithRejection<Path<i64>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let seasons = Season::list_for_league(&state.pool, league_id).await?;
    tracing::debug!(league_id, count = seasons.len(), "listed seasons");
    Ok(success_to_api_response(seasons))
}

#[axum::debug_handler]
pub async fn get_season(
    State(state): State<AppState>,
    WithRejection(Path((league_id, season_id)), _): WithRejection<Path<(i64, i64)>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    Season::find_in_league(&state.pool, league_id, season_id)
        .await?
        .map(success_to_api_response)
        .ok_or_else(|| AppError::NotFound("season not found".into()))
}
