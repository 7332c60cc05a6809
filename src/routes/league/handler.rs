use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;

use crate::{
    AppState,
    error::AppError,
    middleware::CurrentUser,
    utils::{require_non_blank, success_to_api_response},
};

use super::model::{CreateLeagueRequest, League};

#[axum::debug_handler]
pub async fn create_league(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    WithRejection(Json(req), _): WithRejection<Json<CreateLeagueRequest>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    require_non_blank("name", &req.name)?;
    require_non_blank("location", &req.location)?;

    let league = League::create(&state.pool, &req, current.user_id).await?;
    tracing::info!(league_id = league.id, owner_id = current.user_id, name = %league.name, "league created");

    Ok((StatusCode::CREATED, success_to_api_response(league)))
}

#[axum::debug_handler]
pub async fn list_leagues(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let leagues = League::list(&state.pool).await?;
    tracing::debug!(count = leagues.len(), "listed leagues");
    Ok(success_to_api_response(leagues))
}

#[axum::debug_handler]
pub async fn get_league(
    State(state): State<AppState>,
    WithRejection(Path(league_id), _): WithRejection<Path<i64>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    match League::find_by_id(&state.pool, league_id).await? {
        Some(league) => Ok(success_to_api_response(league)),
        None => Err(AppError::NotFound("league not found".into())),
    }
}
