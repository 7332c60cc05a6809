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
    routes::season::Season,
    utils::{require_non_blank, success_to_api_response},
};

use super::model::{CreateEventRequest, Event};

async fn ensure_season(state: &AppState, league_id: i64, season_id: i64) -> Result<(), AppError> {
    match Season::find_in_league(&state.pool, league_id, season_id).await? {
        Some(_) => Ok(()),
        None => Err(AppError::NotFound("season not found".into())),
    }
}

#[axum::debug_handler]
pub async fn create_event(
    State(state): State<AppState>,
    WithRejection(Path((league_id, season_id)), _): WithRejection<Path<(i64, i64)>, AppError>,
    WithRejection(Json(req), _): WithRejection<Json<CreateEventRequest>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    require_non_blank("name", &req.name)?;
    ensure_season(&state, league_id, season_id).await?;

    let event = Event::create(&state.pool, season_id, &req).await?;
    tracing::info!(event_id = event.id, season_id, league_id, "event created");

    Ok((StatusCode::CREATED, success_to_api_response(event)))
}

#[axum::debug_handler]
pub async fn list_events(
    State(state): State<AppState>,
    WithRejection(Path((league_id, season_id)), _): WithRejection<Path<(i64, i64)>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    ensure_season(&state, league_id, season_id).await?;
    let events = Event::list_for_season(&state.pool, season_id).await?;
    Ok(success_to_api_response(events))
}

#[axum::debug_handler]
pub async fn get_event(
    State(state): State<AppState>,
    WithRejection(Path((league_id, season_id, event_id)), _): WithRejection<
        Path<(i64, i64, i64)>,
        AppError,
    >,
) -> Result<impl IntoResponse, AppError> {
    ensure_season(&state, league_id, season_id).await?;
    Event::find_in_season(&state.pool, season_id, event_id)
        .await?
        .map(success_to_api_response)
        .ok_or_else(|| AppError::NotFound("event not found".into()))
}
