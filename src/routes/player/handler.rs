use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;
use tracing::{info, warn};

use crate::{
    AppState,
    error::AppError,
    routes::league::League,
    services::LookupError,
    utils::success_to_api_response,
};

use super::model::{AddPlayersByIfpaRequest, Player};

#[axum::debug_handler]
pub async fn list_players(
    State(state): State<AppState>,
    WithRejection(Path(league_id), _): WithRejection<Path<i64>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let players = Player::list_for_league(&state.pool, league_id).await?;
    Ok(success_to_api_response(players))
}

#[axum::debug_handler]
pub async fn add_players_by_ifpa(
    State(state): State<AppState>,
    WithRejection(Path(league_id), _): WithRejection<Path<i64>, AppError>,
    WithRejection(Json(req), _): WithRejection<Json<AddPlayersByIfpaRequest>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let numbers = req
        .numbers()
        .map_err(|n| AppError::BadRequest(format!("invalid IFPA number: {n}")))?;
    if numbers.is_empty() {
        return Err(AppError::BadRequest("ifpaNumbers is required".into()));
    }
    if !League::exists(&state.pool, league_id).await? {
        return Err(AppError::NotFound("league not found".into()));
    }

    let mut players = Vec::with_capacity(numbers.len());
    for number in numbers {
        if let Some(existing) = Player::find_by_ifpa(&state.pool, league_id, number).await? {
            players.push(existing);
            continue;
        }

        let remote = state.ifpa.get_player(number).await.map_err(|err| match err {
            LookupError::NotFound => AppError::NotFound(format!("IFPA player {number} not found")),
            other => {
                warn!(ifpa_number = number, error = %other, "IFPA lookup failed");
                AppError::Upstream("failed to fetch player from IFPA".into())
            }
        })?;

        let player = Player::insert_ifpa(&state.pool, league_id, number, &remote.full_name()).await?;
        info!(player_id = player.id, league_id, ifpa_number = number, "player added");
        players.push(player);
    }

    Ok((StatusCode::CREATED, success_to_api_response(players)))
}
