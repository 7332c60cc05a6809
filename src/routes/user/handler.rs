use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;

use crate::{AppState, error::AppError, middleware::CurrentUser, utils::require_non_blank};

use super::model::{
    AuthResponse, LoginRequest, SignupRequest, User, UserProfile, is_unique_violation,
};

const INVALID_CREDENTIALS: &str = "invalid credentials";

fn auth_response(state: &AppState, user: User) -> Result<AuthResponse, AppError> {
    let issued = state.tokens.issue(user.id).map_err(|e| {
        tracing::error!(user_id = user.id, error = %e, "token generation failed");
        AppError::Internal("failed to generate token".into())
    })?;

    Ok(AuthResponse {
        user: UserProfile::from(user),
        token: issued.token,
        expires_at: issued.expires_at,
    })
}

#[axum::debug_handler]
pub async fn signup(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<SignupRequest>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    require_non_blank("email", &req.email)?;
    require_non_blank("password", &req.password)?;
    require_non_blank("firstName", &req.first_name)?;
    require_non_blank("lastName", &req.last_name)?;

    if User::find_by_email(&state.pool, &req.email).await?.is_some() {
        tracing::info!(email = %req.email, "signup rejected, user already exists");
        return Err(AppError::Conflict("user already exists".into()));
    }

    let user = User::create(&state.pool, &req).await.map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict("user already exists".into())
        } else {
            AppError::from(e)
        }
    })?;

    tracing::info!(user_id = user.id, "user signed up");
    Ok((StatusCode::CREATED, Json(auth_response(&state, user)?)))
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<LoginRequest>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    require_non_blank("email", &req.email)?;
    require_non_blank("password", &req.password)?;

    let Some(user) = User::find_by_email(&state.pool, &req.email).await? else {
        tracing::info!(email = %req.email, "login failed, unknown email");
        return Err(AppError::InvalidCredentials(INVALID_CREDENTIALS.into()));
    };

    let verified = user.verify_login(&req.password).await.map_err(|e| {
        tracing::error!(user_id = user.id, error = %e, "password verification failed");
        AppError::Internal("failed to login".into())
    })?;
    if !verified {
        tracing::info!(user_id = user.id, "login failed, wrong password");
        return Err(AppError::InvalidCredentials(INVALID_CREDENTIALS.into()));
    }

    tracing::info!(user_id = user.id, "user logged in");
    Ok(Json(auth_response(&state, user)?))
}

#[axum::debug_handler]
pub async fn me(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    match User::find_by_id(&state.pool, current.user_id).await? {
        Some(user) => Ok(Json(UserProfile::from(user))),
        None => {
            tracing::warn!(user_id = current.user_id, "token subject no longer exists");
            Err(AppError::NotFound("user not found".into()))
        }
    }
}
