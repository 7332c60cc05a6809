use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};

use crate::error::AppError;
use crate::utils::TokenService;

/// Principal resolved from a valid bearer token, available to handlers as
/// `Extension<CurrentUser>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser {
    pub user_id: i64,
}

/// Rejects the request with 401 unless it carries a valid
/// `Authorization: Bearer <token>` header. The inner service only runs on
/// success.
pub async fn auth_middleware(
    State(tokens): State<Arc<TokenService>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let Some(Authorization(bearer)) = request.headers().typed_get::<Authorization<Bearer>>()
    else {
        tracing::debug!(path = %request.uri().path(), "missing or malformed authorization header");
        return Err(AppError::Unauthorized);
    };

    let user_id = tokens.validate(bearer.token()).map_err(|err| {
        tracing::warn!(path = %request.uri().path(), reason = %err, "rejected bearer token");
        AppError::Unauthorized
    })?;

    request.extensions_mut().insert(CurrentUser { user_id });
    Ok(next.run(request).await)
}
