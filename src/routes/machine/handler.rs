use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;

use crate::{
    AppState,
    error::AppError,
    services::{ResolveError, is_valid_opdb_id},
};

/// Machine metadata, served from the local cache while fresh.
#[axum::debug_handler]
pub async fn get_machine(
    State(state): State<AppState>,
    WithRejection(Path(opdb_id), _): WithRejection<Path<String>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let opdb_id = opdb_id.trim();
    if opdb_id.is_empty() {
        return Err(AppError::BadRequest("opdb_id is required".into()));
    }
    if !is_valid_opdb_id(opdb_id) {
        return Err(AppError::BadRequest("invalid opdb_id".into()));
    }

    state
        .machines
        .resolve(opdb_id)
        .await
        .map(Json)
        .map_err(|err| resolve_failure(opdb_id, &err))
}

/// Not-found surfaces as 404; every other failure is a generic 502.
fn resolve_failure(opdb_id: &str, err: &ResolveError) -> AppError {
    if err.is_not_found() {
        return AppError::NotFound("machine not found".into());
    }
    tracing::error!(opdb_id, error = %err, "machine resolve failed");
    AppError::Upstream("failed to fetch machine".into())
}

#[cfg(test)]
mod tests {
    use axum::{
        body::to_bytes,
        http::StatusCode,
        response::{IntoResponse, Response},
    };

    use super::*;
    use crate::services::LookupError;

    async fn render(err: ResolveError) -> (StatusCode, serde_json::Value) {
        let response: Response = resolve_failure("G50wZ", &err).into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn not_found_maps_to_404() {
        let (status, body) = render(ResolveError::Lookup(LookupError::NotFound)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, serde_json::json!({"error": "machine not found"}));
    }

    #[tokio::test]
    async fn other_failures_are_generic_502s() {
        let failures = [
            ResolveError::Lookup(LookupError::RemoteUnavailable("status 503: db down".into())),
            ResolveError::Lookup(LookupError::DecodeFailure("expected value at line 1".into())),
            ResolveError::Lookup(LookupError::MissingCredential("OPDB_API_TOKEN")),
            ResolveError::Storage(sqlx::Error::PoolTimedOut),
        ];

        for err in failures {
            let (status, body) = render(err).await;
            assert_eq!(status, StatusCode::BAD_GATEWAY);
            assert_eq!(body, serde_json::json!({"error": "failed to fetch machine"}));
        }
    }
}
