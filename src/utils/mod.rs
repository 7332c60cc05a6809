use axum::Json;
use bcrypt::{DEFAULT_COST, hash, verify};
use serde::Serialize;
use thiserror::Error;
use tokio::task;

pub mod token;

pub use token::{Claims, IssuedToken, TokenError, TokenService};

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error(transparent)]
    Bcrypt(#[from] bcrypt::BcryptError),
    #[error("password hashing task failed: {0}")]
    Task(#[from] task::JoinError),
}

/// bcrypt runs on the blocking pool so it never stalls an async worker.
pub async fn hash_password(password: &str) -> Result<String, PasswordError> {
    let password = password.to_owned();
    Ok(task::spawn_blocking(move || hash(password.as_bytes(), DEFAULT_COST)).await??)
}

pub async fn verify_password(password: &str, hashed: &str) -> Result<bool, PasswordError> {
    let (password, hashed) = (password.to_owned(), hashed.to_owned());
    Ok(task::spawn_blocking(move || verify(password.as_bytes(), &hashed)).await??)
}

/// `{"data": ...}` envelope used by the league, season, event and player endpoints.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

pub fn success_to_api_response<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse { data })
}

/// Rejects empty or whitespace-only request fields.
pub fn require_non_blank(field: &str, value: &str) -> Result<(), crate::error::AppError> {
    if value.trim().is_empty() {
        return Err(crate::error::AppError::BadRequest(format!(
            "{field} is required"
        )));
    }
    Ok(())
}
