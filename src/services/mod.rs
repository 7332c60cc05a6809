//! Outbound lookups against OPDB and IFPA, plus the machine cache in front of OPDB.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

pub mod ifpa;
pub mod machine_cache;
pub mod opdb;

pub use ifpa::{IfpaClient, IfpaPlayer};
pub use machine_cache::{MachineCache, MachineLookup, MachineStore, ResolveError};
pub use opdb::{OpdbClient, OpdbMachine, is_valid_opdb_id};

/// Failure of a remote lookup.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("not found")]
    NotFound,
    #[error("{0} is not configured")]
    MissingCredential(&'static str),
    #[error("remote service unavailable: {0}")]
    RemoteUnavailable(String),
    #[error("failed to decode remote response: {0}")]
    DecodeFailure(String),
}

impl From<reqwest::Error> for LookupError {
    fn from(err: reqwest::Error) -> Self {
        LookupError::RemoteUnavailable(err.to_string())
    }
}

/// Shared outbound client. The timeout bounds every remote call.
pub fn http_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder().timeout(timeout).build()
}

/// Maps a remote response onto `T`, classifying status codes on the way.
pub(crate) async fn decode_response<T: DeserializeOwned>(
    response: Response,
) -> Result<T, LookupError> {
    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Err(LookupError::NotFound);
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(LookupError::RemoteUnavailable(format!(
            "status {status}: {body}"
        )));
    }

    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|err| LookupError::DecodeFailure(err.to_string()))
}
