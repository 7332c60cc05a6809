use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::{debug, warn};

use super::{LookupError, MachineLookup, decode_response};
use crate::config::Config;

/// Machine payload returned by `GET /api/machines/{opdb_id}`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OpdbMachine {
    #[serde(default)]
    pub opdb_id: String,
    pub name: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub ipdb_id: Option<i32>,
    #[serde(default, rename = "type")]
    pub machine_type: Option<String>,
    #[serde(default)]
    pub is_pinball: bool,
    #[serde(default)]
    pub is_group: bool,
    #[serde(default)]
    pub is_alias: bool,
}

/// OPDB ids are ASCII alphanumerics joined by dashes, e.g. `G50wZ-MkR7z`.
pub fn is_valid_opdb_id(opdb_id: &str) -> bool {
    !opdb_id.is_empty()
        && opdb_id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-')
}

#[derive(Debug, Clone)]
pub struct OpdbClient {
    client: Client,
    base_url: String,
    api_token: Option<String>,
}

impl OpdbClient {
    pub fn new(client: Client, base_url: impl Into<String>, api_token: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_token,
        }
    }

    pub fn from_config(client: Client, config: &Config) -> Self {
        Self::new(
            client,
            config.opdb_base_url.clone(),
            config.opdb_api_token.clone(),
        )
    }

    pub async fn get_machine(&self, opdb_id: &str) -> Result<OpdbMachine, LookupError> {
        let api_token = self
            .api_token
            .as_deref()
            .ok_or(LookupError::MissingCredential("OPDB_API_TOKEN"))?;

        if !is_valid_opdb_id(opdb_id) {
            return Err(LookupError::NotFound);
        }

        let url = self.machine_url(opdb_id)?;
        debug!(%url, "fetching machine from OPDB");

        let response = self
            .client
            .get(url)
            .query(&[("api_token", api_token)])
            .send()
            .await
            .inspect_err(|err| warn!(opdb_id, error = %err, "OPDB request failed"))?;

        decode_response(response).await
    }

    /// `{base}/api/machines/{opdb_id}` with the id as one encoded path segment.
    fn machine_url(&self, opdb_id: &str) -> Result<Url, LookupError> {
        let invalid_base =
            || LookupError::RemoteUnavailable(format!("invalid OPDB base URL {}", self.base_url));

        let mut url = Url::parse(&self.base_url).map_err(|_| invalid_base())?;
        url.path_segments_mut()
            .map_err(|_| invalid_base())?
            .pop_if_empty()
            .extend(["api", "machines", opdb_id]);
        Ok(url)
    }
}

impl MachineLookup for OpdbClient {
    async fn fetch(&self, opdb_id: &str) -> Result<OpdbMachine, LookupError> {
        self.get_machine(opdb_id).await
    }
}
