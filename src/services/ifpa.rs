use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{LookupError, decode_response};
use crate::config::Config;

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct IfpaPlayer {
    #[serde(default)]
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

impl IfpaPlayer {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

#[derive(Debug, Deserialize)]
struct PlayerEnvelope {
    player: IfpaPlayer,
}

/// Player lookups against the IFPA API. Results are not cached.
#[derive(Debug, Clone)]
pub struct IfpaClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl IfpaClient {
    pub fn new(client: Client, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }

    pub fn from_config(client: Client, config: &Config) -> Self {
        Self::new(
            client,
            config.ifpa_base_url.clone(),
            config.ifpa_api_key.clone(),
        )
    }

    pub async fn get_player(&self, ifpa_number: i64) -> Result<IfpaPlayer, LookupError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(LookupError::MissingCredential("IFPA_API_KEY"))?;

        let url = format!("{}/player/{}", self.base_url, ifpa_number);
        debug!(%url, "fetching player from IFPA");

        let response = self.client.get(&url).bearer_auth(api_key).send().await?;
        let envelope: PlayerEnvelope = decode_response(response).await?;
        Ok(envelope.player)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use httpmock::Method::GET;
    use httpmock::MockServer;
    use serde_json::json;

    use super::*;
    use crate::services::http_client;

    fn client(server: &MockServer) -> IfpaClient {
        IfpaClient::new(
            http_client(Duration::from_secs(2)).unwrap(),
            server.base_url(),
            Some("ifpa-key".into()),
        )
    }

    #[tokio::test]
    async fn fetches_player_with_bearer_key() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/player/16004")
                    .header("authorization", "Bearer ifpa-key");
                then.status(200).json_body(json!({
                    "player": {
                        "id": 16004,
                        "first_name": "Keith",
                        "last_name": "Elwin",
                        "country": "United States",
                        "city": "Los Angeles",
                        "state": "CA"
                    }
                }));
            })
            .await;

        let player = client(&server).get_player(16004).await.unwrap();

        mock.assert_async().await;
        assert_eq!(player.id, 16004);
        assert_eq!(player.full_name(), "Keith Elwin");
    }

    #[tokio::test]
    async fn unknown_player_is_not_found() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/player/1");
                then.status(404);
            })
            .await;

        let err = client(&server).get_player(1).await.unwrap_err();
        assert!(matches!(err, LookupError::NotFound));
    }

    #[tokio::test]
    async fn missing_key_is_reported_per_call() {
        let ifpa = IfpaClient::new(
            http_client(Duration::from_secs(1)).unwrap(),
            "http://127.0.0.1:9",
            None,
        );

        let err = ifpa.get_player(16004).await.unwrap_err();
        assert!(matches!(err, LookupError::MissingCredential("IFPA_API_KEY")));
    }
}
