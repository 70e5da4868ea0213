use async_trait::async_trait;
use deckdraw_core::{DeckResponse, DeckService, DrawResponse, ServiceError, SessionConfig};
use serde::de::DeserializeOwned;
use tracing::debug;

/// [`DeckService`] over the deckofcardsapi.com HTTP contract.
#[derive(Debug, Clone)]
pub struct HttpDeckService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpDeckService {
    pub fn new(config: &SessionConfig) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(transport)?;
        Ok(Self::with_client(client, &config.api_base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ServiceError> {
        let url = format!("{}/{}", self.base_url, path);
        debug!(%url, "deck service request");
        let response = self.client.get(&url).send().await.map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Status(status.as_u16()));
        }
        let body = response.bytes().await.map_err(transport)?;
        serde_json::from_slice(&body).map_err(|err| ServiceError::Decode(err.to_string()))
    }
}

fn transport(err: reqwest::Error) -> ServiceError {
    if err.is_timeout() {
        ServiceError::Transport(format!("request timed out: {err}"))
    } else {
        ServiceError::Transport(err.to_string())
    }
}

fn rejected(error: Option<String>) -> ServiceError {
    ServiceError::Rejected(error.unwrap_or_else(|| "request was not successful".to_string()))
}

fn accept_deck(body: DeckResponse) -> Result<DeckResponse, ServiceError> {
    if body.success {
        Ok(body)
    } else {
        Err(rejected(body.error))
    }
}

#[async_trait]
impl DeckService for HttpDeckService {
    async fn new_shuffled_deck(&self) -> Result<DeckResponse, ServiceError> {
        accept_deck(self.get("new/shuffle/").await?)
    }

    async fn draw(&self, deck_id: &str) -> Result<DrawResponse, ServiceError> {
        let body: DrawResponse = self.get(&format!("{deck_id}/draw/?count=1")).await?;
        // An empty deck answers success=false; the session turns that into exhaustion.
        if body.success || body.remaining == 0 {
            Ok(body)
        } else {
            Err(rejected(body.error))
        }
    }

    async fn reshuffle(&self, deck_id: &str) -> Result<DeckResponse, ServiceError> {
        accept_deck(self.get(&format!("{deck_id}/shuffle/")).await?)
    }
}
