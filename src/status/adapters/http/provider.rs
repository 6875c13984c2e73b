//! HTTP client for the external automation service.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::status::{
    domain::BotId,
    ports::{ExternalStatus, ExternalStatusProvider, ProviderError, ProviderResult},
};

/// Body returned by `GET /api/v1/bots/{bot_id}`.
#[derive(Debug, Deserialize)]
struct BotStatusResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    error: Option<String>,
}

/// [`ExternalStatusProvider`] backed by the automation service REST API.
#[derive(Debug, Clone)]
pub struct HttpStatusProvider {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpStatusProvider {
    /// Creates a provider talking to the service at `base_url`.
    ///
    /// `timeout` bounds every request at the transport level.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Unavailable`] when the HTTP client cannot be
    /// built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> ProviderResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ProviderError::Unavailable(err.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            timeout,
        })
    }

    /// Returns the status URL for a bot.
    #[must_use]
    pub fn status_url(&self, bot_id: &BotId) -> String {
        format!("{}/api/v1/bots/{}", self.base_url, bot_id)
    }

    fn classify(&self, err: &reqwest::Error) -> ProviderError {
        if err.is_timeout() {
            ProviderError::Timeout(self.timeout)
        } else {
            ProviderError::Unavailable(err.to_string())
        }
    }
}

#[async_trait]
impl ExternalStatusProvider for HttpStatusProvider {
    async fn fetch_status(&self, bot_id: &BotId) -> ProviderResult<ExternalStatus> {
        let response = self
            .client
            .get(self.status_url(bot_id))
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|err| self.classify(&err))?;
        let body: BotStatusResponse = response
            .json()
            .await
            .map_err(|err| self.classify(&err))?;
        ExternalStatus::from_word(&body.status, body.error)
    }
}
