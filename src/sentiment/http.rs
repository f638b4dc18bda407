use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::SentimentConfig;
use crate::error::{Error, Result};
use crate::sentiment::SentimentAdapter;

/// Calls an inference service with `POST {endpoint}/sentiment` and a body of
/// `{"text": ...}`, expecting `{"score": <0..1>}` back.
#[derive(Clone)]
pub struct HttpSentimentAdapter {
    endpoint: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct SentimentRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct SentimentResponse {
    score: f64,
}

impl HttpSentimentAdapter {
    pub fn from_config(config: &SentimentConfig) -> Result<Self> {
        let timeout = Duration::from_millis(config.timeout_ms);
        HttpSentimentAdapter::new(config.endpoint.clone(), timeout)
    }

    pub fn new(endpoint: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| Error::Sentiment(format!("failed to build client: {}", err)))?;
        Ok(Self { endpoint, client })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl SentimentAdapter for HttpSentimentAdapter {
    fn name(&self) -> &str {
        "http"
    }

    async fn score(&self, text: &str) -> Result<f64> {
        let url = format!("{}/sentiment", self.endpoint.trim_end_matches('/'));
        let response = self
            .client
            .post(url)
            .json(&SentimentRequest { text })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Sentiment(format!(
                "inference error {}: {}",
                status,
                body.trim()
            )));
        }

        let body: SentimentResponse = response.json().await?;
        Ok(body.score)
    }
}
