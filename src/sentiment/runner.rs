use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::config::SentimentConfig;
use crate::sentiment::{
    prepare_text, SentimentAdapter, SentimentScore, SentimentThresholds,
};

pub struct SentimentRunner {
    adapter: Arc<dyn SentimentAdapter>,
    thresholds: SentimentThresholds,
    concurrency: usize,
    call_timeout: Duration,
    max_retries: u32,
    min_text_chars: usize,
}

impl SentimentRunner {
    pub fn new(
        adapter: Arc<dyn SentimentAdapter>,
        config: &SentimentConfig,
        thresholds: SentimentThresholds,
    ) -> Self {
        Self {
            adapter,
            thresholds,
            concurrency: config.concurrency.max(1),
            call_timeout: Duration::from_millis(config.timeout_ms),
            max_retries: config.max_retries,
            min_text_chars: config.min_text_chars,
        }
    }

    pub fn thresholds(&self) -> &SentimentThresholds {
        &self.thresholds
    }

    pub fn adapter_name(&self) -> &str {
        self.adapter.name()
    }

    /// Scores one raw text. Never fails: short text scores neutral, and an
    /// adapter that errors or times out on every attempt yields a neutral
    /// score flagged as a fallback.
    pub async fn score_text(&self, text: &str) -> SentimentScore {
        let prepared = prepare_text(text);
        if prepared.chars().count() < self.min_text_chars {
            return SentimentScore::neutral(&self.thresholds, false);
        }

        for attempt in 0..=self.max_retries {
            match timeout(self.call_timeout, self.adapter.score(&prepared)).await {
                Ok(Ok(value)) if value.is_finite() => {
                    let value = value.clamp(0.0, 1.0);
                    return SentimentScore {
                        value,
                        label: self.thresholds.label(value),
                        fallback: false,
                    };
                }
                Ok(Ok(value)) => {
                    warn!(adapter = self.adapter.name(), attempt, value, "non-finite sentiment score");
                }
                Ok(Err(err)) => {
                    warn!(adapter = self.adapter.name(), attempt, error = %err, "sentiment call failed");
                }
                Err(_) => {
                    warn!(
                        adapter = self.adapter.name(),
                        attempt,
                        timeout_ms = self.call_timeout.as_millis() as u64,
                        "sentiment call timed out"
                    );
                }
            }
        }

        debug!(adapter = self.adapter.name(), "falling back to neutral sentiment");
        SentimentScore::neutral(&self.thresholds, true)
    }

    /// Scores a batch with at most `concurrency` calls in flight. Calls finish
    /// in any order, so a slow item never holds back the ones queued behind
    /// it; results are written back in input order.
    pub async fn score_all<I, S>(&self, texts: I) -> Vec<SentimentScore>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let texts: Vec<String> = texts.into_iter().map(Into::into).collect();
        let mut scores = vec![None; texts.len()];

        let finished: Vec<(usize, SentimentScore)> = stream::iter(texts.into_iter().enumerate())
            .map(|(idx, text)| async move { (idx, self.score_text(&text).await) })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        for (idx, score) in finished {
            scores[idx] = Some(score);
        }
        scores
            .into_iter()
            .map(|score| score.unwrap_or_else(|| SentimentScore::neutral(&self.thresholds, true)))
            .collect()
    }
}
