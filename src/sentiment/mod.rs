//! Boundary to the sentiment model.
//!
//! The pipeline only consumes a score in [0, 1] per item. Whatever produces it
//! sits behind [`SentimentAdapter`]; [`SentimentRunner`] owns the calling
//! policy (text preparation, bounded concurrency, timeout, retry and the
//! neutral fallback).

pub mod http;
pub mod lexicon;
pub mod runner;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::config::{SentimentBackend, SentimentConfig};
use crate::error::Result;

pub use http::HttpSentimentAdapter;
pub use lexicon::LexiconAdapter;
pub use runner::SentimentRunner;

pub const NEUTRAL_SENTIMENT: f64 = 0.5;

#[async_trait]
pub trait SentimentAdapter: Send + Sync {
    fn name(&self) -> &str;

    /// Scores already-prepared text. Values outside [0, 1] are clamped by the
    /// caller.
    async fn score(&self, text: &str) -> Result<f64>;
}

pub fn build_adapter(config: &SentimentConfig) -> Result<Arc<dyn SentimentAdapter>> {
    match config.to_backend() {
        SentimentBackend::Http => Ok(Arc::new(HttpSentimentAdapter::from_config(config)?)),
        SentimentBackend::Lexicon => Ok(Arc::new(LexiconAdapter::new())),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl SentimentLabel {
    pub fn label(self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Neutral => "neutral",
            SentimentLabel::Negative => "negative",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentThresholds {
    pub positive: f64,
    pub negative: f64,
}

impl Default for SentimentThresholds {
    fn default() -> Self {
        Self {
            positive: 0.7,
            negative: 0.4,
        }
    }
}

impl SentimentThresholds {
    pub fn label(&self, score: f64) -> SentimentLabel {
        if score >= self.positive {
            SentimentLabel::Positive
        } else if score < self.negative {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentScore {
    pub value: f64,
    pub label: SentimentLabel,
    /// Set when the adapter failed and the neutral default was substituted.
    pub fallback: bool,
}

impl SentimentScore {
    pub fn neutral(thresholds: &SentimentThresholds, fallback: bool) -> Self {
        Self {
            value: NEUTRAL_SENTIMENT,
            label: thresholds.label(NEUTRAL_SENTIMENT),
            fallback,
        }
    }
}

/// Strips platform markup before scoring: bracketed emotes like `[doge]`,
/// `@mentions`, links and hashtag markers (the tag word itself is kept), then
/// collapses whitespace.
pub fn prepare_text(text: &str) -> String {
    let without_emotes = strip_bracketed(text);
    let mut tokens = Vec::new();

    for token in without_emotes.split_whitespace() {
        let mut token = token.replace('#', "");
        if let Some(pos) = token.find('@') {
            token.truncate(pos);
        }
        if let Some(pos) = token.find("http") {
            token.truncate(pos);
        }
        if !token.is_empty() {
            tokens.push(token);
        }
    }

    tokens.join(" ")
}

fn strip_bracketed(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find('[') {
        let after_open = &rest[open + 1..];
        match after_open.find(']') {
            Some(close) => {
                output.push_str(&rest[..open]);
                rest = &after_open[close + 1..];
            }
            None => break,
        }
    }

    output.push_str(rest);
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_bracketed_keeps_unclosed_bracket() {
        assert_eq!(strip_bracketed("good [doge] phone ["), "good  phone [");
    }

    #[test]
    fn strip_bracketed_is_non_greedy() {
        assert_eq!(strip_bracketed("[a]keep[b]"), "keep");
    }
}
