pub mod config;
pub mod error;
pub mod loader;
pub mod normalize;
pub mod platforms;
pub mod report;
pub mod scoring;
pub mod sentiment;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::ApprovalConfig;
use crate::scoring::{
    ApprovalComposer, ApprovalPipeline, EngagementScorer, PercentileNormalizer, PlatformAggregator,
};
use crate::sentiment::{SentimentAdapter, SentimentRunner};

pub use error::{Error, Result};

/// A counter value as it appears in a source file: either already numeric or a
/// locale-formatted string such as `"1.2万"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawCount {
    Number(f64),
    Text(String),
}

impl From<&str> for RawCount {
    fn from(value: &str) -> Self {
        RawCount::Text(value.to_string())
    }
}

impl From<String> for RawCount {
    fn from(value: String) -> Self {
        RawCount::Text(value)
    }
}

impl From<u64> for RawCount {
    fn from(value: u64) -> Self {
        RawCount::Number(value as f64)
    }
}

impl From<f64> for RawCount {
    fn from(value: f64) -> Self {
        RawCount::Number(value)
    }
}

/// One row of a platform export, keyed by the platform's native column names.
#[derive(Debug, Clone)]
pub struct RawRecord {
    pub platform: String,
    pub item_id: String,
    pub counters: HashMap<String, RawCount>,
    pub text: String,
}

impl RawRecord {
    pub fn new(platform: impl Into<String>, item_id: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            item_id: item_id.into(),
            counters: HashMap::new(),
            text: String::new(),
        }
    }

    pub fn with_counter(mut self, column: impl Into<String>, value: impl Into<RawCount>) -> Self {
        self.counters.insert(column.into(), value.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn counter(&self, column: &str) -> Option<&RawCount> {
        self.counters.get(column)
    }
}

/// Canonical counters. `views` and `coins` are `None` when the platform does
/// not expose them at all, which is not the same as a zero count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NormalizedMetrics {
    pub likes: u64,
    pub favorites: u64,
    pub comments: u64,
    pub shares: u64,
    pub views: Option<u64>,
    pub coins: Option<u64>,
}

impl NormalizedMetrics {
    pub fn total_interaction(&self) -> u64 {
        self.likes
            .saturating_add(self.favorites)
            .saturating_add(self.comments)
            .saturating_add(self.shares)
    }

    pub fn total_engagement(&self) -> u64 {
        self.total_interaction()
            .saturating_add(self.coins.unwrap_or(0))
    }
}

#[derive(Debug, Clone)]
pub struct NormalizedRecord {
    pub item_id: String,
    pub text: String,
    pub metrics: NormalizedMetrics,
}

/// Builds the per-platform pipeline from a loaded configuration.
pub fn build_pipeline(
    config: &ApprovalConfig,
    adapter: Arc<dyn SentimentAdapter>,
) -> ApprovalPipeline {
    let scorer = EngagementScorer::new();
    let normalizer = PercentileNormalizer::new();
    let composer = ApprovalComposer::new(config.weights.clone());
    let aggregator = PlatformAggregator::new();
    let runner = SentimentRunner::new(adapter, &config.sentiment, config.thresholds.clone());
    ApprovalPipeline::new(scorer, normalizer, composer, aggregator, runner)
}

pub(crate) fn clamp01(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.max(0.0).min(1.0)
}

pub fn format_number(value: f64) -> String {
    let rounded = value.round().max(0.0) as i64;
    let mut chars: Vec<char> = rounded.to_string().chars().collect();
    let mut result = String::new();
    let mut count = 0usize;

    while let Some(ch) = chars.pop() {
        if count == 3 {
            result.push(',');
            count = 0;
        }
        result.push(ch);
        count += 1;
    }

    result.chars().rev().collect()
}

pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value * 100.0)
}

pub fn format_float(value: f64, digits: usize) -> String {
    format!("{:.1$}", value, digits)
}
