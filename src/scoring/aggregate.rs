use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::warn;

use crate::scoring::ItemScore;
use crate::sentiment::SentimentLabel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weighting {
    Interaction,
    /// Every item had zero interaction, so each approval counts once.
    Unweighted,
    Empty,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchStats {
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl BatchStats {
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let std_dev = if values.len() > 1 {
            let sum_sq: f64 = values.iter().map(|value| (value - mean).powi(2)).sum();
            (sum_sq / (n - 1.0)).sqrt()
        } else {
            0.0
        };

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
        let mid = sorted.len() / 2;
        let median = if sorted.len() % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        } else {
            sorted[mid]
        };

        Self {
            mean,
            median,
            std_dev,
            min: sorted[0],
            max: sorted[sorted.len() - 1],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelCounts {
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
    pub fallback: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformSummary {
    pub platform: String,
    pub platform_score: f64,
    pub item_count: usize,
    pub total_interaction_mass: u64,
    pub weighting: Weighting,
    pub raw_er: BatchStats,
    pub approval: BatchStats,
    pub sentiment: LabelCounts,
}

/// Interaction-weighted mean of `(approval, total_interaction)` pairs. Falls
/// back to the plain mean when the batch has no interaction at all.
pub fn weighted_approval<I>(items: I) -> (f64, Weighting)
where
    I: IntoIterator<Item = (f64, u64)>,
{
    let mut weighted_sum = 0.0;
    let mut mass = 0.0;
    let mut plain_sum = 0.0;
    let mut count = 0usize;

    for (approval, interaction) in items {
        weighted_sum += approval * interaction as f64;
        mass += interaction as f64;
        plain_sum += approval;
        count += 1;
    }

    if count == 0 {
        return (0.0, Weighting::Empty);
    }
    if mass == 0.0 {
        return (plain_sum / count as f64, Weighting::Unweighted);
    }
    (weighted_sum / mass, Weighting::Interaction)
}

#[derive(Debug, Clone, Default)]
pub struct PlatformAggregator;

impl PlatformAggregator {
    pub fn new() -> Self {
        Self
    }

    pub fn aggregate(&self, platform: &str, items: &[ItemScore]) -> PlatformSummary {
        let (platform_score, weighting) = weighted_approval(
            items
                .iter()
                .map(|item| (item.approval_score, item.total_interaction)),
        );

        match weighting {
            Weighting::Unweighted => warn!(
                platform,
                items = items.len(),
                "batch has no interactions, using unweighted mean approval"
            ),
            Weighting::Empty => warn!(platform, "empty batch, platform score defaults to 0"),
            Weighting::Interaction => {}
        }

        let total_interaction_mass = items
            .iter()
            .fold(0u64, |acc, item| acc.saturating_add(item.total_interaction));
        let raw_er: Vec<f64> = items.iter().map(|item| item.raw_er).collect();
        let approval: Vec<f64> = items.iter().map(|item| item.approval_score).collect();

        let mut sentiment = LabelCounts::default();
        for item in items {
            match item.sentiment_label {
                SentimentLabel::Positive => sentiment.positive += 1,
                SentimentLabel::Neutral => sentiment.neutral += 1,
                SentimentLabel::Negative => sentiment.negative += 1,
            }
            if item.sentiment_fallback {
                sentiment.fallback += 1;
            }
        }

        PlatformSummary {
            platform: platform.to_string(),
            platform_score,
            item_count: items.len(),
            total_interaction_mass,
            weighting,
            raw_er: BatchStats::from_values(&raw_er),
            approval: BatchStats::from_values(&approval),
            sentiment,
        }
    }
}
