use serde::{Deserialize, Serialize};
use tracing::info;

use crate::normalize::{normalize_batch, PlatformProfile};
use crate::scoring::{
    ApprovalComposer, BatchStats, EngagementFormula, EngagementScorer, PercentileNormalizer,
    PlatformAggregator, PlatformSummary,
};
use crate::sentiment::{SentimentLabel, SentimentRunner};
use crate::{format_float, RawRecord};

/// One output row per item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemScore {
    pub item_id: String,
    pub raw_er: f64,
    pub normalized_engagement: f64,
    pub sentiment_score: f64,
    pub approval_score: f64,
    pub total_interaction: u64,
    pub sentiment_label: SentimentLabel,
    pub sentiment_fallback: bool,
    pub formula: EngagementFormula,
}

#[derive(Debug, Clone)]
pub struct PlatformRun {
    pub summary: PlatformSummary,
    pub items: Vec<ItemScore>,
    pub dropped_records: usize,
}

pub struct ApprovalPipeline {
    scorer: EngagementScorer,
    normalizer: PercentileNormalizer,
    composer: ApprovalComposer,
    aggregator: PlatformAggregator,
    sentiment: SentimentRunner,
}

impl ApprovalPipeline {
    pub fn new(
        scorer: EngagementScorer,
        normalizer: PercentileNormalizer,
        composer: ApprovalComposer,
        aggregator: PlatformAggregator,
        sentiment: SentimentRunner,
    ) -> Self {
        Self {
            scorer,
            normalizer,
            composer,
            aggregator,
            sentiment,
        }
    }

    pub fn sentiment(&self) -> &SentimentRunner {
        &self.sentiment
    }

    /// Scores one platform batch end to end. Batches are never merged: the
    /// percentile ranks are only meaningful within `records`.
    pub async fn score_batch(&self, profile: &PlatformProfile, records: &[RawRecord]) -> PlatformRun {
        let platform = profile.name.as_str();
        let (normalized, dropped_records) = normalize_batch(records, profile);
        info!(
            platform,
            kept = normalized.len(),
            dropped = dropped_records,
            formula = profile.formula().label(),
            "records normalized"
        );

        let engagement: Vec<_> = normalized
            .iter()
            .map(|record| self.scorer.score(&record.metrics))
            .collect();

        let raw_er: Vec<f64> = engagement.iter().map(|score| score.raw_er).collect();
        let er_stats = BatchStats::from_values(&raw_er);
        info!(
            platform,
            mean = %format_float(er_stats.mean, 4),
            median = %format_float(er_stats.median, 4),
            max = %format_float(er_stats.max, 4),
            "engagement computed"
        );

        let ranks = self.normalizer.collect(raw_er).rank();

        let texts: Vec<String> = normalized.iter().map(|record| record.text.clone()).collect();
        let sentiments = self.sentiment.score_all(texts).await;

        let items: Vec<ItemScore> = normalized
            .into_iter()
            .zip(engagement)
            .zip(ranks)
            .zip(sentiments)
            .map(|(((record, score), rank), sentiment)| ItemScore {
                item_id: record.item_id,
                raw_er: score.raw_er,
                normalized_engagement: rank,
                sentiment_score: sentiment.value,
                approval_score: self.composer.compose(rank, sentiment.value),
                total_interaction: score.total_interaction,
                sentiment_label: sentiment.label,
                sentiment_fallback: sentiment.fallback,
                formula: score.formula,
            })
            .collect();

        let summary = self.aggregator.aggregate(platform, &items);
        info!(
            platform,
            score = %format_float(summary.platform_score, 4),
            items = summary.item_count,
            interaction_mass = summary.total_interaction_mass,
            positive = summary.sentiment.positive,
            neutral = summary.sentiment.neutral,
            negative = summary.sentiment.negative,
            fallback = summary.sentiment.fallback,
            "platform approval aggregated"
        );

        PlatformRun {
            summary,
            items,
            dropped_records,
        }
    }
}
