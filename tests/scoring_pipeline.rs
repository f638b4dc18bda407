use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use approval_index::config::ApprovalConfig;
use approval_index::normalize::PlatformProfile;
use approval_index::scoring::{
    weighted_approval, ApprovalComposer, ApprovalWeights, EngagementFormula, EngagementScorer,
    PercentileNormalizer, PlatformAggregator, Weighting,
};
use approval_index::sentiment::{LexiconAdapter, SentimentAdapter};
use approval_index::{build_pipeline, NormalizedMetrics, RawRecord, Result};

struct FixedSentiment {
    scores: HashMap<String, f64>,
}

#[async_trait]
impl SentimentAdapter for FixedSentiment {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn score(&self, text: &str) -> Result<f64> {
        Ok(self.scores.get(text).copied().unwrap_or(0.5))
    }
}

fn view_metrics(engagement: u64, views: u64) -> NormalizedMetrics {
    NormalizedMetrics {
        likes: engagement,
        views: Some(views),
        coins: Some(0),
        ..NormalizedMetrics::default()
    }
}

fn peer_metrics(likes: u64) -> NormalizedMetrics {
    NormalizedMetrics {
        likes,
        ..NormalizedMetrics::default()
    }
}

#[test]
fn view_rate_includes_coins_and_divides_by_views() {
    let metrics = NormalizedMetrics {
        likes: 40,
        favorites: 20,
        comments: 10,
        shares: 10,
        views: Some(1000),
        coins: Some(20),
    };
    let score = EngagementScorer::new().score(&metrics);

    assert_eq!(score.formula, EngagementFormula::ViewRate);
    assert!((score.raw_er - 0.1).abs() < 1e-9);
    assert_eq!(score.total_interaction, 80);
}

#[test]
fn view_rate_with_zero_views_is_zero() {
    let score = EngagementScorer::new().score(&view_metrics(50, 0));
    assert_eq!(score.formula, EngagementFormula::ViewRate);
    assert_eq!(score.raw_er, 0.0);
}

#[test]
fn missing_views_selects_peer_interaction() {
    let metrics = NormalizedMetrics {
        likes: 5,
        favorites: 3,
        comments: 1,
        shares: 1,
        views: None,
        coins: None,
    };
    let score = EngagementScorer::new().score(&metrics);

    assert_eq!(score.formula, EngagementFormula::PeerInteraction);
    assert!((score.raw_er - 10.0).abs() < 1e-9);
}

#[test]
fn percentile_view_batch_with_ties() {
    let scorer = EngagementScorer::new();
    let batch = [view_metrics(100, 1000), view_metrics(50, 500), view_metrics(0, 0)];
    let raw: Vec<f64> = batch.iter().map(|m| scorer.score(m).raw_er).collect();

    assert!((raw[0] - 0.1).abs() < 1e-9);
    assert!((raw[1] - 0.1).abs() < 1e-9);
    assert_eq!(raw[2], 0.0);

    let ranks = PercentileNormalizer::new().collect(raw).rank();
    assert!((ranks[0] - ranks[1]).abs() < 1e-12);
    assert!(ranks[0] > ranks[2]);
    assert_eq!(ranks[2], 0.0);
    assert!((ranks[0] - 0.75).abs() < 1e-9);
}

#[test]
fn percentile_peer_batch_of_two() {
    let scorer = EngagementScorer::new();
    let raw: Vec<f64> = [peer_metrics(10), peer_metrics(100)]
        .iter()
        .map(|m| scorer.score(m).raw_er)
        .collect();

    let ranks = PercentileNormalizer::new().collect(raw).rank();
    assert_eq!(ranks, vec![0.0, 1.0]);
}

#[test]
fn percentile_edge_batches() {
    let normalizer = PercentileNormalizer::new();
    assert!(normalizer.collect(Vec::new()).rank().is_empty());
    assert_eq!(normalizer.collect(vec![42.0]).rank(), vec![0.5]);
    assert_eq!(normalizer.collect(vec![3.0, 3.0, 3.0]).rank(), vec![0.5, 0.5, 0.5]);
}

#[test]
fn percentile_is_bounded_and_order_preserving() {
    let values = vec![7.0, 0.0, 3.5, 7.0, 120.0, 0.2, 3.5, 3.5, 9.0, 0.0, 55.0];
    let ranks = PercentileNormalizer::new().collect(values.clone()).rank();

    assert_eq!(ranks.len(), values.len());
    for (i, rank) in ranks.iter().enumerate() {
        assert!((0.0..=1.0).contains(rank));
        for j in 0..values.len() {
            if values[i] <= values[j] {
                assert!(ranks[i] <= ranks[j] + 1e-12);
            }
            if values[i] == values[j] {
                assert!((ranks[i] - ranks[j]).abs() < 1e-12);
            }
        }
    }
    assert_eq!(ranks[4], 1.0);
}

#[test]
fn composer_uses_weights_and_clamps() {
    let composer = ApprovalComposer::new(ApprovalWeights::default());

    assert!((composer.compose(0.5, 1.0) - 0.7).abs() < 1e-9);
    assert_eq!(composer.compose(0.0, 0.0), 0.0);
    assert!((composer.compose(1.0, 1.0) - 1.0).abs() < 1e-9);
    assert!((composer.compose(1.0, 7.5) - 1.0).abs() < 1e-9);
    assert!((composer.compose(0.5, -3.0) - 0.3).abs() < 1e-9);

    for engagement in [0.0, 0.1, 0.33, 0.5, 0.9, 1.0] {
        for sentiment in [0.0, 0.25, 0.5, 0.75, 1.0] {
            let approval = composer.compose(engagement, sentiment);
            assert!((0.0..=1.0).contains(&approval));
        }
    }
}

#[test]
fn weighted_approval_uses_interaction_mass() {
    let (score, weighting) = weighted_approval(vec![(0.2, 100), (0.8, 300)]);
    assert_eq!(weighting, Weighting::Interaction);
    assert!((score - 0.65).abs() < 1e-9);
}

#[test]
fn weighted_approval_falls_back_to_mean_without_interaction() {
    let (score, weighting) = weighted_approval(vec![(0.2, 0), (0.5, 0), (0.8, 0)]);
    assert_eq!(weighting, Weighting::Unweighted);
    assert!(score.is_finite());
    assert!((score - 0.5).abs() < 1e-9);
}

#[test]
fn weighted_approval_of_empty_batch() {
    let (score, weighting) = weighted_approval(Vec::new());
    assert_eq!(weighting, Weighting::Empty);
    assert_eq!(score, 0.0);
}

fn douyin_record(id: &str, likes: &str, text: &str) -> RawRecord {
    RawRecord::new("douyin", id)
        .with_counter("liked_count", likes)
        .with_counter("collected_count", "0")
        .with_counter("comment_count", "0")
        .with_counter("share_count", "0")
        .with_text(text)
}

#[tokio::test]
async fn pipeline_scores_peer_batch_end_to_end() {
    let config = ApprovalConfig::default();
    let adapter = Arc::new(FixedSentiment {
        scores: HashMap::from([("great".to_string(), 0.9), ("meh".to_string(), 0.3)]),
    });
    let pipeline = build_pipeline(&config, adapter);

    let records = vec![
        douyin_record("a", "10", "great"),
        douyin_record("b", "1万", "meh"),
        douyin_record("a", "999", "duplicate"),
        douyin_record("", "5", "no id"),
    ];
    let run = pipeline
        .score_batch(&PlatformProfile::douyin(), &records)
        .await;

    assert_eq!(run.dropped_records, 2);
    assert_eq!(run.items.len(), 2);

    let a = &run.items[0];
    let b = &run.items[1];
    assert_eq!(a.item_id, "a");
    assert_eq!(a.total_interaction, 10);
    assert_eq!(b.total_interaction, 10_000);
    assert_eq!(a.normalized_engagement, 0.0);
    assert_eq!(b.normalized_engagement, 1.0);
    assert!((a.approval_score - 0.36).abs() < 1e-9);
    assert!((b.approval_score - 0.72).abs() < 1e-9);

    let summary = &run.summary;
    assert_eq!(summary.platform, "douyin");
    assert_eq!(summary.item_count, 2);
    assert_eq!(summary.total_interaction_mass, 10_010);
    assert_eq!(summary.weighting, Weighting::Interaction);
    let expected = (0.36 * 10.0 + 0.72 * 10_000.0) / 10_010.0;
    assert!((summary.platform_score - expected).abs() < 1e-9);
    assert!(summary.platform_score >= a.approval_score);
    assert!(summary.platform_score <= b.approval_score);
    assert_eq!(summary.sentiment.positive, 1);
    assert_eq!(summary.sentiment.negative, 1);
}

#[tokio::test]
async fn pipeline_zero_interaction_batch_uses_plain_mean() {
    let config = ApprovalConfig::default();
    let pipeline = build_pipeline(&config, Arc::new(LexiconAdapter::new()));

    let records = vec![
        douyin_record("a", "0", "推荐 好用"),
        douyin_record("b", "", "垃圾 后悔"),
        douyin_record("c", "n/a", ""),
    ];
    let run = pipeline
        .score_batch(&PlatformProfile::douyin(), &records)
        .await;

    assert_eq!(run.summary.weighting, Weighting::Unweighted);
    let mean = run.items.iter().map(|item| item.approval_score).sum::<f64>() / 3.0;
    assert!((run.summary.platform_score - mean).abs() < 1e-9);
    for item in &run.items {
        assert_eq!(item.total_interaction, 0);
        assert_eq!(item.normalized_engagement, 0.5);
    }
}

#[tokio::test]
async fn pipeline_view_batch_normalizes_ratios() {
    let config = ApprovalConfig::default();
    let pipeline = build_pipeline(&config, Arc::new(LexiconAdapter::new()));

    let bili = |id: &str, likes: &str, plays: &str| {
        RawRecord::new("bilibili", id)
            .with_counter("liked_count", likes)
            .with_counter("video_play_count", plays)
            .with_counter("video_coin_count", "0")
    };
    let records = vec![
        bili("v1", "100", "1000"),
        bili("v2", "50", "500"),
        bili("v3", "0", "0"),
    ];
    let run = pipeline
        .score_batch(&PlatformProfile::bilibili(), &records)
        .await;

    let ranks: Vec<f64> = run.items.iter().map(|item| item.normalized_engagement).collect();
    assert_eq!(ranks[0], ranks[1]);
    assert!(ranks[0] > ranks[2]);
    assert_eq!(ranks[2], 0.0);
    assert!(run.items.iter().all(|item| item.formula == EngagementFormula::ViewRate));

    let min = run.items.iter().map(|i| i.approval_score).fold(f64::INFINITY, f64::min);
    let max = run.items.iter().map(|i| i.approval_score).fold(f64::NEG_INFINITY, f64::max);
    assert!(run.summary.platform_score >= min - 1e-12);
    assert!(run.summary.platform_score <= max + 1e-12);
}

#[test]
fn aggregator_on_empty_items() {
    let summary = PlatformAggregator::new().aggregate("douyin", &[]);
    assert_eq!(summary.item_count, 0);
    assert_eq!(summary.platform_score, 0.0);
    assert_eq!(summary.weighting, Weighting::Empty);
}
