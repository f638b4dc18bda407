use serde::{Deserialize, Serialize};

use crate::NormalizedMetrics;

/// How a platform's raw engagement is measured. Selected by whether the
/// platform reports view counts, never by platform name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementFormula {
    /// `(likes + favorites + comments + shares + coins) / views`
    ViewRate,
    /// Total interaction; scaling against peers happens at percentile ranking.
    PeerInteraction,
}

impl EngagementFormula {
    pub fn for_metrics(metrics: &NormalizedMetrics) -> Self {
        if metrics.views.is_some() {
            EngagementFormula::ViewRate
        } else {
            EngagementFormula::PeerInteraction
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EngagementFormula::ViewRate => "view_rate",
            EngagementFormula::PeerInteraction => "peer_interaction",
        }
    }

    pub fn raw_er(self, metrics: &NormalizedMetrics) -> f64 {
        match self {
            EngagementFormula::ViewRate => view_rate(metrics),
            EngagementFormula::PeerInteraction => peer_interaction(metrics),
        }
    }
}

fn view_rate(metrics: &NormalizedMetrics) -> f64 {
    let views = metrics.views.unwrap_or(0);
    if views == 0 {
        return 0.0;
    }
    metrics.total_engagement() as f64 / views as f64
}

fn peer_interaction(metrics: &NormalizedMetrics) -> f64 {
    metrics.total_interaction() as f64
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EngagementScore {
    pub raw_er: f64,
    pub total_interaction: u64,
    pub formula: EngagementFormula,
}

#[derive(Debug, Clone, Default)]
pub struct EngagementScorer;

impl EngagementScorer {
    pub fn new() -> Self {
        Self
    }

    pub fn score(&self, metrics: &NormalizedMetrics) -> EngagementScore {
        let formula = EngagementFormula::for_metrics(metrics);
        EngagementScore {
            raw_er: formula.raw_er(metrics),
            total_interaction: metrics.total_interaction(),
            formula,
        }
    }
}
