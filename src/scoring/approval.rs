use serde::{Deserialize, Serialize};

use crate::clamp01;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalWeights {
    pub alpha: f64,
    pub beta: f64,
}

impl Default for ApprovalWeights {
    fn default() -> Self {
        Self {
            alpha: 0.6,
            beta: 0.4,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApprovalComposer {
    weights: ApprovalWeights,
}

impl ApprovalComposer {
    pub fn new(weights: ApprovalWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &ApprovalWeights {
        &self.weights
    }

    /// `alpha * engagement + beta * sentiment`, clamped to [0, 1]. Inputs are
    /// clamped first since sentiment comes from outside the pipeline.
    pub fn compose(&self, normalized_engagement: f64, sentiment: f64) -> f64 {
        let engagement = clamp01(normalized_engagement);
        let sentiment = clamp01(sentiment);
        clamp01(self.weights.alpha * engagement + self.weights.beta * sentiment)
    }
}
