pub mod aggregate;
pub mod approval;
pub mod engagement;
pub mod percentile;
pub mod pipeline;

pub use aggregate::{
    weighted_approval, BatchStats, LabelCounts, PlatformAggregator, PlatformSummary, Weighting,
};
pub use approval::{ApprovalComposer, ApprovalWeights};
pub use engagement::{EngagementFormula, EngagementScore, EngagementScorer};
pub use percentile::{CollectedBatch, PercentileNormalizer};
pub use pipeline::{ApprovalPipeline, ItemScore, PlatformRun};
