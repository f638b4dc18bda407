use std::cmp::Ordering;

/// Rank-based normalization of one platform batch.
///
/// Ranking is a barrier: every value of the batch has to be collected before
/// any rank exists, so the API is `collect` followed by a consuming `rank`.
#[derive(Debug, Clone, Default)]
pub struct PercentileNormalizer;

impl PercentileNormalizer {
    pub fn new() -> Self {
        Self
    }

    pub fn collect<I>(&self, values: I) -> CollectedBatch
    where
        I: IntoIterator<Item = f64>,
    {
        let values = values
            .into_iter()
            .map(|value| if value.is_nan() { 0.0 } else { value })
            .collect();
        CollectedBatch { values }
    }
}

#[derive(Debug, Clone)]
pub struct CollectedBatch {
    values: Vec<f64>,
}

impl CollectedBatch {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Percentile rank of every value against the other values of the batch:
    /// the share strictly below it plus half the share equal to it. Output
    /// order matches input order. A lone item, or a batch of identical values,
    /// ranks 0.5.
    pub fn rank(self) -> Vec<f64> {
        let n = self.values.len();
        if n == 0 {
            return Vec::new();
        }
        if n == 1 {
            return vec![0.5];
        }

        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| {
            self.values[a]
                .partial_cmp(&self.values[b])
                .unwrap_or(Ordering::Equal)
        });

        let peers = (n - 1) as f64;
        let mut ranks = vec![0.0; n];
        let mut start = 0usize;
        while start < n {
            let value = self.values[order[start]];
            let mut end = start + 1;
            while end < n && self.values[order[end]] == value {
                end += 1;
            }

            let below = start as f64;
            let equal_peers = (end - start - 1) as f64;
            let rank = (below + 0.5 * equal_peers) / peers;
            for &idx in &order[start..end] {
                ranks[idx] = rank;
            }
            start = end;
        }

        ranks
    }
}
