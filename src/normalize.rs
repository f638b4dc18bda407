use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

use crate::scoring::EngagementFormula;
use crate::{NormalizedMetrics, NormalizedRecord, RawCount, RawRecord};

const MAGNITUDE_UNITS: [(char, f64); 6] = [
    ('万', 10_000.0),
    ('w', 10_000.0),
    ('W', 10_000.0),
    ('亿', 100_000_000.0),
    ('千', 1_000.0),
    ('百', 100.0),
];

/// Translation table from a platform's native column names to the canonical
/// counters. A `None` column means the platform does not expose that counter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformProfile {
    pub name: String,
    pub id_column: String,
    pub text_column: String,
    pub fallback_text_column: Option<String>,
    pub likes_column: String,
    pub favorites_column: String,
    pub comments_column: String,
    pub shares_column: String,
    pub views_column: Option<String>,
    pub coins_column: Option<String>,
}

impl PlatformProfile {
    pub fn bilibili() -> Self {
        Self {
            name: "bilibili".to_string(),
            id_column: "video_id".to_string(),
            text_column: "title".to_string(),
            fallback_text_column: Some("desc".to_string()),
            likes_column: "liked_count".to_string(),
            favorites_column: "video_favorite_count".to_string(),
            comments_column: "video_comment".to_string(),
            shares_column: "video_share_count".to_string(),
            views_column: Some("video_play_count".to_string()),
            coins_column: Some("video_coin_count".to_string()),
        }
    }

    pub fn douyin() -> Self {
        Self {
            name: "douyin".to_string(),
            id_column: "aweme_id".to_string(),
            text_column: "title".to_string(),
            fallback_text_column: Some("desc".to_string()),
            likes_column: "liked_count".to_string(),
            favorites_column: "collected_count".to_string(),
            comments_column: "comment_count".to_string(),
            shares_column: "share_count".to_string(),
            views_column: None,
            coins_column: None,
        }
    }

    pub fn formula(&self) -> EngagementFormula {
        if self.views_column.is_some() {
            EngagementFormula::ViewRate
        } else {
            EngagementFormula::PeerInteraction
        }
    }

    pub fn counter_columns(&self) -> Vec<&str> {
        let mut columns = vec![
            self.likes_column.as_str(),
            self.favorites_column.as_str(),
            self.comments_column.as_str(),
            self.shares_column.as_str(),
        ];
        if let Some(views) = self.views_column.as_deref() {
            columns.push(views);
        }
        if let Some(coins) = self.coins_column.as_deref() {
            columns.push(coins);
        }
        columns
    }
}

/// Parses a raw counter into a non-negative integer. Anything that cannot be
/// read as a count becomes 0.
pub fn parse_count(raw: &RawCount) -> u64 {
    match raw {
        RawCount::Number(value) => round_count(*value),
        RawCount::Text(text) => parse_count_str(text),
    }
}

pub fn parse_count_str(text: &str) -> u64 {
    let cleaned: String = text.trim().chars().filter(|ch| *ch != ',').collect();
    if cleaned.is_empty() || cleaned.eq_ignore_ascii_case("nan") {
        return 0;
    }

    if let Ok(value) = cleaned.parse::<f64>() {
        return round_count(value);
    }

    // Scraped counters may carry a prefix such as "约1.2万".
    let Some(start) = cleaned.find(|ch: char| ch.is_ascii_digit()) else {
        debug!(input = text, "unparseable counter, using 0");
        return 0;
    };
    let (number, rest) = split_numeric_prefix(&cleaned[start..]);
    let Ok(value) = number.parse::<f64>() else {
        debug!(input = text, "unparseable counter, using 0");
        return 0;
    };

    let Some(unit) = rest.trim_start().chars().next() else {
        return round_count(value);
    };
    match magnitude(unit) {
        Some(multiplier) => round_count(value * multiplier),
        None => {
            debug!(input = text, "unknown counter suffix, using 0");
            0
        }
    }
}

fn magnitude(unit: char) -> Option<f64> {
    MAGNITUDE_UNITS
        .iter()
        .find(|(candidate, _)| *candidate == unit)
        .map(|(_, multiplier)| *multiplier)
}

fn split_numeric_prefix(value: &str) -> (&str, &str) {
    let mut seen_dot = false;
    let mut end = 0usize;
    for (idx, ch) in value.char_indices() {
        if ch.is_ascii_digit() {
            end = idx + ch.len_utf8();
        } else if ch == '.' && !seen_dot {
            seen_dot = true;
            end = idx + ch.len_utf8();
        } else {
            break;
        }
    }
    value.split_at(end)
}

fn round_count(value: f64) -> u64 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    value.round() as u64
}

/// Maps one raw record onto the canonical counters. Records without an item
/// identifier are dropped.
pub fn normalize_record(record: &RawRecord, profile: &PlatformProfile) -> Option<NormalizedRecord> {
    let item_id = record.item_id.trim();
    if item_id.is_empty() {
        return None;
    }

    let count = |column: &str| record.counter(column).map(parse_count).unwrap_or(0);
    let metrics = NormalizedMetrics {
        likes: count(&profile.likes_column),
        favorites: count(&profile.favorites_column),
        comments: count(&profile.comments_column),
        shares: count(&profile.shares_column),
        views: profile.views_column.as_deref().map(count),
        coins: profile.coins_column.as_deref().map(count),
    };

    Some(NormalizedRecord {
        item_id: item_id.to_string(),
        text: record.text.clone(),
        metrics,
    })
}

/// Normalizes a whole batch, dropping records without an id and repeated ids
/// (the first occurrence wins). Returns the kept records and the drop count.
pub fn normalize_batch(
    records: &[RawRecord],
    profile: &PlatformProfile,
) -> (Vec<NormalizedRecord>, usize) {
    let mut seen = HashSet::new();
    let mut kept = Vec::with_capacity(records.len());
    let mut dropped = 0usize;

    for record in records {
        match normalize_record(record, profile) {
            Some(normalized) if seen.insert(normalized.item_id.clone()) => kept.push(normalized),
            _ => dropped += 1,
        }
    }

    (kept, dropped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_prefix_stops_at_second_dot() {
        assert_eq!(split_numeric_prefix("1.2.3万"), ("1.2", ".3万"));
        assert_eq!(split_numeric_prefix("万"), ("", "万"));
    }

    #[test]
    fn round_count_rejects_negative_and_nan() {
        assert_eq!(round_count(-4.0), 0);
        assert_eq!(round_count(f64::NAN), 0);
        assert_eq!(round_count(2.5), 3);
    }
}
