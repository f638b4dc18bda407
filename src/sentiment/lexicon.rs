use async_trait::async_trait;

use crate::error::Result;
use crate::sentiment::{SentimentAdapter, NEUTRAL_SENTIMENT};

const POSITIVE_KW: &[&str] = &[
    "好用", "推荐", "喜欢", "支持", "厉害", "优秀", "完美", "满意", "流畅", "惊艳", "值得",
    "加油", "太棒", "牛", "赞", "良心", "稳定", "漂亮", "强大", "good", "great", "love",
    "awesome", "excellent", "amazing", "recommend", "perfect", "nice", "impressive",
];

const NEGATIVE_KW: &[&str] = &[
    "不好", "不值", "垃圾", "后悔", "太贵", "失望", "卡顿", "难用", "发热", "差评", "翻车",
    "坑", "烂", "退货", "bad", "terrible", "awful", "worst", "hate", "disappointed",
    "overpriced", "laggy", "broken", "regret",
];

/// Keyword-count scorer for running without an inference service.
///
/// Negative phrases are matched first and blanked out so that e.g. "不好用"
/// does not also count as "好用".
#[derive(Debug, Clone, Default)]
pub struct LexiconAdapter;

impl LexiconAdapter {
    pub fn new() -> Self {
        Self
    }

    pub fn score_sync(&self, text: &str) -> f64 {
        let mut remaining = text.to_lowercase();

        let mut negative = 0usize;
        for keyword in NEGATIVE_KW {
            let hits = remaining.matches(*keyword).count();
            if hits > 0 {
                negative += hits;
                remaining = remaining.replace(*keyword, " ");
            }
        }

        let positive: usize = POSITIVE_KW
            .iter()
            .map(|keyword| remaining.matches(*keyword).count())
            .sum();

        if positive + negative == 0 {
            return NEUTRAL_SENTIMENT;
        }

        let balance = positive as f64 - negative as f64;
        let evidence = (positive + negative) as f64 + 1.0;
        (NEUTRAL_SENTIMENT + 0.5 * balance / evidence).clamp(0.0, 1.0)
    }
}

#[async_trait]
impl SentimentAdapter for LexiconAdapter {
    fn name(&self) -> &str {
        "lexicon"
    }

    async fn score(&self, text: &str) -> Result<f64> {
        Ok(self.score_sync(text))
    }
}
