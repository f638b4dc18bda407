use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::normalize::PlatformProfile;
use crate::scoring::ApprovalWeights;
use crate::sentiment::SentimentThresholds;

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentimentBackend {
    Lexicon,
    Http,
}

impl SentimentBackend {
    pub fn label(self) -> &'static str {
        match self {
            SentimentBackend::Lexicon => "lexicon",
            SentimentBackend::Http => "http",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SentimentConfig {
    pub backend: String,
    pub endpoint: String,
    pub timeout_ms: u64,
    pub max_retries: u32,
    pub concurrency: usize,
    pub min_text_chars: usize,
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self {
            backend: "lexicon".to_string(),
            endpoint: "http://localhost:8000".to_string(),
            timeout_ms: 5000,
            max_retries: 2,
            concurrency: 8,
            min_text_chars: 2,
        }
    }
}

impl SentimentConfig {
    pub fn to_backend(&self) -> SentimentBackend {
        match self.backend.trim().to_lowercase().as_str() {
            "http" | "remote" => SentimentBackend::Http,
            _ => SentimentBackend::Lexicon,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApprovalConfig {
    pub weights: ApprovalWeights,
    pub thresholds: SentimentThresholds,
    pub sentiment: SentimentConfig,
    pub platforms: Vec<PlatformProfile>,
}

impl Default for ApprovalConfig {
    fn default() -> Self {
        Self {
            weights: ApprovalWeights::default(),
            thresholds: SentimentThresholds::default(),
            sentiment: SentimentConfig::default(),
            platforms: vec![PlatformProfile::bilibili(), PlatformProfile::douyin()],
        }
    }
}

impl ApprovalConfig {
    /// Loads the config once at start-up: explicit path, then
    /// `APPROVAL_CONFIG_PATH`, then `config/approval.toml`. A missing file means
    /// defaults. Environment overrides apply last, then the result is validated.
    pub fn load(path: Option<PathBuf>) -> Result<(Self, Option<PathBuf>)> {
        let config_path = path.or_else(default_config_path);
        let mut config = match config_path.as_ref() {
            Some(path) if path.exists() => {
                let contents = std::fs::read_to_string(path)
                    .map_err(|err| Error::Config(format!("failed to read config: {}", err)))?;
                toml::from_str(&contents)?
            }
            _ => ApprovalConfig::default(),
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok((config, config_path))
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let payload = toml::to_string_pretty(self)?;
        std::fs::write(path, payload)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let ApprovalWeights { alpha, beta } = self.weights;
        if !(0.0..=1.0).contains(&alpha) || !(0.0..=1.0).contains(&beta) {
            return Err(Error::Config(format!(
                "weights must lie in [0, 1] (alpha={}, beta={})",
                alpha, beta
            )));
        }
        if ((alpha + beta) - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(Error::Config(format!(
                "alpha + beta must equal 1 (got {})",
                alpha + beta
            )));
        }

        let SentimentThresholds { positive, negative } = self.thresholds;
        if !(0.0..=1.0).contains(&positive) || !(0.0..=1.0).contains(&negative) {
            return Err(Error::Config(
                "sentiment thresholds must lie in [0, 1]".to_string(),
            ));
        }
        if negative > positive {
            return Err(Error::Config(format!(
                "negative threshold {} exceeds positive threshold {}",
                negative, positive
            )));
        }

        if self.sentiment.timeout_ms == 0 {
            return Err(Error::Config(
                "sentiment timeout_ms must be at least 1".to_string(),
            ));
        }
        if self.sentiment.concurrency == 0 {
            return Err(Error::Config(
                "sentiment concurrency must be at least 1".to_string(),
            ));
        }

        for (idx, profile) in self.platforms.iter().enumerate() {
            if profile.name.trim().is_empty() {
                return Err(Error::Config(format!("platform #{} has no name", idx)));
            }
            if self.platforms[..idx]
                .iter()
                .any(|other| other.name.eq_ignore_ascii_case(&profile.name))
            {
                return Err(Error::Config(format!(
                    "platform {} is configured twice",
                    profile.name
                )));
            }
        }

        Ok(())
    }

    pub fn profile(&self, name: &str) -> Result<&PlatformProfile> {
        self.platforms
            .iter()
            .find(|profile| profile.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| Error::UnknownPlatform(name.to_string()))
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(alpha) = env::var("APPROVAL_ALPHA") {
            if let Ok(value) = alpha.parse::<f64>() {
                self.weights.alpha = value;
            }
        }
        if let Ok(beta) = env::var("APPROVAL_BETA") {
            if let Ok(value) = beta.parse::<f64>() {
                self.weights.beta = value;
            }
        }
        if let Ok(backend) = env::var("SENTIMENT_BACKEND") {
            if !backend.trim().is_empty() {
                self.sentiment.backend = backend;
            }
        }
        if let Ok(endpoint) = env::var("SENTIMENT_ENDPOINT") {
            if !endpoint.trim().is_empty() {
                self.sentiment.endpoint = endpoint;
            }
        }
        if let Ok(timeout) = env::var("SENTIMENT_TIMEOUT_MS") {
            if let Ok(value) = timeout.parse::<u64>() {
                self.sentiment.timeout_ms = value;
            }
        }
        if let Ok(concurrency) = env::var("SENTIMENT_CONCURRENCY") {
            if let Ok(value) = concurrency.parse::<usize>() {
                self.sentiment.concurrency = value;
            }
        }
    }
}

fn default_config_path() -> Option<PathBuf> {
    env::var("APPROVAL_CONFIG_PATH")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
        .or_else(|| Some(PathBuf::from("config/approval.toml")))
}
