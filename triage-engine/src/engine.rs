//! Triage Orchestrator: single entry point for a triage decision
//!
//! Sequences normalizer → keyword classifier → priority resolver →
//! rationale builder. The engine holds only its immutable config and is
//! shared across requests.

use crate::keywords::{classify, KeywordClassification};
use crate::priority::{PriorityTier, Resolution};
use crate::rationale::{next_step, rationale};
use crate::signal::{
    normalize_with_threshold, select_top, EmotionSignal, Prediction,
    DEFAULT_CONFIDENCE_THRESHOLD,
};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("confidence threshold must be in (0, 1], got {0}")]
    InvalidThreshold(f64),
}

/// Configuration for the Triage Engine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TriageConfig {
    /// Minimum classifier score for a mapped signal to count as confident
    pub confidence_threshold: f64,
}

impl TriageConfig {
    pub fn with_threshold(confidence_threshold: f64) -> Result<Self, ConfigError> {
        let config = Self {
            confidence_threshold,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = self.confidence_threshold;
        if t.is_finite() && t > 0.0 && t <= 1.0 {
            Ok(())
        } else {
            Err(ConfigError::InvalidThreshold(t))
        }
    }
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }
}

/// Emotion part of a triage result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmotionSummary {
    /// Lower-cased top label as the classifier reported it
    pub label: String,
    pub score: f64,
    pub signal: EmotionSignal,
    pub confident: bool,
}

/// Decision produced by the Triage Engine
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriageResult {
    pub priority: PriorityTier,
    pub emotion: EmotionSummary,
    pub rationale: String,
    pub next_step: &'static str,
    /// Keyword tier and high-impact flag the priority was derived from
    pub keywords: KeywordClassification,
    /// Which escalation rule, if any, moved the base tier
    pub resolution: Resolution,
}

/// The Triage Engine
#[derive(Debug, Clone, Default)]
pub struct TriageEngine {
    config: TriageConfig,
}

impl TriageEngine {
    /// Create a new engine with default config
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom config
    pub fn with_config(config: TriageConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Triage one request.
    ///
    /// `predictions` is the unordered classifier output; an empty list is
    /// treated as `{neutral, 0}`. `text` may be empty.
    pub fn triage(&self, predictions: &[Prediction], text: &str) -> TriageResult {
        let top = select_top(predictions);
        let normalized =
            normalize_with_threshold(&top.label, top.score, self.config.confidence_threshold);

        let keywords = classify(text);
        let resolution = Resolution::evaluate(
            keywords.base_tier,
            normalized.signal,
            normalized.confident,
            keywords.high_impact,
        );

        debug!(
            label = %top.label,
            score = top.score,
            signal = %normalized.signal,
            confident = normalized.confident,
            base_tier = %keywords.base_tier,
            high_impact = keywords.high_impact,
            matched = ?keywords.matched,
            priority = %resolution.priority,
            rule = ?resolution.rule,
            "triage decision"
        );

        TriageResult {
            priority: resolution.priority,
            emotion: EmotionSummary {
                label: top.label,
                score: top.score,
                signal: normalized.signal,
                confident: normalized.confident,
            },
            rationale: rationale(text, normalized.signal, normalized.confident),
            next_step: next_step(resolution.priority),
            keywords,
            resolution,
        }
    }

    /// [`triage`](Self::triage) plus the time spent evaluating rules.
    pub fn triage_timed(&self, predictions: &[Prediction], text: &str) -> (TriageResult, Duration) {
        let start = Instant::now();
        let result = self.triage(predictions, text);
        (result, start.elapsed())
    }
}
