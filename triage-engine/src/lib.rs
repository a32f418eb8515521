//! Support Triage Engine
//!
//! Turns the raw output of an image emotion classifier plus the free-text
//! context a customer typed into a ticket priority, a rationale, and a
//! recommended next step. Everything here is pure and synchronous, and
//! malformed classifier output degrades to a neutral default instead of
//! failing.
//!
//! # Pipeline
//!
//! ```text
//! predictions ──► select_top ──► normalize ──► (signal, confident) ─┐
//!                                                                  ├─► resolve ──► priority ──► next_step
//! text ─────────► classify ──► (base_tier, high_impact) ───────────┘
//!                                                                  └─► rationale
//! ```
//!
//! # Usage
//!
//! ```
//! use triage_engine::{Prediction, PriorityTier, TriageEngine};
//!
//! let engine = TriageEngine::new();
//! let preds = vec![Prediction::new("angry", 0.82), Prediction::new("sad", 0.1)];
//! let result = engine.triage(&preds, "Login page is broken for everyone");
//! assert_eq!(result.priority, PriorityTier::P0);
//! ```

pub mod engine;
pub mod keywords;
pub mod priority;
pub mod rationale;
pub mod signal;

pub use engine::{ConfigError, EmotionSummary, TriageConfig, TriageEngine, TriageResult};
pub use keywords::{classify, KeywordClassification};
pub use priority::{resolve, EscalationRule, PriorityTier, Resolution};
pub use rationale::{next_step, next_step_for, rationale};
pub use signal::{
    normalize, normalize_with_threshold, select_top, ClassificationResult, EmotionLabel,
    EmotionSignal, NormalizedSignal, Prediction, DEFAULT_CONFIDENCE_THRESHOLD,
};
