//! Signal Normalizer: raw classifier output to a coarse emotion signal
//!
//! The classifier speaks in fine-grained facial-expression labels with a
//! probability each. Triage only cares about a handful of coarse signals and
//! whether the classifier was sure enough to trust them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Score at or above which a mapped signal is trusted.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.6;

/// Labels emitted by the facial-expression classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmotionLabel {
    Angry,
    Disgust,
    Fear,
    Happy,
    Sad,
    Surprise,
    Neutral,
}

impl EmotionLabel {
    pub const ALL: [EmotionLabel; 7] = [
        Self::Angry,
        Self::Disgust,
        Self::Fear,
        Self::Happy,
        Self::Sad,
        Self::Surprise,
        Self::Neutral,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Angry => "angry",
            Self::Disgust => "disgust",
            Self::Fear => "fear",
            Self::Happy => "happy",
            Self::Sad => "sad",
            Self::Surprise => "surprise",
            Self::Neutral => "neutral",
        }
    }

    /// Case-insensitive lookup. `None` for anything outside the vocabulary.
    pub fn parse(raw: &str) -> Option<Self> {
        let lower = raw.trim().to_lowercase();
        Self::ALL.into_iter().find(|l| l.as_str() == lower)
    }

    /// Base signal before the confidence gate is applied.
    pub fn signal(&self) -> EmotionSignal {
        match self {
            Self::Angry | Self::Disgust | Self::Fear => EmotionSignal::Frustration,
            Self::Happy => EmotionSignal::Positive,
            Self::Sad | Self::Surprise => EmotionSignal::Uncertain,
            Self::Neutral => EmotionSignal::Neutral,
        }
    }
}

impl std::fmt::Display for EmotionLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse emotional category used by the priority rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmotionSignal {
    Frustration,
    Neutral,
    Positive,
    Uncertain,
}

impl EmotionSignal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Frustration => "frustration",
            Self::Neutral => "neutral",
            Self::Positive => "positive",
            Self::Uncertain => "uncertain",
        }
    }
}

impl std::fmt::Display for EmotionSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of [`normalize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedSignal {
    pub signal: EmotionSignal,
    pub confident: bool,
}

impl NormalizedSignal {
    const UNCERTAIN: Self = Self {
        signal: EmotionSignal::Uncertain,
        confident: false,
    };
}

/// One (label, score) entry as returned by the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: String,
    pub score: f64,
}

impl Prediction {
    pub fn new(label: impl Into<String>, score: f64) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }

    /// Lenient decode of a classifier response body.
    ///
    /// Accepts a flat list of `{label, score}` objects or the same list nested
    /// one level deep. Entries with a non-string label get an empty label,
    /// entries with a missing or non-numeric score get 0. Anything else
    /// decodes to an empty list.
    pub fn from_json(value: &Value) -> Vec<Prediction> {
        let Value::Array(items) = value else {
            return Vec::new();
        };

        let flattened: Vec<&Value> = if items.iter().all(Value::is_array) {
            items
                .iter()
                .filter_map(Value::as_array)
                .flat_map(|inner| inner.iter())
                .collect()
        } else {
            items.iter().collect()
        };

        flattened
            .into_iter()
            .filter(|v| v.is_object())
            .map(|v| Prediction {
                label: v
                    .get("label")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                score: v.get("score").and_then(Value::as_f64).unwrap_or(0.0),
            })
            .collect()
    }
}

/// The single prediction triage acts on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Lower-cased label; may be outside [`EmotionLabel`].
    pub label: String,
    /// Sanitized score in `[0, 1]`.
    pub score: f64,
}

impl Default for ClassificationResult {
    fn default() -> Self {
        Self {
            label: EmotionLabel::Neutral.as_str().to_string(),
            score: 0.0,
        }
    }
}

fn sanitize_score(score: f64) -> f64 {
    if score.is_finite() {
        score.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Pick the entry with the strictly greatest score; the first one wins ties.
///
/// An empty list yields `{neutral, 0}`.
pub fn select_top(predictions: &[Prediction]) -> ClassificationResult {
    let Some(first) = predictions.first() else {
        return ClassificationResult::default();
    };

    let mut best = first;
    let mut best_score = sanitize_score(first.score);
    for p in &predictions[1..] {
        let score = sanitize_score(p.score);
        if score > best_score {
            best = p;
            best_score = score;
        }
    }

    ClassificationResult {
        label: best.label.trim().to_lowercase(),
        score: best_score,
    }
}

/// Normalize with the default threshold of 0.6.
pub fn normalize(label: &str, score: f64) -> NormalizedSignal {
    normalize_with_threshold(label, score, DEFAULT_CONFIDENCE_THRESHOLD)
}

/// Map a (label, score) pair to a signal and a confidence flag.
///
/// Unknown labels, scores below `threshold`, and labels whose base signal is
/// already uncertain all come back as `{uncertain, false}`.
pub fn normalize_with_threshold(label: &str, score: f64, threshold: f64) -> NormalizedSignal {
    let Some(label) = EmotionLabel::parse(label) else {
        return NormalizedSignal::UNCERTAIN;
    };

    let signal = label.signal();
    if signal == EmotionSignal::Uncertain || sanitize_score(score) < threshold {
        return NormalizedSignal::UNCERTAIN;
    }

    NormalizedSignal {
        signal,
        confident: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_frustration_labels_confident_above_threshold() {
        for label in ["angry", "disgust", "fear"] {
            let n = normalize(label, 0.6);
            assert_eq!(n.signal, EmotionSignal::Frustration, "{label}");
            assert!(n.confident);
        }
        assert_eq!(
            normalize("angry", 0.8),
            NormalizedSignal {
                signal: EmotionSignal::Frustration,
                confident: true
            }
        );
    }

    #[test]
    fn test_low_score_collapses_to_uncertain() {
        for label in ["angry", "happy", "neutral", "sad", "bogus"] {
            assert_eq!(normalize(label, 0.59), NormalizedSignal::UNCERTAIN, "{label}");
        }
    }

    #[test]
    fn test_sad_and_surprise_never_confident() {
        assert_eq!(normalize("sad", 0.9), NormalizedSignal::UNCERTAIN);
        assert_eq!(normalize("surprise", 1.0), NormalizedSignal::UNCERTAIN);
    }

    #[test]
    fn test_label_lookup_is_case_insensitive() {
        assert_eq!(normalize("HAPPY", 0.7).signal, EmotionSignal::Positive);
        assert_eq!(normalize(" Neutral ", 0.95).signal, EmotionSignal::Neutral);
        assert_eq!(EmotionLabel::parse("Fear"), Some(EmotionLabel::Fear));
        assert_eq!(EmotionLabel::parse("contempt"), None);
    }

    #[test]
    fn test_unknown_or_empty_label() {
        assert_eq!(normalize("", 0.99), NormalizedSignal::UNCERTAIN);
        assert_eq!(normalize("contempt", 0.99), NormalizedSignal::UNCERTAIN);
    }

    #[test]
    fn test_nan_score_is_not_confident() {
        assert_eq!(normalize("angry", f64::NAN), NormalizedSignal::UNCERTAIN);
    }

    #[test]
    fn test_custom_threshold() {
        assert!(normalize_with_threshold("happy", 0.5, 0.4).confident);
        assert!(!normalize_with_threshold("happy", 0.7, 0.8).confident);
    }

    #[test]
    fn test_select_top_picks_max_first_wins_ties() {
        let preds = vec![
            Prediction::new("sad", 0.2),
            Prediction::new("Angry", 0.4),
            Prediction::new("fear", 0.4),
            Prediction::new("happy", 0.1),
        ];
        let top = select_top(&preds);
        assert_eq!(top.label, "angry");
        assert_eq!(top.score, 0.4);
    }

    #[test]
    fn test_select_top_empty_defaults_to_neutral() {
        assert_eq!(select_top(&[]), ClassificationResult::default());
        assert_eq!(ClassificationResult::default().label, "neutral");
    }

    #[test]
    fn test_select_top_sanitizes_scores() {
        let top = select_top(&[Prediction::new("angry", f64::NAN), Prediction::new("sad", 0.1)]);
        assert_eq!(top.label, "sad");
        let top = select_top(&[Prediction::new("happy", 3.0)]);
        assert_eq!(top.score, 1.0);
    }

    #[test]
    fn test_from_json_flat_and_nested() {
        let flat = json!([{"label": "angry", "score": 0.9}, {"label": "sad", "score": 0.1}]);
        assert_eq!(Prediction::from_json(&flat).len(), 2);

        let nested = json!([[{"label": "happy", "score": 0.7}]]);
        let preds = Prediction::from_json(&nested);
        assert_eq!(preds, vec![Prediction::new("happy", 0.7)]);
    }

    #[test]
    fn test_from_json_malformed() {
        assert!(Prediction::from_json(&json!({"error": "loading"})).is_empty());
        assert!(Prediction::from_json(&json!(null)).is_empty());

        let partial = Prediction::from_json(&json!([{"score": "x"}, 4, {"label": "fear"}]));
        assert_eq!(
            partial,
            vec![Prediction::new("", 0.0), Prediction::new("fear", 0.0)]
        );
    }
}
