//! Wire contracts for the HTTP API.
//!
//! Field names are camelCase on the wire; the web client depends on these
//! exact shapes.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::time::Duration;
use triage_engine::{EmotionSignal, PriorityTier, TriageResult};

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

/// `{ok: false, error: {code, message}}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub ok: bool,
    pub error: ErrorBody,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
        }
    }
}

// ============================================================================
// POST /presign
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignRequest {
    #[serde(default)]
    pub content_type: Option<String>,
}

/// Headers the client must send with the upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequiredHeaders {
    #[serde(rename = "Content-Type")]
    pub content_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignResponse {
    pub ok: bool,
    pub upload_url: String,
    pub key: String,
    pub expires_in_sec: u64,
    pub required_headers: RequiredHeaders,
}

// ============================================================================
// PUT /upload/*key
// ============================================================================

/// Query string of a signed upload URL. Fields are optional so a mangled
/// URL is reported as a rejected upload rather than a routing error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UploadQuery {
    pub expires: Option<String>,
    pub signature: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub ok: bool,
    pub key: String,
}

// ============================================================================
// POST /analyze
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub key: Option<String>,
    /// Scalars are accepted and rendered as text (`500` reads as `"500"`).
    #[serde(default, deserialize_with = "scalar_as_text")]
    pub text_context: Option<String>,
}

fn scalar_as_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        other => Err(D::Error::custom(format!(
            "textContext must be a string, number or boolean, got {other}"
        ))),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotionView {
    pub label: String,
    /// Rounded to three decimals
    pub score: f64,
    pub signal: EmotionSignal,
}

/// Per-stage elapsed time in milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingsMs {
    pub total: u64,
    /// Object fetch only
    #[serde(rename = "s3Get")]
    pub storage: u64,
    /// Metadata lookup plus the classifier call
    #[serde(rename = "hfCall")]
    pub classifier: u64,
    pub rules: u64,
}

impl TimingsMs {
    pub fn from_durations(
        total: Duration,
        storage: Duration,
        classifier: Duration,
        rules: Duration,
    ) -> Self {
        let ms = |d: Duration| d.as_millis() as u64;
        Self {
            total: ms(total),
            storage: ms(storage),
            classifier: ms(classifier),
            rules: ms(rules),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeMeta {
    pub model: String,
    pub received_text_context: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub ok: bool,
    pub priority: PriorityTier,
    pub emotion: EmotionView,
    pub rationale: String,
    pub next_step: String,
    pub timings_ms: TimingsMs,
    pub meta: AnalyzeMeta,
}

impl AnalyzeResponse {
    pub fn from_result(
        result: TriageResult,
        timings_ms: TimingsMs,
        model: impl Into<String>,
        received_text_context: bool,
    ) -> Self {
        Self {
            ok: true,
            priority: result.priority,
            emotion: EmotionView {
                label: result.emotion.label,
                score: round3(result.emotion.score),
                signal: result.emotion.signal,
            },
            rationale: result.rationale,
            next_step: result.next_step.to_string(),
            timings_ms,
            meta: AnalyzeMeta {
                model: model.into(),
                received_text_context,
            },
        }
    }
}

// ============================================================================
// GET /health
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub model: String,
}

fn round3(n: f64) -> f64 {
    (n * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use triage_engine::{Prediction, TriageEngine};

    #[test]
    fn test_analyze_response_wire_shape() {
        let result = TriageEngine::new().triage(&[Prediction::new("angry", 0.87654)], "checkout");
        let timings = TimingsMs::from_durations(
            Duration::from_millis(120),
            Duration::from_millis(15),
            Duration::from_millis(100),
            Duration::from_micros(30),
        );
        let resp = AnalyzeResponse::from_result(result, timings, "m", true);
        let v = serde_json::to_value(&resp).unwrap();

        assert_eq!(v["priority"], "P0");
        assert_eq!(v["emotion"]["score"], 0.877);
        assert_eq!(v["emotion"]["signal"], "frustration");
        assert_eq!(
            v["timingsMs"],
            json!({"total": 120, "s3Get": 15, "hfCall": 100, "rules": 0})
        );
        assert_eq!(v["meta"]["receivedTextContext"], true);
        assert!(v["nextStep"].as_str().unwrap().starts_with("Treat as incident"));
    }

    #[test]
    fn test_presign_response_headers_key() {
        let resp = PresignResponse {
            ok: true,
            upload_url: "u".into(),
            key: "k".into(),
            expires_in_sec: 300,
            required_headers: RequiredHeaders {
                content_type: "image/png".into(),
            },
        };
        let v = serde_json::to_value(&resp).unwrap();
        assert_eq!(v["requiredHeaders"]["Content-Type"], "image/png");
        assert_eq!(v["expiresInSec"], 300);
    }

    #[test]
    fn test_analyze_request_defaults() {
        let req: AnalyzeRequest = serde_json::from_str("{}").unwrap();
        assert!(req.key.is_none());
        assert!(req.text_context.is_none());

        let req: AnalyzeRequest =
            serde_json::from_str(r#"{"key":"uploads/a.png","textContext":"slow"}"#).unwrap();
        assert_eq!(req.text_context.as_deref(), Some("slow"));
    }

    #[test]
    fn test_analyze_request_scalar_text_context() {
        let req: AnalyzeRequest = serde_json::from_str(r#"{"textContext":500}"#).unwrap();
        assert_eq!(req.text_context.as_deref(), Some("500"));

        let req: AnalyzeRequest = serde_json::from_str(r#"{"textContext":true}"#).unwrap();
        assert_eq!(req.text_context.as_deref(), Some("true"));

        let req: AnalyzeRequest = serde_json::from_str(r#"{"textContext":null}"#).unwrap();
        assert!(req.text_context.is_none());

        assert!(serde_json::from_str::<AnalyzeRequest>(r#"{"textContext":["down"]}"#).is_err());
        assert!(serde_json::from_str::<AnalyzeRequest>(r#"{"textContext":{"a":1}}"#).is_err());
    }
}
