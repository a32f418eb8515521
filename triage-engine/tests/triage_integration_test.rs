//! Integration tests for the Triage Engine
//!
//! Drives the full select → normalize → classify → resolve → explain flow
//! through the public API with classifier payloads shaped like the real
//! inference endpoint's responses.

use serde_json::json;
use triage_engine::{
    classify, next_step, next_step_for, normalize, rationale, resolve, EmotionSignal, Prediction,
    PriorityTier, TriageEngine,
};

const P2_STEP: &str = "Request clarification or share help article; triage during normal queue.";

/// Test: the worked examples hold through the public functions
#[test]
fn test_component_contracts() {
    let c = classify("Checkout is broken");
    assert_eq!(c.base_tier, PriorityTier::P0);
    assert!(c.high_impact);

    let n = normalize("angry", 0.8);
    assert_eq!(n.signal, EmotionSignal::Frustration);
    assert!(n.confident);
    assert_eq!(
        resolve(PriorityTier::P1, EmotionSignal::Frustration, true, true),
        PriorityTier::P0
    );

    let n = normalize("sad", 0.9);
    assert_eq!(n.signal, EmotionSignal::Uncertain);
    assert!(!n.confident);

    let c = classify("how to reset password");
    assert_eq!(c.base_tier, PriorityTier::P2);
    assert!(!c.high_impact);
    let n = normalize("happy", 0.7);
    assert_eq!(n.signal, EmotionSignal::Positive);
    assert!(n.confident);
    assert_eq!(
        resolve(PriorityTier::P2, n.signal, n.confident, false),
        PriorityTier::P2
    );

    assert_eq!(
        rationale("", EmotionSignal::Frustration, true),
        "Detected high-frustration emotion signal."
    );

    assert_eq!(
        next_step(PriorityTier::P0),
        "Treat as incident: page on-call, confirm scope, start comms if widespread."
    );
    assert_eq!(next_step_for("P9"), P2_STEP);
}

/// Test: a realistic classifier payload with a frustrated face and a
/// high-impact bug report is paged
#[test]
fn test_payload_to_incident() {
    let body = json!([
        {"label": "angry", "score": 0.71},
        {"label": "neutral", "score": 0.12},
        {"label": "sad", "score": 0.09},
        {"label": "fear", "score": 0.05},
        {"label": "happy", "score": 0.03}
    ]);
    let preds = Prediction::from_json(&body);
    let r = TriageEngine::new().triage(&preds, "Payment page error after update");

    assert_eq!(r.keywords.base_tier, PriorityTier::P1);
    assert!(r.keywords.high_impact);
    assert_eq!(r.priority, PriorityTier::P0);
    assert_eq!(r.emotion.label, "angry");
}

/// Test: a calm face does not move a plain question
#[test]
fn test_neutral_face_question() {
    let preds = vec![Prediction::new("neutral", 0.93), Prediction::new("happy", 0.04)];
    let r = TriageEngine::new().triage(&preds, "Question about invoices");

    assert_eq!(r.priority, PriorityTier::P2);
    assert_eq!(r.emotion.signal, EmotionSignal::Neutral);
    assert_eq!(r.rationale, "Used text context keywords.");
    assert_eq!(r.next_step, P2_STEP);
}

/// Test: frustration with no text escalates P2 to P1
#[test]
fn test_frustration_without_text() {
    let r = TriageEngine::new().triage(&[Prediction::new("DISGUST", 0.88)], "");
    assert_eq!(r.priority, PriorityTier::P1);
    assert_eq!(r.rationale, "Detected high-frustration emotion signal.");
    assert_eq!(
        r.next_step,
        "Create a bug ticket, assign an owner, request repro steps and logs."
    );
}

/// Test: an error object from the inference endpoint degrades to defaults
#[test]
fn test_malformed_payload_defaults() {
    let preds = Prediction::from_json(&json!({"error": "Model is loading", "estimated_time": 20}));
    let r = TriageEngine::new().triage(&preds, "site is down");

    assert_eq!(r.emotion.label, "neutral");
    assert_eq!(r.emotion.score, 0.0);
    assert_eq!(r.emotion.signal, EmotionSignal::Uncertain);
    assert_eq!(r.priority, PriorityTier::P0);
}

/// Test: the engine result serializes with stable tier and signal names
#[test]
fn test_result_serialization() {
    let r = TriageEngine::new().triage(&[Prediction::new("fear", 0.61)], "slow dashboard");
    let v = serde_json::to_value(&r).unwrap();
    assert_eq!(v["priority"], "P1");
    assert_eq!(v["emotion"]["signal"], "frustration");
    assert_eq!(v["resolution"]["base_tier"], "P1");
}
