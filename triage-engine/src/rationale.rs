//! Rationale & next-step text for a triage decision.

use crate::priority::PriorityTier;
use crate::signal::EmotionSignal;

const KEYWORDS_USED: &str = "Used text context keywords.";
const HIGH_FRUSTRATION: &str = "Detected high-frustration emotion signal.";
const LOW_CONFIDENCE: &str = "Emotion confidence low; treated as uncertain.";

const NEXT_STEP_P0: &str =
    "Treat as incident: page on-call, confirm scope, start comms if widespread.";
const NEXT_STEP_P1: &str = "Create a bug ticket, assign an owner, request repro steps and logs.";
const NEXT_STEP_DEFAULT: &str =
    "Request clarification or share help article; triage during normal queue.";

/// Explain which inputs drove the decision.
///
/// Clauses are appended in a fixed order and space-joined; the result is
/// empty when none apply.
pub fn rationale(text: &str, signal: EmotionSignal, confident: bool) -> String {
    let mut parts = Vec::with_capacity(2);

    if !text.trim().is_empty() {
        parts.push(KEYWORDS_USED);
    }
    if confident && signal == EmotionSignal::Frustration {
        parts.push(HIGH_FRUSTRATION);
    }
    if !confident {
        parts.push(LOW_CONFIDENCE);
    }

    parts.join(" ")
}

/// Recommended action for a priority.
pub fn next_step(priority: PriorityTier) -> &'static str {
    match priority {
        PriorityTier::P0 => NEXT_STEP_P0,
        PriorityTier::P1 => NEXT_STEP_P1,
        PriorityTier::P2 => NEXT_STEP_DEFAULT,
    }
}

/// [`next_step`] for a priority given as text; unrecognized values get the
/// normal-queue action.
pub fn next_step_for(priority: &str) -> &'static str {
    priority
        .parse::<PriorityTier>()
        .map(next_step)
        .unwrap_or(NEXT_STEP_DEFAULT)
}
