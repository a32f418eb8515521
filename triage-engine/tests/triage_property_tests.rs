//! Property tests: randomized validation of triage invariants.
//!
//! Tests verify:
//! - Low scores are never confident, whatever the label
//! - Frustration labels above threshold are always confident frustration
//! - Keyword classification ignores case and is idempotent
//! - Escalation never lowers urgency
//! - Top selection returns the maximum score, first occurrence on ties

use proptest::prelude::*;
use triage_engine::{
    classify, normalize, resolve, select_top, EmotionSignal, Prediction, PriorityTier,
    TriageEngine,
};

fn any_label() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("angry".to_string()),
        Just("disgust".to_string()),
        Just("fear".to_string()),
        Just("happy".to_string()),
        Just("sad".to_string()),
        Just("surprise".to_string()),
        Just("neutral".to_string()),
        "[a-zA-Z]{0,10}",
    ]
}

fn any_tier() -> impl Strategy<Value = PriorityTier> {
    prop_oneof![
        Just(PriorityTier::P0),
        Just(PriorityTier::P1),
        Just(PriorityTier::P2)
    ]
}

fn any_signal() -> impl Strategy<Value = EmotionSignal> {
    prop_oneof![
        Just(EmotionSignal::Frustration),
        Just(EmotionSignal::Neutral),
        Just(EmotionSignal::Positive),
        Just(EmotionSignal::Uncertain)
    ]
}

/// Free text that sometimes contains tier keywords.
fn any_text() -> impl Strategy<Value = String> {
    let words = prop_oneof![
        Just("checkout"),
        Just("Payment Failed"),
        Just("can't login"),
        Just("500"),
        Just("DOWN"),
        Just("bug"),
        Just("Slow"),
        Just("how to"),
        Just("cosmetic"),
        Just("login"),
        Just("the"),
        Just("page"),
        Just("customer"),
    ];
    let phrases = prop::collection::vec(words, 0..6).prop_map(|w| w.join(" "));
    prop_oneof![phrases, ".{0,40}", "[ſKıİ a-zA-Z]{0,20}"]
}

proptest! {
    #[test]
    fn low_score_is_never_confident(label in any_label(), score in 0.0f64..0.6) {
        let n = normalize(&label, score);
        prop_assert!(!n.confident);
        prop_assert_eq!(n.signal, EmotionSignal::Uncertain);
    }

    #[test]
    fn frustration_labels_above_threshold(
        label in prop_oneof![Just("angry"), Just("disgust"), Just("fear")],
        score in 0.6f64..=1.0,
        upper in any::<bool>(),
    ) {
        let label = if upper { label.to_uppercase() } else { label.to_string() };
        let n = normalize(&label, score);
        prop_assert!(n.confident);
        prop_assert_eq!(n.signal, EmotionSignal::Frustration);
    }

    #[test]
    fn classify_is_case_insensitive_and_idempotent(text in any_text()) {
        let once = classify(&text);
        prop_assert_eq!(once, classify(&text));
        prop_assert_eq!(once, classify(&text.to_uppercase()));
        prop_assert_eq!(once, classify(&text.to_lowercase()));
    }

    #[test]
    fn resolve_never_downgrades(
        base in any_tier(),
        signal in any_signal(),
        confident in any::<bool>(),
        high_impact in any::<bool>(),
    ) {
        let out = resolve(base, signal, confident, high_impact);
        prop_assert!(out.urgency() >= base.urgency());
    }

    #[test]
    fn select_top_is_first_argmax(
        entries in prop::collection::vec((any_label(), 0.0f64..=1.0), 1..8),
    ) {
        let preds: Vec<Prediction> = entries
            .iter()
            .map(|(l, s)| Prediction::new(l.clone(), *s))
            .collect();
        let top = select_top(&preds);

        let max = entries.iter().map(|(_, s)| *s).fold(f64::MIN, f64::max);
        let first = entries.iter().find(|(_, s)| *s == max).unwrap();
        prop_assert_eq!(top.score, max);
        prop_assert_eq!(top.label, first.0.to_lowercase());
    }

    #[test]
    fn engine_is_total(
        entries in prop::collection::vec((any_label(), -2.0f64..3.0), 0..6),
        text in ".{0,40}",
    ) {
        let preds: Vec<Prediction> = entries
            .into_iter()
            .map(|(l, s)| Prediction::new(l, s))
            .collect();
        let r = TriageEngine::new().triage(&preds, &text);
        prop_assert!((0.0..=1.0).contains(&r.emotion.score));
        prop_assert!(r.priority.urgency() >= r.keywords.base_tier.urgency());
    }
}
