//! Keyword Classifier: base priority tier from free-text context
//!
//! Three ordered keyword tiers, first matching tier wins. A separate
//! high-impact set marks contexts eligible for emotion-driven escalation and
//! is evaluated regardless of which tier matched.

use crate::priority::PriorityTier;
use serde::Serialize;

/// Ordered tier table. Order is significant: earlier rows win.
const TIER_KEYWORDS: &[(PriorityTier, &[&str])] = &[
    (
        PriorityTier::P0,
        &[
            "checkout",
            "payment failed",
            "can't login",
            "cant login",
            "500",
            "down",
            "incident",
        ],
    ),
    (PriorityTier::P1, &["bug", "broken", "slow", "error"]),
    (PriorityTier::P2, &["how to", "question", "cosmetic"]),
];

const HIGH_IMPACT_KEYWORDS: &[&str] = &["checkout", "payment", "login", "500", "down"];

/// Tier used when no keyword matches.
const DEFAULT_TIER: PriorityTier = PriorityTier::P2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KeywordClassification {
    pub base_tier: PriorityTier,
    pub high_impact: bool,
    /// Keyword that decided the tier, if any.
    pub matched: Option<&'static str>,
}

/// Classify free text into a base tier and a high-impact flag.
pub fn classify(text: &str) -> KeywordClassification {
    // Fold through upper case first so characters such as `ſ` compare the
    // same as their upper-cased form.
    let t = text.to_uppercase().to_lowercase();

    let hit = TIER_KEYWORDS.iter().find_map(|(tier, kws)| {
        kws.iter()
            .find(|k| t.contains(*k))
            .map(|k| (*tier, *k))
    });

    let (base_tier, matched) = match hit {
        Some((tier, kw)) => (tier, Some(kw)),
        None => (DEFAULT_TIER, None),
    };

    KeywordClassification {
        base_tier,
        high_impact: HIGH_IMPACT_KEYWORDS.iter().any(|k| t.contains(k)),
        matched,
    }
}
