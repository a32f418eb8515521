//! Priority Resolver: emotion-driven escalation of the keyword tier
//!
//! A confident frustration signal can bump a ticket one tier up. Escalation
//! is monotonic: the resolver never returns a tier less urgent than the base.
//!
//! ```text
//! P2 ──(confident frustration)──────────────► P1
//! P1 ──(confident frustration + high impact)► P0
//! P0 ──────────────────────────────────────── stays P0
//! ```

use crate::signal::EmotionSignal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Ticket priority tier. `P0` is the most urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PriorityTier {
    P0,
    P1,
    P2,
}

impl PriorityTier {
    /// Urgency rank, higher is more urgent.
    pub fn urgency(&self) -> u8 {
        match self {
            Self::P0 => 2,
            Self::P1 => 1,
            Self::P2 => 0,
        }
    }

    pub fn is_more_urgent_than(&self, other: PriorityTier) -> bool {
        self.urgency() > other.urgency()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::P0 => "P0",
            Self::P1 => "P1",
            Self::P2 => "P2",
        }
    }
}

impl std::fmt::Display for PriorityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PriorityTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "P0" => Ok(Self::P0),
            "P1" => Ok(Self::P1),
            "P2" => Ok(Self::P2),
            other => Err(format!("unknown priority tier: {other}")),
        }
    }
}

/// Which escalation rule fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationRule {
    /// P1 + confident frustration + high-impact context → P0
    HighImpactFrustration,
    /// P2 + confident frustration → P1
    Frustration,
}

impl std::fmt::Display for EscalationRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HighImpactFrustration => write!(f, "high_impact_frustration"),
            Self::Frustration => write!(f, "frustration"),
        }
    }
}

/// Resolver output with the rule that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub priority: PriorityTier,
    pub base_tier: PriorityTier,
    pub rule: Option<EscalationRule>,
}

impl Resolution {
    pub fn escalated(&self) -> bool {
        self.rule.is_some()
    }

    /// Evaluate the escalation rules in order; the first match wins.
    pub fn evaluate(
        base_tier: PriorityTier,
        signal: EmotionSignal,
        confident: bool,
        high_impact: bool,
    ) -> Self {
        let frustrated = confident && signal == EmotionSignal::Frustration;

        let (priority, rule) = match base_tier {
            PriorityTier::P1 if frustrated && high_impact => {
                (PriorityTier::P0, Some(EscalationRule::HighImpactFrustration))
            }
            PriorityTier::P2 if frustrated => (PriorityTier::P1, Some(EscalationRule::Frustration)),
            _ => (base_tier, None),
        };

        Self {
            priority,
            base_tier,
            rule,
        }
    }
}

/// Final priority for a base tier and emotion signal.
pub fn resolve(
    base_tier: PriorityTier,
    signal: EmotionSignal,
    confident: bool,
    high_impact: bool,
) -> PriorityTier {
    Resolution::evaluate(base_tier, signal, confident, high_impact).priority
}
