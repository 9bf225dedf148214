//! Ordinal risk scale shared by detectors and the fusion policy

use serde::{Deserialize, Serialize};

/// Risk severity levels, ordered from harmless to most severe.
///
/// The derived `Ord` is the scale's total order; all comparisons and
/// max-combines go through it, never through string comparison.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    /// No risk detected
    #[default]
    Safe,
    /// Borderline content, worth recording
    Low,
    /// Policy-relevant content, review recommended
    Medium,
    /// Clear policy violation
    High,
    /// Severe violation requiring immediate action
    Critical,
}

impl RiskLevel {
    /// Normalize a collaborator-supplied level string onto the scale.
    ///
    /// Unknown or malformed input maps to `Medium`: an unrecognized level
    /// must never be silently downgraded to `Safe`.
    pub fn normalize(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "safe" => Self::Safe,
            "low" => Self::Low,
            "medium" => Self::Medium,
            "high" => Self::High,
            "critical" => Self::Critical,
            _ => Self::Medium,
        }
    }

    /// Combine two levels: the higher of the two wins.
    pub fn combine(a: Self, b: Self) -> Self {
        a.max(b)
    }

    /// One level up the scale, saturating at `Critical`.
    pub fn escalate(self) -> Self {
        match self {
            Self::Safe => Self::Low,
            Self::Low => Self::Medium,
            Self::Medium => Self::High,
            Self::High => Self::Critical,
            Self::Critical => Self::Critical,
        }
    }

    /// Base severity contribution on the 0..=100 scale.
    pub fn score(self) -> u8 {
        match self {
            Self::Safe => 0,
            Self::Low => 25,
            Self::Medium => 50,
            Self::High => 75,
            Self::Critical => 100,
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Safe => write!(f, "safe"),
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Critical => write!(f, "critical"),
        }
    }
}
