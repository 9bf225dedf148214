//! Detector gateway contract
//!
//! Every classification collaborator (PII detector, toxicity detector, or a
//! future detector) plugs in behind the [`Detector`] trait. The engine is
//! polymorphic over this capability and never depends on a concrete
//! implementation; side effects such as network calls or model inference
//! belong entirely to the collaborator.

pub mod llm;
pub mod rules;

use crate::config::{DetectorBackend, DetectorsConfig};
use crate::error::Result;
use crate::risk::RiskLevel;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Registry name of the PII detector
pub const PII_DETECTOR: &str = "pii";

/// Registry name of the toxicity detector
pub const TOXICITY_DETECTOR: &str = "toxicity";

/// Report produced by a single detector for a single message.
///
/// Immutable once returned; consumed exactly once by the fusion policy and
/// never cached across requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionReport {
    /// Whether the detector flagged the message
    pub flagged: bool,

    /// Non-exclusive category tags (e.g. "credit_card", "harassment")
    pub categories: Vec<String>,

    /// Risk level on the shared ordinal scale
    pub risk_level: RiskLevel,

    /// Human-readable explanation, never parsed programmatically
    pub explanation: String,

    /// Detector confidence in [0, 1], absent if the collaborator has none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl DetectionReport {
    /// An unflagged report with the given explanation.
    pub fn safe(explanation: impl Into<String>) -> Self {
        Self {
            flagged: false,
            categories: Vec::new(),
            risk_level: RiskLevel::Safe,
            explanation: explanation.into(),
            confidence: None,
        }
    }

    /// Clamp the report onto its invariants instead of trusting the
    /// collaborator: an unflagged report carries no risk level and no
    /// categories, and confidence stays within [0, 1].
    pub fn sanitized(mut self) -> Self {
        if !self.flagged {
            self.risk_level = RiskLevel::Safe;
            self.categories.clear();
        }
        if let Some(c) = self.confidence {
            self.confidence = Some(c.clamp(0.0, 1.0));
        }
        self
    }
}

/// A detector result with its provenance.
///
/// Owned by the parallel invoker until handed to the fusion policy. `Failed`
/// and `TimedOut` are fused identically but kept distinct for observability.
#[derive(Debug, Clone, PartialEq)]
pub enum DetectorOutcome {
    /// The detector returned a report before the deadline
    Succeeded(DetectionReport),
    /// The detector reported an error before the deadline
    Failed(String),
    /// The detector had not completed when the deadline elapsed
    TimedOut,
}

impl DetectorOutcome {
    /// True unless the detector completed normally.
    pub fn is_degraded(&self) -> bool {
        !matches!(self, Self::Succeeded(_))
    }
}

/// Capability contract implemented by every classification collaborator.
#[async_trait]
pub trait Detector: Send + Sync {
    /// Registry name, also used in explanations and logs.
    fn name(&self) -> &str;

    /// Classify one message.
    ///
    /// `deadline` is the shared wall-clock limit for the whole evaluation;
    /// implementations must fail with an error rather than hang past it.
    /// The invoker enforces the deadline externally regardless.
    async fn detect(
        &self,
        message: &str,
        sender_role: &str,
        deadline: Duration,
    ) -> Result<DetectionReport>;
}

/// Build the standard ordered registry (PII first, then toxicity) from
/// detector configuration.
pub fn build_registry(config: &DetectorsConfig) -> Result<Vec<Arc<dyn Detector>>> {
    match config.backend {
        DetectorBackend::Rules => Ok(vec![
            Arc::new(rules::RuleDetector::pii(&config.pii_rules)?),
            Arc::new(rules::RuleDetector::toxicity(&config.toxicity_rules)?),
        ]),
        DetectorBackend::Llm => Ok(vec![
            Arc::new(llm::LlmDetector::pii(config.llm.clone())),
            Arc::new(llm::LlmDetector::toxicity(config.llm.clone())),
        ]),
    }
}
