//! Risk aggregation and decision engine
//!
//! Orchestrates one evaluation: validates input, fans the detector registry
//! out under a shared deadline, fuses the outcomes into a single assessment,
//! and stamps the elapsed wall-clock time. Detector failures never escape as
//! engine failures; only input validation crosses the engine boundary.

pub mod fusion;
pub mod invoker;

pub use fusion::{ActionTable, FusionPolicy, RiskAssessment, RoleClass, RolePartition};
pub use invoker::ParallelInvoker;

use crate::config::EngineConfig;
use crate::detector::Detector;
use crate::error::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::info;

/// The decision engine: parallel invoker plus fusion policy.
///
/// Holds no mutable state across requests; the registry and the fusion
/// configuration are immutable after construction.
pub struct DecisionEngine {
    invoker: ParallelInvoker,
    fusion: FusionPolicy,
}

impl DecisionEngine {
    /// Create an engine over an ordered detector registry.
    pub fn new(registry: Vec<Arc<dyn Detector>>, config: EngineConfig) -> Self {
        let invoker = ParallelInvoker::new(
            registry,
            Duration::from_millis(config.deadline_ms),
            config.max_message_len,
        );
        let fusion = FusionPolicy::new(config.roles, config.actions);
        Self { invoker, fusion }
    }

    /// Evaluate one message.
    ///
    /// Fails only on invalid input, before any detector runs. A valid message
    /// always yields a complete assessment, degraded toward caution if a
    /// detector was unavailable.
    pub async fn evaluate(&self, message_text: &str, sender_role: &str) -> Result<RiskAssessment> {
        let started = Instant::now();

        let outcomes = self.invoker.invoke_all(message_text, sender_role).await?;
        let mut assessment = self.fusion.fuse(&outcomes, sender_role);
        assessment.processing_time_ms = started.elapsed().as_millis() as u64;

        info!(
            final_risk_level = %assessment.final_risk_level,
            severity_score = assessment.severity_score,
            should_flag = assessment.should_flag,
            degraded = assessment.degraded,
            processing_time_ms = assessment.processing_time_ms,
            "compliance decision"
        );

        Ok(assessment)
    }

    /// Registered detector names, in registration order.
    pub fn detector_names(&self) -> Vec<&str> {
        self.invoker.detector_names()
    }
}
