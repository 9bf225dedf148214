//! Parallel detector invocation under one shared deadline
//!
//! Fans every registered detector out into its own tokio task and collects
//! one [`DetectorOutcome`] per detector, in registration order, regardless of
//! completion order. A slow or failed detector can never block or corrupt
//! another's result: each task is bounded by its own deadline timer started
//! at spawn, and expiry simply drops the detector future (best-effort
//! cancellation, no acknowledgment awaited).

use crate::detector::{Detector, DetectorOutcome};
use crate::error::{Error, Result};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Invokes the detector registry concurrently for one message
pub struct ParallelInvoker {
    registry: Vec<Arc<dyn Detector>>,
    deadline: Duration,
    max_message_len: usize,
}

impl ParallelInvoker {
    /// Create an invoker over an ordered detector registry.
    pub fn new(
        registry: Vec<Arc<dyn Detector>>,
        deadline: Duration,
        max_message_len: usize,
    ) -> Self {
        Self {
            registry,
            deadline,
            max_message_len,
        }
    }

    /// Registered detector names, in registration order.
    pub fn detector_names(&self) -> Vec<&str> {
        self.registry.iter().map(|d| d.name()).collect()
    }

    /// Validate the message before any detector runs.
    pub fn validate(&self, message: &str) -> Result<()> {
        if message.trim().is_empty() {
            return Err(Error::InvalidInput("message text is empty".to_string()));
        }
        let len = message.chars().count();
        if len > self.max_message_len {
            return Err(Error::InvalidInput(format!(
                "message length {} exceeds maximum {}",
                len, self.max_message_len
            )));
        }
        Ok(())
    }

    /// Run every registered detector against the shared deadline.
    ///
    /// Returns exactly one outcome per detector, in registration order.
    /// Fails fast with `InvalidInput` before spawning anything; all other
    /// failures are captured per-detector in the outcome.
    pub async fn invoke_all(
        &self,
        message: &str,
        sender_role: &str,
    ) -> Result<Vec<(String, DetectorOutcome)>> {
        self.validate(message)?;

        let mut names = Vec::with_capacity(self.registry.len());
        let mut handles = Vec::with_capacity(self.registry.len());
        for detector in &self.registry {
            // Each task gets owned copies; no state is shared between
            // concurrent detector invocations.
            let detector = detector.clone();
            let message = message.to_string();
            let role = sender_role.to_string();
            let deadline = self.deadline;

            names.push(detector.name().to_string());
            handles.push(tokio::spawn(async move {
                tokio::time::timeout(deadline, detector.detect(&message, &role, deadline)).await
            }));
        }

        let joined = join_all(handles).await;

        let mut outcomes = Vec::with_capacity(joined.len());
        for (name, result) in names.into_iter().zip(joined) {
            let outcome = match result {
                Ok(Ok(Ok(report))) => DetectorOutcome::Succeeded(report),
                Ok(Ok(Err(e))) => {
                    warn!(detector = %name, error = %e, "detector failed");
                    DetectorOutcome::Failed(e.to_string())
                }
                Ok(Err(_elapsed)) => {
                    warn!(detector = %name, "detector deadline elapsed");
                    DetectorOutcome::TimedOut
                }
                Err(e) => {
                    warn!(detector = %name, error = %e, "detector task panicked");
                    DetectorOutcome::Failed("panic".to_string())
                }
            };
            outcomes.push((name, outcome));
        }

        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::DetectionReport;
    use crate::risk::RiskLevel;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StaticDetector {
        name: &'static str,
        report: DetectionReport,
        calls: Arc<AtomicUsize>,
    }

    impl StaticDetector {
        fn new(name: &'static str, report: DetectionReport) -> (Arc<Self>, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let detector = Arc::new(Self {
                name,
                report,
                calls: calls.clone(),
            });
            (detector, calls)
        }
    }

    #[async_trait]
    impl Detector for StaticDetector {
        fn name(&self) -> &str {
            self.name
        }

        async fn detect(
            &self,
            _message: &str,
            _sender_role: &str,
            _deadline: Duration,
        ) -> crate::error::Result<DetectionReport> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.report.clone())
        }
    }

    struct SlowDetector {
        name: &'static str,
        delay: Duration,
    }

    #[async_trait]
    impl Detector for SlowDetector {
        fn name(&self) -> &str {
            self.name
        }

        async fn detect(
            &self,
            _message: &str,
            _sender_role: &str,
            _deadline: Duration,
        ) -> crate::error::Result<DetectionReport> {
            tokio::time::sleep(self.delay).await;
            Ok(DetectionReport::safe("slow but fine"))
        }
    }

    struct FailingDetector {
        name: &'static str,
    }

    #[async_trait]
    impl Detector for FailingDetector {
        fn name(&self) -> &str {
            self.name
        }

        async fn detect(
            &self,
            _message: &str,
            _sender_role: &str,
            _deadline: Duration,
        ) -> crate::error::Result<DetectionReport> {
            Err(Error::Detector("model endpoint unreachable".to_string()))
        }
    }

    fn flagged_report(level: RiskLevel, category: &str) -> DetectionReport {
        DetectionReport {
            flagged: true,
            categories: vec![category.to_string()],
            risk_level: level,
            explanation: format!("{category} found"),
            confidence: Some(0.9),
        }
    }

    #[tokio::test]
    async fn test_outcomes_in_registration_order() {
        // The slow detector is registered first and completes last; outcome
        // order must still follow registration order.
        let slow = Arc::new(SlowDetector {
            name: "pii",
            delay: Duration::from_millis(50),
        });
        let (fast, _) = StaticDetector::new("toxicity", flagged_report(RiskLevel::High, "threat"));

        let invoker = ParallelInvoker::new(vec![slow, fast], Duration::from_secs(5), 5_000);
        let outcomes = invoker.invoke_all("hello there", "Sales").await.unwrap();

        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].0, "pii");
        assert_eq!(outcomes[1].0, "toxicity");
        assert!(matches!(outcomes[0].1, DetectorOutcome::Succeeded(_)));
        assert!(matches!(outcomes[1].1, DetectorOutcome::Succeeded(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_detector_times_out() {
        let slow = Arc::new(SlowDetector {
            name: "toxicity",
            delay: Duration::from_secs(60),
        });
        let (fast, _) = StaticDetector::new("pii", DetectionReport::safe("ok"));

        let invoker = ParallelInvoker::new(vec![fast, slow], Duration::from_secs(10), 5_000);
        let outcomes = invoker.invoke_all("hello there", "Sales").await.unwrap();

        assert!(matches!(outcomes[0].1, DetectorOutcome::Succeeded(_)));
        assert_eq!(outcomes[1].1, DetectorOutcome::TimedOut);
    }

    #[tokio::test]
    async fn test_failed_detector_is_captured() {
        let failing = Arc::new(FailingDetector { name: "pii" });
        let (ok, _) = StaticDetector::new("toxicity", DetectionReport::safe("ok"));

        let invoker = ParallelInvoker::new(vec![failing, ok], Duration::from_secs(5), 5_000);
        let outcomes = invoker.invoke_all("hello there", "HR").await.unwrap();

        match &outcomes[0].1 {
            DetectorOutcome::Failed(kind) => assert!(kind.contains("unreachable")),
            other => panic!("expected Failed, got {other:?}"),
        }
        assert!(matches!(outcomes[1].1, DetectorOutcome::Succeeded(_)));
    }

    #[tokio::test]
    async fn test_one_timeout_does_not_block_the_other() {
        let (fast, calls) = StaticDetector::new("pii", DetectionReport::safe("ok"));
        let slow = Arc::new(SlowDetector {
            name: "toxicity",
            delay: Duration::from_secs(60),
        });

        let invoker = ParallelInvoker::new(vec![fast, slow], Duration::from_millis(100), 5_000);
        let outcomes = invoker.invoke_all("hello there", "Sales").await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(outcomes[0].1, DetectorOutcome::Succeeded(_)));
        assert_eq!(outcomes[1].1, DetectorOutcome::TimedOut);
    }

    #[tokio::test]
    async fn test_empty_message_invokes_no_detector() {
        let (detector, calls) = StaticDetector::new("pii", DetectionReport::safe("ok"));
        let invoker = ParallelInvoker::new(vec![detector], Duration::from_secs(5), 5_000);

        let result = invoker.invoke_all("   \n\t  ", "Sales").await;

        assert!(matches!(result, Err(Error::InvalidInput(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_oversized_message_rejected() {
        let (detector, calls) = StaticDetector::new("pii", DetectionReport::safe("ok"));
        let invoker = ParallelInvoker::new(vec![detector], Duration::from_secs(5), 10);

        let result = invoker.invoke_all("this message is too long", "Sales").await;

        assert!(matches!(result, Err(Error::InvalidInput(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_one_outcome_per_detector() {
        let (a, _) = StaticDetector::new("pii", DetectionReport::safe("ok"));
        let (b, _) = StaticDetector::new("toxicity", DetectionReport::safe("ok"));
        let failing = Arc::new(FailingDetector { name: "policy" });

        let invoker = ParallelInvoker::new(vec![a, b, failing], Duration::from_secs(5), 5_000);
        let outcomes = invoker.invoke_all("hello there", "Sales").await.unwrap();

        let names: Vec<&str> = outcomes.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["pii", "toxicity", "policy"]);
    }
}
