//! Fusion policy: two detector outcomes in, one compliance decision out
//!
//! Pure and deterministic: no I/O, no randomness, no clock. Identical
//! outcomes and sender role always produce an identical assessment, so the
//! result is independent of detector completion race order.

use crate::detector::{DetectionReport, DetectorOutcome, PII_DETECTOR, TOXICITY_DETECTOR};
use crate::risk::RiskLevel;
use serde::{Deserialize, Serialize};

/// Severity bonus when multiple concerns are flagged at once
const COMPOUND_BONUS: u8 = 10;

/// Severity floor when exactly one detector did not complete
const DEGRADED_FLOOR: u8 = 70;

/// Sender role partition used for action selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleClass {
    /// Management, customer-facing, or finance roles
    Privileged,
    /// Everything else, including unknown roles
    Standard,
}

/// Partition of caller-supplied sender roles into privileged and standard.
///
/// Supplied at construction; unknown roles always fall to `Standard`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RolePartition {
    /// Roles treated as privileged, matched case-insensitively
    pub privileged: Vec<String>,
}

impl Default for RolePartition {
    fn default() -> Self {
        Self {
            privileged: vec![
                "customer service".to_string(),
                "sales".to_string(),
                "management".to_string(),
                "hr".to_string(),
                "finance".to_string(),
            ],
        }
    }
}

impl RolePartition {
    /// Classify an opaque sender role string.
    pub fn classify(&self, sender_role: &str) -> RoleClass {
        let role = sender_role.trim();
        if self
            .privileged
            .iter()
            .any(|p| p.eq_ignore_ascii_case(role))
        {
            RoleClass::Privileged
        } else {
            RoleClass::Standard
        }
    }
}

/// Total mapping from (risk level, role partition) to a recommended action.
///
/// One field per cell keeps the table total by construction: a new level or
/// partition cannot compile without an explicit entry, and no default string
/// is ever silently substituted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionTable {
    /// Critical risk, privileged sender
    pub critical_privileged: String,
    /// Critical risk, standard sender
    pub critical_standard: String,
    /// High risk, any sender
    pub high: String,
    /// Medium risk, any sender
    pub medium: String,
    /// Low risk, any sender
    pub low: String,
    /// No risk, any sender
    pub safe: String,
}

impl Default for ActionTable {
    fn default() -> Self {
        Self {
            critical_privileged: "IMMEDIATE ACTION REQUIRED: delete message, notify compliance \
                                  team, suspend account pending investigation, initiate incident \
                                  response."
                .to_string(),
            critical_standard: "IMMEDIATE ACTION REQUIRED: delete message and notify security."
                .to_string(),
            high: "Flag for compliance review within 1 hour; restrict message visibility."
                .to_string(),
            medium: "Flag for compliance review; no restriction.".to_string(),
            low: "Log for audit trail; no action required.".to_string(),
            safe: "No action required.".to_string(),
        }
    }
}

impl ActionTable {
    /// Look up the action for a decision. Total over both enums.
    pub fn action_for(&self, level: RiskLevel, class: RoleClass) -> &str {
        match (level, class) {
            (RiskLevel::Critical, RoleClass::Privileged) => &self.critical_privileged,
            (RiskLevel::Critical, RoleClass::Standard) => &self.critical_standard,
            (RiskLevel::High, _) => &self.high,
            (RiskLevel::Medium, _) => &self.medium,
            (RiskLevel::Low, _) => &self.low,
            (RiskLevel::Safe, _) => &self.safe,
        }
    }
}

/// The engine's final output for one message
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAssessment {
    /// PII detection report (degraded stand-in if the detector was unavailable)
    pub pii: DetectionReport,

    /// Toxicity detection report (degraded stand-in if unavailable)
    pub toxicity: DetectionReport,

    /// Unified risk level after combining and compounding
    pub final_risk_level: RiskLevel,

    /// Overall severity in [0, 100]
    pub severity_score: u8,

    /// Recommended action for the compliance team
    pub recommended_action: String,

    /// Whether the message should be flagged for review
    pub should_flag: bool,

    /// Wall-clock processing time, stamped by the decision engine
    pub processing_time_ms: u64,

    /// True if any detector failed or timed out
    pub degraded: bool,
}

/// Fail-safe stand-in for an unavailable detector.
///
/// An unavailable detector is never treated as safe; its report is flagged
/// at high risk so the decision degrades toward caution.
fn degraded_report(name: &str) -> DetectionReport {
    DetectionReport {
        flagged: true,
        categories: vec!["detector_unavailable".to_string()],
        risk_level: RiskLevel::High,
        explanation: format!("{name} unavailable; treated as high risk"),
        confidence: None,
    }
}

/// Fusion policy configured with a role partition and action table
#[derive(Debug, Clone)]
pub struct FusionPolicy {
    roles: RolePartition,
    actions: ActionTable,
}

impl FusionPolicy {
    /// Create a fusion policy.
    pub fn new(roles: RolePartition, actions: ActionTable) -> Self {
        Self { roles, actions }
    }

    /// Fuse detector outcomes into an assessment.
    ///
    /// `outcomes` must be in registration order; `processing_time_ms` is left
    /// at zero for the decision engine to stamp.
    pub fn fuse(
        &self,
        outcomes: &[(String, DetectorOutcome)],
        sender_role: &str,
    ) -> RiskAssessment {
        // Materialize one report per outcome, clamping succeeded reports onto
        // their invariants and substituting fail-safe stand-ins otherwise.
        let mut reports: Vec<(String, DetectionReport, bool)> = outcomes
            .iter()
            .map(|(name, outcome)| match outcome {
                DetectorOutcome::Succeeded(report) => {
                    (name.clone(), report.clone().sanitized(), false)
                }
                DetectorOutcome::Failed(_) | DetectorOutcome::TimedOut => {
                    (name.clone(), degraded_report(name), true)
                }
            })
            .collect();

        // A misconfigured registry missing a well-known detector counts as
        // that detector being unavailable.
        for name in [PII_DETECTOR, TOXICITY_DETECTOR] {
            if !reports.iter().any(|(n, _, _)| n == name) {
                reports.push((name.to_string(), degraded_report(name), true));
            }
        }

        let base = reports
            .iter()
            .fold(RiskLevel::Safe, |acc, (_, r, _)| {
                RiskLevel::combine(acc, r.risk_level)
            });
        let flagged_count = reports.iter().filter(|(_, r, _)| r.flagged).count();
        let degraded_count = reports.iter().filter(|(_, _, d)| *d).count();

        // Simultaneous violations across distinct concerns compound beyond
        // either signal alone.
        let compounded = flagged_count >= 2 && base < RiskLevel::Critical;
        let final_risk_level = if compounded { base.escalate() } else { base };

        let mut severity_score = final_risk_level.score();
        if compounded {
            severity_score = (severity_score + COMPOUND_BONUS).min(100);
        }
        if degraded_count == 1 {
            severity_score = severity_score.max(DEGRADED_FLOOR);
        }

        let class = self.roles.classify(sender_role);
        let recommended_action = self.actions.action_for(final_risk_level, class).to_string();

        let report_for = |name: &str| {
            reports
                .iter()
                .find(|(n, _, _)| n == name)
                .map(|(_, r, _)| r.clone())
                .unwrap_or_else(|| degraded_report(name))
        };

        RiskAssessment {
            pii: report_for(PII_DETECTOR),
            toxicity: report_for(TOXICITY_DETECTOR),
            final_risk_level,
            severity_score,
            recommended_action,
            should_flag: final_risk_level != RiskLevel::Safe,
            processing_time_ms: 0,
            degraded: degraded_count > 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> FusionPolicy {
        FusionPolicy::new(RolePartition::default(), ActionTable::default())
    }

    fn report(level: RiskLevel, categories: &[&str]) -> DetectionReport {
        DetectionReport {
            flagged: level != RiskLevel::Safe,
            categories: categories.iter().map(|c| c.to_string()).collect(),
            risk_level: level,
            explanation: "test report".to_string(),
            confidence: Some(0.9),
        }
    }

    fn succeeded(name: &str, level: RiskLevel, categories: &[&str]) -> (String, DetectorOutcome) {
        (
            name.to_string(),
            DetectorOutcome::Succeeded(report(level, categories)),
        )
    }

    #[test]
    fn test_safe_safe_scenario() {
        let outcomes = vec![
            succeeded("pii", RiskLevel::Safe, &[]),
            succeeded("toxicity", RiskLevel::Safe, &[]),
        ];
        let assessment = policy().fuse(&outcomes, "Engineering");

        assert_eq!(assessment.final_risk_level, RiskLevel::Safe);
        assert_eq!(assessment.severity_score, 0);
        assert!(!assessment.should_flag);
        assert!(!assessment.degraded);
        assert_eq!(assessment.recommended_action, "No action required.");
    }

    #[test]
    fn test_critical_pii_privileged_scenario() {
        let outcomes = vec![
            succeeded("pii", RiskLevel::Critical, &["credit_card"]),
            succeeded("toxicity", RiskLevel::Safe, &[]),
        ];
        let assessment = policy().fuse(&outcomes, "Customer Service");

        assert_eq!(assessment.final_risk_level, RiskLevel::Critical);
        assert_eq!(assessment.severity_score, 100);
        assert!(assessment.should_flag);
        assert!(assessment.recommended_action.contains("suspend account"));
    }

    #[test]
    fn test_critical_standard_role_gets_standard_action() {
        let outcomes = vec![
            succeeded("pii", RiskLevel::Critical, &["ssn"]),
            succeeded("toxicity", RiskLevel::Safe, &[]),
        ];
        let assessment = policy().fuse(&outcomes, "Engineering");

        assert!(assessment.recommended_action.contains("notify security"));
        assert!(!assessment.recommended_action.contains("suspend account"));
    }

    #[test]
    fn test_unknown_role_defaults_to_standard() {
        let outcomes = vec![
            succeeded("pii", RiskLevel::Critical, &["ssn"]),
            succeeded("toxicity", RiskLevel::Safe, &[]),
        ];
        let assessment = policy().fuse(&outcomes, "Intern Of Mystery");
        assert!(assessment.recommended_action.contains("notify security"));
    }

    #[test]
    fn test_role_matching_is_case_insensitive() {
        assert_eq!(
            RolePartition::default().classify("CUSTOMER SERVICE"),
            RoleClass::Privileged
        );
        assert_eq!(
            RolePartition::default().classify("  management  "),
            RoleClass::Privileged
        );
        assert_eq!(
            RolePartition::default().classify("engineering"),
            RoleClass::Standard
        );
    }

    #[test]
    fn test_compounding_escalates_one_level() {
        let outcomes = vec![
            succeeded("pii", RiskLevel::Medium, &["email"]),
            succeeded("toxicity", RiskLevel::Medium, &["profanity"]),
        ];
        let assessment = policy().fuse(&outcomes, "Sales");

        assert_eq!(assessment.final_risk_level, RiskLevel::High);
        assert_eq!(assessment.severity_score, 85);
    }

    #[test]
    fn test_compounding_caps_at_critical() {
        let outcomes = vec![
            succeeded("pii", RiskLevel::High, &["passport"]),
            succeeded("toxicity", RiskLevel::High, &["harassment"]),
        ];
        let assessment = policy().fuse(&outcomes, "Sales");

        assert_eq!(assessment.final_risk_level, RiskLevel::Critical);
        assert_eq!(assessment.severity_score, 100);
    }

    #[test]
    fn test_no_compounding_with_single_flag() {
        let outcomes = vec![
            succeeded("pii", RiskLevel::Medium, &["phone"]),
            succeeded("toxicity", RiskLevel::Safe, &[]),
        ];
        let assessment = policy().fuse(&outcomes, "Sales");

        assert_eq!(assessment.final_risk_level, RiskLevel::Medium);
        assert_eq!(assessment.severity_score, 50);
    }

    #[test]
    fn test_no_bonus_when_base_already_critical() {
        let outcomes = vec![
            succeeded("pii", RiskLevel::Critical, &["credit_card"]),
            succeeded("toxicity", RiskLevel::Low, &["profanity"]),
        ];
        let assessment = policy().fuse(&outcomes, "Sales");

        assert_eq!(assessment.final_risk_level, RiskLevel::Critical);
        assert_eq!(assessment.severity_score, 100);
    }

    #[test]
    fn test_timeout_scenario() {
        let outcomes = vec![
            succeeded("pii", RiskLevel::Safe, &[]),
            ("toxicity".to_string(), DetectorOutcome::TimedOut),
        ];
        let assessment = policy().fuse(&outcomes, "Sales");

        assert!(assessment.degraded);
        assert!(assessment.final_risk_level >= RiskLevel::High);
        assert!(assessment.severity_score >= 70);
        assert_eq!(
            assessment.toxicity.categories,
            vec!["detector_unavailable".to_string()]
        );
        assert!(assessment.toxicity.explanation.contains("toxicity"));
    }

    #[test]
    fn test_failed_and_timed_out_fuse_identically() {
        let timed_out = vec![
            succeeded("pii", RiskLevel::Low, &["phone"]),
            ("toxicity".to_string(), DetectorOutcome::TimedOut),
        ];
        let failed = vec![
            succeeded("pii", RiskLevel::Low, &["phone"]),
            (
                "toxicity".to_string(),
                DetectorOutcome::Failed("boom".to_string()),
            ),
        ];

        let a = policy().fuse(&timed_out, "Sales");
        let b = policy().fuse(&failed, "Sales");
        assert_eq!(a, b);
    }

    #[test]
    fn test_failsafe_floor_applies_to_single_degradation() {
        for outcome in [
            DetectorOutcome::Failed("err".to_string()),
            DetectorOutcome::TimedOut,
        ] {
            let outcomes = vec![
                succeeded("pii", RiskLevel::Safe, &[]),
                ("toxicity".to_string(), outcome),
            ];
            let assessment = policy().fuse(&outcomes, "Engineering");
            assert!(assessment.severity_score >= 70);
            assert!(assessment.degraded);
        }
    }

    #[test]
    fn test_both_detectors_degraded() {
        let outcomes = vec![
            ("pii".to_string(), DetectorOutcome::TimedOut),
            (
                "toxicity".to_string(),
                DetectorOutcome::Failed("down".to_string()),
            ),
        ];
        let assessment = policy().fuse(&outcomes, "Sales");

        // Two flagged high stand-ins compound to critical on their own.
        assert_eq!(assessment.final_risk_level, RiskLevel::Critical);
        assert_eq!(assessment.severity_score, 100);
        assert!(assessment.degraded);
    }

    #[test]
    fn test_nonconforming_report_is_clamped() {
        let nonconforming = DetectionReport {
            flagged: false,
            categories: vec!["email".to_string()],
            risk_level: RiskLevel::High,
            explanation: "claims clean but carries risk".to_string(),
            confidence: None,
        };
        let outcomes = vec![
            (
                "pii".to_string(),
                DetectorOutcome::Succeeded(nonconforming),
            ),
            succeeded("toxicity", RiskLevel::Safe, &[]),
        ];
        let assessment = policy().fuse(&outcomes, "Sales");

        assert_eq!(assessment.final_risk_level, RiskLevel::Safe);
        assert!(assessment.pii.categories.is_empty());
    }

    #[test]
    fn test_missing_wellknown_detector_counts_as_degraded() {
        let outcomes = vec![succeeded("toxicity", RiskLevel::Safe, &[])];
        let assessment = policy().fuse(&outcomes, "Sales");

        assert!(assessment.degraded);
        assert_eq!(
            assessment.pii.categories,
            vec!["detector_unavailable".to_string()]
        );
        assert!(assessment.final_risk_level >= RiskLevel::High);
        assert!(assessment.severity_score >= 70);
    }

    #[test]
    fn test_fuse_is_deterministic() {
        let outcomes = vec![
            succeeded("pii", RiskLevel::Medium, &["email"]),
            ("toxicity".to_string(), DetectorOutcome::TimedOut),
        ];
        let a = policy().fuse(&outcomes, "Finance");
        let b = policy().fuse(&outcomes, "Finance");
        assert_eq!(a, b);
    }

    #[test]
    fn test_monotonicity_in_either_input() {
        let levels = [
            RiskLevel::Safe,
            RiskLevel::Low,
            RiskLevel::Medium,
            RiskLevel::High,
            RiskLevel::Critical,
        ];

        for fixed in levels {
            let mut last_level = RiskLevel::Safe;
            let mut last_score = 0u8;
            for rising in levels {
                let outcomes = vec![
                    succeeded("pii", rising, &["x"]),
                    succeeded("toxicity", fixed, &["y"]),
                ];
                let assessment = policy().fuse(&outcomes, "Sales");
                assert!(assessment.final_risk_level >= last_level);
                assert!(assessment.severity_score >= last_score);
                last_level = assessment.final_risk_level;
                last_score = assessment.severity_score;
            }
        }
    }

    #[test]
    fn test_action_table_is_total() {
        let table = ActionTable::default();
        let levels = [
            RiskLevel::Safe,
            RiskLevel::Low,
            RiskLevel::Medium,
            RiskLevel::High,
            RiskLevel::Critical,
        ];
        for level in levels {
            for class in [RoleClass::Privileged, RoleClass::Standard] {
                assert!(!table.action_for(level, class).is_empty());
            }
        }
    }

    #[test]
    fn test_should_flag_tracks_final_level() {
        let flagged = policy().fuse(
            &[
                succeeded("pii", RiskLevel::Low, &["phone"]),
                succeeded("toxicity", RiskLevel::Safe, &[]),
            ],
            "Sales",
        );
        assert!(flagged.should_flag);

        let clean = policy().fuse(
            &[
                succeeded("pii", RiskLevel::Safe, &[]),
                succeeded("toxicity", RiskLevel::Safe, &[]),
            ],
            "Sales",
        );
        assert!(!clean.should_flag);
    }
}
