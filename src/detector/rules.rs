//! Rule-based detectors backed by regex tables
//!
//! Fast, local, high-precision detection without network calls. Each detector
//! compiles a table of [`DetectionRule`]s once at construction; a match tags
//! the message with the rule's category and the highest matched level wins.

use crate::config::DetectionRule;
use crate::detector::{DetectionReport, Detector, PII_DETECTOR, TOXICITY_DETECTOR};
use crate::error::{Error, Result};
use crate::risk::RiskLevel;
use async_trait::async_trait;
use regex::Regex;
use std::time::Duration;

/// Regex matches are high-precision; reported for every flagged match.
const RULE_CONFIDENCE: f64 = 0.95;

struct CompiledRule {
    category: String,
    pattern: Regex,
    level: RiskLevel,
}

/// Rule-table detector for one concern (PII or toxicity)
pub struct RuleDetector {
    name: &'static str,
    subject: &'static str,
    rules: Vec<CompiledRule>,
}

impl RuleDetector {
    /// PII detector over the given rule table.
    pub fn pii(rules: &[DetectionRule]) -> Result<Self> {
        Self::new(PII_DETECTOR, "PII", rules)
    }

    /// Toxicity detector over the given rule table.
    pub fn toxicity(rules: &[DetectionRule]) -> Result<Self> {
        Self::new(TOXICITY_DETECTOR, "toxic content", rules)
    }

    fn new(name: &'static str, subject: &'static str, rules: &[DetectionRule]) -> Result<Self> {
        let rules = rules
            .iter()
            .map(|rule| {
                let pattern = Regex::new(&rule.pattern).map_err(|e| {
                    Error::Config(format!(
                        "Invalid pattern for rule '{}': {}",
                        rule.category, e
                    ))
                })?;
                Ok(CompiledRule {
                    category: rule.category.clone(),
                    pattern,
                    level: rule.level,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            name,
            subject,
            rules,
        })
    }

    fn classify(&self, message: &str) -> DetectionReport {
        let mut categories: Vec<String> = Vec::new();
        let mut level = RiskLevel::Safe;

        for rule in &self.rules {
            if rule.pattern.is_match(message) {
                if !categories.contains(&rule.category) {
                    categories.push(rule.category.clone());
                }
                level = RiskLevel::combine(level, rule.level);
            }
        }

        if categories.is_empty() {
            return DetectionReport::safe(format!("No {} detected", self.subject));
        }

        DetectionReport {
            flagged: true,
            explanation: format!("Detected {}: {}", self.subject, categories.join(", ")),
            categories,
            risk_level: level,
            confidence: Some(RULE_CONFIDENCE),
        }
    }
}

#[async_trait]
impl Detector for RuleDetector {
    fn name(&self) -> &str {
        self.name
    }

    async fn detect(
        &self,
        message: &str,
        _sender_role: &str,
        _deadline: Duration,
    ) -> Result<DetectionReport> {
        Ok(self.classify(message))
    }
}
