//! LLM-backed detectors
//!
//! Calls an OpenAI-compatible chat-completions API and parses the model's
//! JSON verdict into a [`DetectionReport`]. The model is prompted to return
//! strict JSON; anything it returns that does not parse is normalized to a
//! flagged medium-risk report rather than being treated as safe. Transport
//! failures surface as errors for the invoker to absorb.

use crate::config::LlmConfig;
use crate::detector::{DetectionReport, Detector, PII_DETECTOR, TOXICITY_DETECTOR};
use crate::error::{Error, Result};
use crate::risk::RiskLevel;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

const PII_SYSTEM_PROMPT: &str = "You are a compliance AI specialized in detecting Personally \
Identifiable Information (PII). Analyze text for credit card numbers, Social Security Numbers, \
passport numbers, email addresses, phone numbers, home addresses, and passwords or credentials. \
Return ONLY a JSON object with fields: flagged (boolean), categories (array of strings such as \
\"credit_card\" or \"email\"), risk_level (one of safe/low/medium/high/critical), explanation \
(string). Risk guidelines: critical for SSN, credit card, password; high for passport, full \
address; medium for email, phone; low for partial info; safe for none. Be strict in detection.";

const TOXICITY_SYSTEM_PROMPT: &str = "You are a brand safety AI specialized in detecting toxic \
and inappropriate workplace content. Analyze text for harassment or bullying, profanity, \
discrimination, threats or violence, sexual content, and hate speech. Return ONLY a JSON object \
with fields: flagged (boolean), categories (array of strings such as \"harassment\" or \
\"profanity\"), risk_level (one of safe/low/medium/high/critical), explanation (string). Risk \
guidelines: critical for severe harassment, threats, hate speech; high for clear policy \
violations or discrimination; medium for profanity or inappropriate jokes; low for borderline \
unprofessional tone; safe for professional communication.";

/// Verdict schema the model is prompted to return
#[derive(Debug, Deserialize)]
struct LlmVerdict {
    flagged: bool,
    #[serde(default)]
    categories: Vec<String>,
    #[serde(default)]
    risk_level: String,
    #[serde(default)]
    explanation: String,
    #[serde(default)]
    confidence: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

/// Detector backed by an OpenAI-compatible chat-completions API
pub struct LlmDetector {
    name: &'static str,
    system_prompt: &'static str,
    client: reqwest::Client,
    config: LlmConfig,
}

impl LlmDetector {
    /// LLM-backed PII detector.
    pub fn pii(config: LlmConfig) -> Self {
        Self::new(PII_DETECTOR, PII_SYSTEM_PROMPT, config)
    }

    /// LLM-backed toxicity detector.
    pub fn toxicity(config: LlmConfig) -> Self {
        Self::new(TOXICITY_DETECTOR, TOXICITY_SYSTEM_PROMPT, config)
    }

    fn new(name: &'static str, system_prompt: &'static str, config: LlmConfig) -> Self {
        Self {
            name,
            system_prompt,
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl Detector for LlmDetector {
    fn name(&self) -> &str {
        self.name
    }

    async fn detect(
        &self,
        message: &str,
        _sender_role: &str,
        deadline: Duration,
    ) -> Result<DetectionReport> {
        let url = format!(
            "{}/chat/completions",
            self.config.api_base.trim_end_matches('/')
        );
        let body = json!({
            "model": self.config.model,
            "temperature": 0.1,
            "response_format": {"type": "json_object"},
            "messages": [
                {"role": "system", "content": self.system_prompt},
                {
                    "role": "user",
                    "content": format!("Analyze this workplace message:\n\n{message}"),
                },
            ],
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .timeout(deadline)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let chat: ChatResponse = response.json().await?;
        let content = chat
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| Error::Detector(format!("{}: empty completion", self.name)))?;

        Ok(parse_verdict(self.name, &content))
    }
}

/// Parse the model's verdict, normalizing fail-safe.
///
/// A verdict that does not parse is flagged at medium risk: an unreadable
/// classification must never pass as safe.
fn parse_verdict(name: &str, content: &str) -> DetectionReport {
    match serde_json::from_str::<LlmVerdict>(content) {
        Ok(verdict) => DetectionReport {
            flagged: verdict.flagged,
            categories: verdict.categories,
            risk_level: RiskLevel::normalize(&verdict.risk_level),
            explanation: if verdict.explanation.is_empty() {
                format!("{name} verdict without explanation")
            } else {
                verdict.explanation
            },
            confidence: verdict.confidence,
        },
        Err(_) => DetectionReport {
            flagged: true,
            categories: vec!["malformed_verdict".to_string()],
            risk_level: RiskLevel::Medium,
            explanation: format!("{name} returned an unparseable verdict; treated as medium risk"),
            confidence: None,
        },
    }
}
