//! CommGuard configuration management

use crate::engine::fusion::{ActionTable, RolePartition};
use crate::risk::RiskLevel;
use serde::{Deserialize, Serialize};

/// Main CommGuard configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Decision engine configuration
    #[serde(default)]
    pub engine: EngineConfig,

    /// Detector configuration
    #[serde(default)]
    pub detectors: DetectorsConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8710,
        }
    }
}

/// Decision engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Shared wall-clock deadline for one evaluation, in milliseconds
    pub deadline_ms: u64,

    /// Maximum accepted message length in characters
    pub max_message_len: usize,

    /// Sender role partition used for action selection
    #[serde(default)]
    pub roles: RolePartition,

    /// Recommended-action table keyed by risk level and role partition
    #[serde(default)]
    pub actions: ActionTable,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            deadline_ms: 10_000,
            max_message_len: 5_000,
            roles: RolePartition::default(),
            actions: ActionTable::default(),
        }
    }
}

/// Which detector implementations back the standard registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DetectorBackend {
    /// Local regex rule tables, no network calls
    #[default]
    Rules,
    /// LLM classification via an OpenAI-compatible API
    Llm,
}

/// Detector configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorsConfig {
    /// Backend used for both standard detectors
    #[serde(default)]
    pub backend: DetectorBackend,

    /// PII detection rules (rules backend)
    #[serde(default = "default_pii_rules")]
    pub pii_rules: Vec<DetectionRule>,

    /// Toxicity detection rules (rules backend)
    #[serde(default = "default_toxicity_rules")]
    pub toxicity_rules: Vec<DetectionRule>,

    /// LLM backend settings
    #[serde(default)]
    pub llm: LlmConfig,
}

impl Default for DetectorsConfig {
    fn default() -> Self {
        Self {
            backend: DetectorBackend::Rules,
            pii_rules: default_pii_rules(),
            toxicity_rules: default_toxicity_rules(),
            llm: LlmConfig::default(),
        }
    }
}

/// LLM detector settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible API
    pub api_base: String,

    /// API key sent as a bearer token
    pub api_key: String,

    /// Model name
    pub model: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
        }
    }
}

/// A single detection rule: a regex pattern tagged with a category and level
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionRule {
    /// Category tag emitted when the pattern matches (e.g. "credit_card")
    pub category: String,

    /// Regex pattern
    pub pattern: String,

    /// Risk level assigned to a match
    pub level: RiskLevel,

    /// Human-readable description
    pub description: String,
}

impl DetectionRule {
    fn new(category: &str, pattern: &str, level: RiskLevel, description: &str) -> Self {
        Self {
            category: category.to_string(),
            pattern: pattern.to_string(),
            level,
            description: description.to_string(),
        }
    }
}

/// Default PII rule table
pub fn default_pii_rules() -> Vec<DetectionRule> {
    vec![
        DetectionRule::new(
            "credit_card",
            r"\b\d{4}[- ]?\d{4}[- ]?\d{4}[- ]?\d{4}\b",
            RiskLevel::Critical,
            "Credit card number",
        ),
        DetectionRule::new(
            "ssn",
            r"\b\d{3}-\d{2}-\d{4}\b",
            RiskLevel::Critical,
            "US Social Security Number",
        ),
        DetectionRule::new(
            "password",
            r"(?i)\b(?:password|passwd|pwd)\b\s*(?:is|:|=)\s*\S+",
            RiskLevel::Critical,
            "Password or credential disclosure",
        ),
        DetectionRule::new(
            "passport",
            r"\b[A-Z]{1,2}\d{7,9}\b",
            RiskLevel::High,
            "Passport number",
        ),
        DetectionRule::new(
            "address",
            r"(?i)\b\d{1,5}\s+[A-Za-z][A-Za-z ]*\s(?:st|street|ave|avenue|rd|road|blvd|boulevard|ln|lane|dr|drive)\b",
            RiskLevel::High,
            "Street address",
        ),
        DetectionRule::new(
            "email",
            r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b",
            RiskLevel::Medium,
            "Email address",
        ),
        DetectionRule::new(
            "phone",
            r"\b(?:\+?\d{1,2}[-. ]?)?(?:\(\d{3}\)|\d{3})[-. ]?\d{3}[-. ]?\d{4}\b",
            RiskLevel::Medium,
            "Phone number",
        ),
    ]
}

/// Default toxicity rule table
pub fn default_toxicity_rules() -> Vec<DetectionRule> {
    vec![
        DetectionRule::new(
            "threat",
            r"(?i)\b(?:i(?:'ll| will| am going to)\s+(?:kill|hurt|destroy|end)\s+you|watch your back|you(?:'ll| will)\s+regret)\b",
            RiskLevel::Critical,
            "Threatening or violent language",
        ),
        DetectionRule::new(
            "hate_speech",
            r"(?i)\b(?:your kind|people like you)\s+(?:don't|do not|shouldn't|should not)\s+belong\b",
            RiskLevel::Critical,
            "Hate speech or exclusionary language",
        ),
        DetectionRule::new(
            "harassment",
            r"(?i)\byou(?:'re| are)\s+(?:an?\s+)?(?:idiot|stupid|useless|worthless|pathetic|incompetent|a joke)\b",
            RiskLevel::High,
            "Personal attack or bullying",
        ),
        DetectionRule::new(
            "discrimination",
            r"(?i)\b(?:because|since)\s+(?:you're|you are|she's|he's)\s+a\s+(?:woman|man|girl|boy|foreigner)\b",
            RiskLevel::High,
            "Discriminatory remark",
        ),
        DetectionRule::new(
            "sexual_content",
            r"(?i)\b(?:send (?:me )?nudes|sexual favors?)\b",
            RiskLevel::High,
            "Sexual or inappropriate content",
        ),
        DetectionRule::new(
            "profanity",
            r"(?i)\b(?:damn|hell no|crap|bullshit|wtf)\b",
            RiskLevel::Medium,
            "Profanity or vulgar language",
        ),
    ]
}
