//! CommGuard - Real-time compliance monitoring for workplace communications
//!
//! CommGuard gates outbound workplace messages by classifying them for
//! privacy leakage (PII) and toxic content, then fusing the two independent
//! classifications into one actionable compliance decision.
//!
//! ## Architecture
//!
//! ```text
//!                 ┌─────────────────────────────────────────┐
//!                 │             Decision Engine             │
//!                 │                                         │
//!  message ──────▶│  validate ──▶ Parallel Invoker          │
//!  sender role    │                 │         │             │
//!                 │          ┌──────┘         └──────┐      │
//!                 │          ▼                       ▼      │
//!                 │   ┌────────────┐         ┌────────────┐ │
//!                 │   │  PII       │         │  Toxicity  │ │
//!                 │   │  detector  │         │  detector  │ │
//!                 │   └─────┬──────┘         └─────┬──────┘ │
//!                 │         └───── outcomes ───────┘        │
//!                 │                    │                    │
//!                 │                    ▼                    │
//!                 │             Fusion Policy               │
//!                 │   (combine, compound, score, action)    │
//!                 └─────────────────┬───────────────────────┘
//!                                   ▼
//!                            RiskAssessment
//! ```
//!
//! Both detectors run concurrently under one shared deadline. A detector
//! that fails or times out is replaced by a fail-safe high-risk stand-in, so
//! a valid message always receives a complete assessment; uncertainty always
//! degrades toward caution, never toward silence.
//!
//! ## Modules
//!
//! - [`risk`]: the shared ordinal risk scale
//! - [`detector`]: the detector gateway contract and concrete adapters
//! - [`engine`]: parallel invocation, fusion policy, and the decision engine
//! - [`handler`]: HTTP surface over the engine
//! - [`config`]: configuration management

pub mod config;
pub mod detector;
pub mod engine;
pub mod error;
pub mod handler;
pub mod risk;

pub use config::MonitorConfig;
pub use detector::{DetectionReport, Detector, DetectorOutcome};
pub use engine::{DecisionEngine, RiskAssessment};
pub use error::{Error, Result};
pub use risk::RiskLevel;
