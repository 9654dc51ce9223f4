//! # Prospector Query
//!
//! Everything that happens to a question before retrieval:
//!
//! ```text
//! question
//!   ↓ GuardrailFilter   - forbidden topics are refused, nothing else runs
//!   ↓ IntentExtractor   - formal degree? topic? generic?
//!   ↓ search phrase     - "<phrase> Offered Programs Eligibility"
//!                         or "<cleaned question> Offered Programs"
//! ```
//!
//! The heuristics are ordered declarative rules compiled from
//! [`prospector_core::config::RulesConfig`], so vocabularies can change
//! without touching the orchestrator.

pub mod guardrails;
pub mod intent;
pub mod rules;

pub use guardrails::{GuardrailFilter, Verdict};
pub use intent::{IntentExtractor, IntentKind, SearchIntent};
pub use rules::{Capture, IntentRule, RuleSet};
