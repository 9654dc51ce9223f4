//! Guardrails: topic policy applied before any retrieval work.
//!
//! Questions that mention an out-of-scope topic (fees, hostels, transport)
//! are refused with a fixed message. Matching is plain substring containment
//! on the lowercased question.

use serde::Serialize;

use crate::rules::RuleSet;

/// Outcome of a guardrail check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Allow,
    /// Refused with the message to return verbatim.
    Refuse(String),
}

impl Verdict {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Verdict::Allow)
    }
}

/// Pure policy check over a fixed forbidden vocabulary.
#[derive(Debug, Clone)]
pub struct GuardrailFilter {
    forbidden_terms: Vec<String>,
    refusal_message: String,
}

impl GuardrailFilter {
    pub fn new(rules: &RuleSet) -> Self {
        Self {
            forbidden_terms: rules.forbidden_terms.clone(),
            refusal_message: rules.refusal_message.clone(),
        }
    }

    /// First forbidden term contained in the question, if any.
    pub fn matched_term(&self, question: &str) -> Option<&str> {
        let lowered = question.to_lowercase();
        self.forbidden_terms
            .iter()
            .find(|term| lowered.contains(term.as_str()))
            .map(String::as_str)
    }

    pub fn check(&self, question: &str) -> Verdict {
        match self.matched_term(question) {
            Some(term) => {
                tracing::info!("🛡️ Guardrail refused question (matched '{term}')");
                Verdict::Refuse(self.refusal_message.clone())
            }
            None => Verdict::Allow,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prospector_core::config::RulesConfig;

    fn filter() -> GuardrailFilter {
        GuardrailFilter::new(&RuleSet::compile(&RulesConfig::default()).unwrap())
    }

    #[test]
    fn test_refuses_fee_questions() {
        assert_eq!(
            filter().check("What is the tuition fee for hostel?"),
            Verdict::Refuse("I only answer department/academic information.".into())
        );
    }

    #[test]
    fn test_case_insensitive() {
        assert!(!filter().check("Is there a BUS service?").is_allowed());
        assert_eq!(filter().matched_term("TRANSPORT options"), Some("transport"));
    }

    #[test]
    fn test_allows_academic_questions() {
        assert_eq!(filter().check("Who is the Dean of Faculty of Chemical Engineering?"), Verdict::Allow);
    }

    #[test]
    fn test_substring_containment() {
        // "costume" contains "cost"; the policy is containment, not word match.
        assert!(!filter().check("Is there a costume design program?").is_allowed());
    }
}
