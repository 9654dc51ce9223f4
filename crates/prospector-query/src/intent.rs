//! Query-intent extraction: rewrite a conversational question into a
//! phrase the vector search responds to.
//!
//! 1. Formal degree ("M.Sc. Computer Science"), tried first
//! 2. Topic ("Safety related programs" → "Safety")
//! 3. Otherwise generic: strip conversational filler instead

use serde::Serialize;

use crate::rules::{RuleSet, strip_punctuation};

/// Shape of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    FormalDegree,
    Topic,
    None,
}

/// Classified question plus its canonical search phrase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchIntent {
    pub kind: IntentKind,
    /// Empty when `kind` is [`IntentKind::None`].
    pub phrase: String,
}

impl SearchIntent {
    pub fn none() -> Self {
        Self { kind: IntentKind::None, phrase: String::new() }
    }

    /// The phrase, if a rule matched.
    pub fn topic(&self) -> Option<&str> {
        match self.kind {
            IntentKind::None => None,
            _ => Some(self.phrase.as_str()),
        }
    }
}

/// Walks the ordered intent rules and builds search phrases.
#[derive(Debug, Clone)]
pub struct IntentExtractor {
    rules: RuleSet,
}

impl IntentExtractor {
    pub fn new(rules: RuleSet) -> Self {
        Self { rules }
    }

    /// Classify a question. The first rule that yields a phrase wins.
    pub fn extract(&self, question: &str) -> SearchIntent {
        self.rules
            .intent_rules
            .iter()
            .find_map(|rule| {
                rule.apply(question).map(|phrase| SearchIntent { kind: rule.kind, phrase })
            })
            .unwrap_or_else(SearchIntent::none)
    }

    /// Remove filler tokens, keeping survivors in order.
    pub fn clean_noise(&self, question: &str) -> String {
        question
            .split_whitespace()
            .filter(|w| !self.rules.filler_words.contains(&strip_punctuation(w).to_lowercase()))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Build the vector-search query for a question. The fixed suffixes bias
    /// retrieval toward catalog-style chunks.
    pub fn search_query(&self, question: &str, intent: &SearchIntent) -> String {
        match intent.topic() {
            Some(phrase) => format!("{phrase} Offered Programs Eligibility"),
            None => format!("{} Offered Programs", self.clean_noise(question)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prospector_core::config::RulesConfig;

    fn extractor() -> IntentExtractor {
        IntentExtractor::new(RuleSet::compile(&RulesConfig::default()).unwrap())
    }

    #[test]
    fn test_formal_degree_stops_before_department() {
        let intent = extractor().extract("Should I select M.Sc. Computer Science department in UET?");
        assert_eq!(intent.kind, IntentKind::FormalDegree);
        assert_eq!(intent.phrase, "M.Sc. Computer Science");
    }

    #[test]
    fn test_topic_request() {
        let intent = extractor().extract("Are there any Safety related programs?");
        assert_eq!(intent.kind, IntentKind::Topic);
        assert_eq!(intent.phrase, "Safety");
    }

    #[test]
    fn test_topic_without_related() {
        let intent = extractor().extract("Is there a Mining degree?");
        assert_eq!(intent, SearchIntent { kind: IntentKind::Topic, phrase: "Mining".into() });
    }

    #[test]
    fn test_degree_wins_over_topic() {
        let intent = extractor().extract("I want to apply for M.Sc. Artificial Intelligence. Should I select the Department of Computer Science?");
        assert_eq!(intent.kind, IntentKind::FormalDegree);
        assert_eq!(intent.phrase, "M.Sc. Artificial Intelligence");
    }

    #[test]
    fn test_generic_question() {
        let intent = extractor().extract("Who leads Chemical Engineering?");
        assert_eq!(intent, SearchIntent::none());
        assert_eq!(intent.topic(), None);
    }

    #[test]
    fn test_clean_noise() {
        assert_eq!(
            extractor().clean_noise("I live near UET campus, please tell me the Dean of Mining?"),
            "Dean Mining?"
        );
    }

    #[test]
    fn test_search_query_suffixes() {
        let ex = extractor();
        let topic = ex.extract("Are there any Safety related programs?");
        assert_eq!(ex.search_query("", &topic), "Safety Offered Programs Eligibility");

        let generic = ex.extract("Who is the chairman of Physics?");
        assert_eq!(ex.search_query("Who is the chairman of Physics?", &generic), "Who chairman Physics? Offered Programs");
    }
}
