//! Declarative rule sets compiled from the `[rules]` configuration.

use prospector_core::config::RulesConfig;
use prospector_core::error::{ProspectorError, Result};
use regex::Regex;
use std::collections::HashSet;

use crate::intent::IntentKind;

/// Which part of a rule match becomes the phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capture {
    /// The whole match, tokenized and cut at the first stop word.
    WholeMatch,
    /// A single capture group, taken verbatim.
    Group(usize),
}

/// One intent heuristic: pattern, what to capture, where to stop.
#[derive(Debug, Clone)]
pub struct IntentRule {
    pub kind: IntentKind,
    pub pattern: Regex,
    pub capture: Capture,
    pub stop_words: HashSet<String>,
}

impl IntentRule {
    /// Apply the rule to a question. Returns `None` when the pattern does not
    /// match or the captured phrase is empty after stop-word cutting.
    pub fn apply(&self, question: &str) -> Option<String> {
        let caps = self.pattern.captures(question)?;
        let phrase = match self.capture {
            Capture::WholeMatch => {
                let raw = caps.get(0)?.as_str().trim();
                raw.split_whitespace()
                    .take_while(|w| !self.stop_words.contains(&strip_punctuation(w).to_lowercase()))
                    .collect::<Vec<_>>()
                    .join(" ")
            }
            Capture::Group(i) => caps.get(i)?.as_str().trim().to_string(),
        };
        if phrase.is_empty() { None } else { Some(phrase) }
    }
}

/// Every vocabulary-driven heuristic the query path needs, compiled once.
#[derive(Debug, Clone)]
pub struct RuleSet {
    pub version: u32,
    pub forbidden_terms: Vec<String>,
    pub refusal_message: String,
    /// Tried in order; the first rule producing a phrase wins.
    pub intent_rules: Vec<IntentRule>,
    pub filler_words: HashSet<String>,
}

impl RuleSet {
    pub fn compile(config: &RulesConfig) -> Result<Self> {
        let degree = non_empty_alternation(&config.degree_patterns, "degree_patterns")?;
        let degree_rule = IntentRule {
            kind: IntentKind::FormalDegree,
            pattern: compile(&format!(r"(?i)\b(?:{degree})\s+[A-Za-z\s&]+"))?,
            capture: Capture::WholeMatch,
            stop_words: lowercase_set(&config.degree_stop_words),
        };

        let markers: Vec<String> = config.topic_markers.iter().map(|m| regex::escape(m)).collect();
        let markers = non_empty_alternation(&markers, "topic_markers")?;
        let topic_rule = IntentRule {
            kind: IntentKind::Topic,
            pattern: compile(&format!(r"(?i)(\w+)\s+(?:related\s+)?(?:{markers})"))?,
            capture: Capture::Group(1),
            stop_words: HashSet::new(),
        };

        Ok(Self {
            version: config.version,
            forbidden_terms: config
                .forbidden_terms
                .iter()
                .map(|t| t.to_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
            refusal_message: config.refusal_message.clone(),
            intent_rules: vec![degree_rule, topic_rule],
            filler_words: lowercase_set(&config.filler_words),
        })
    }
}

/// Drop every character that is not alphanumeric, `_` or whitespace.
pub fn strip_punctuation(word: &str) -> String {
    word.chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect()
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| ProspectorError::Rules(format!("bad pattern {pattern}: {e}")))
}

fn non_empty_alternation(items: &[String], field: &str) -> Result<String> {
    if items.is_empty() {
        return Err(ProspectorError::Rules(format!("{field} must not be empty")));
    }
    Ok(items.join("|"))
}

fn lowercase_set(words: &[String]) -> HashSet<String> {
    words.iter().map(|w| w.to_lowercase()).collect()
}
