//! Entity graph: organizational units and who leads them.
//!
//! Extraction is a pair of vocabulary-driven scans over normalized text:
//! unit spans ("Department of Mining Engineering") bounded by the next unit
//! keyword or list marker, then role mentions ("Chairman: Dr. Y Z") in the
//! text that follows each unit.

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use prospector_core::config::{GraphConfig, RulesConfig};
use prospector_core::error::{ProspectorError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Department,
    Person,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityNode {
    pub name: String,
    pub kind: NodeKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationEdge {
    pub source: String,
    pub target: String,
    pub relation: String,
}

/// Serializable form of the graph. Order is insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<EntityNode>,
    pub edges: Vec<RelationEdge>,
}

/// Directed graph of entities, addressable by name.
///
/// Nodes are never removed, so node indices follow insertion order.
#[derive(Debug, Clone, Default)]
pub struct EntityGraph {
    graph: DiGraph<EntityNode, String>,
    by_name: HashMap<String, NodeIndex>,
}

impl EntityGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn kind(&self, name: &str) -> Option<NodeKind> {
        self.by_name.get(name).map(|&idx| self.graph[idx].kind)
    }

    /// Insert a node if it is new. Returns its index and whether it was
    /// inserted. A department claim upgrades an existing person node.
    pub fn upsert_node(&mut self, name: &str, kind: NodeKind) -> (NodeIndex, bool) {
        if let Some(&idx) = self.by_name.get(name) {
            if kind == NodeKind::Department {
                self.graph[idx].kind = NodeKind::Department;
            }
            return (idx, false);
        }
        let idx = self.graph.add_node(EntityNode { name: name.to_string(), kind });
        self.by_name.insert(name.to_string(), idx);
        (idx, true)
    }

    /// Add a relation, overwriting the label of an existing source→target
    /// edge. Missing endpoints are created as person nodes. Returns whether
    /// a new edge was added.
    pub fn upsert_edge(&mut self, source: &str, target: &str, relation: &str) -> bool {
        let (from, _) = self.upsert_node(source, NodeKind::Person);
        let (to, _) = self.upsert_node(target, NodeKind::Person);
        let before = self.graph.edge_count();
        self.graph.update_edge(from, to, relation.to_string());
        self.graph.edge_count() > before
    }

    /// Outgoing `(relation, target)` pairs in the order they were first added.
    pub fn relations(&self, name: &str) -> Vec<(String, String)> {
        let Some(&idx) = self.by_name.get(name) else {
            return Vec::new();
        };
        let mut edges: Vec<_> = self.graph.edges(idx).collect();
        edges.sort_by_key(|e| e.id());
        edges
            .into_iter()
            .map(|e| (e.weight().clone(), self.graph[e.target()].name.clone()))
            .collect()
    }

    /// Facts about every entity named in the query (case-insensitive
    /// substring match), one `Entity:` line per entity followed by its
    /// relations. Empty when nothing matches.
    pub fn get_context(&self, query: &str) -> String {
        let query = query.to_lowercase();
        let mut lines = Vec::new();
        for idx in self.graph.node_indices() {
            let node = &self.graph[idx];
            if !query.contains(&node.name.to_lowercase()) {
                continue;
            }
            lines.push(format!("Entity: {}", node.name));
            for (relation, target) in self.relations(&node.name) {
                lines.push(format!(" - {relation}: {target}"));
            }
        }
        lines.join("\n")
    }

    pub fn to_snapshot(&self) -> GraphSnapshot {
        let nodes = self.graph.node_indices().map(|idx| self.graph[idx].clone()).collect();
        let edges = self
            .graph
            .edge_indices()
            .filter_map(|e| {
                let (from, to) = self.graph.edge_endpoints(e)?;
                Some(RelationEdge {
                    source: self.graph[from].name.clone(),
                    target: self.graph[to].name.clone(),
                    relation: self.graph[e].clone(),
                })
            })
            .collect();
        GraphSnapshot { nodes, edges }
    }

    pub fn from_snapshot(snapshot: &GraphSnapshot) -> Result<Self> {
        let mut graph = Self::new();
        for node in &snapshot.nodes {
            graph.upsert_node(&node.name, node.kind);
        }
        for edge in &snapshot.edges {
            if !graph.contains(&edge.source) || !graph.contains(&edge.target) {
                return Err(ProspectorError::Snapshot(format!(
                    "edge {} -> {} references an unknown node",
                    edge.source, edge.target
                )));
            }
            graph.upsert_edge(&edge.source, &edge.target, &edge.relation);
        }
        Ok(graph)
    }
}

/// Patterns compiled from the unit, role and honorific vocabularies.
#[derive(Debug, Clone)]
pub struct ExtractionRules {
    /// Unit keyword, "of", whitespace. The name starts where this ends.
    unit_start: Regex,
    /// Whitespace followed by a unit keyword or a `12.` list marker.
    terminator: Regex,
    numbering: Regex,
    role: Regex,
}

impl ExtractionRules {
    pub fn compile(rules: &RulesConfig) -> Result<Self> {
        let units = alternation(&rules.unit_keywords, "unit_keywords")?;
        let roles = alternation(&rules.role_keywords, "role_keywords")?;
        let honorifics = alternation(&rules.honorifics, "honorifics")?;
        Ok(Self {
            unit_start: compile(&format!(r"(?i)(?:{units})\s+of\s+"))?,
            terminator: compile(&format!(r"(?i)\s(?:{units}|\d+\.)"))?,
            numbering: compile(r"^\d+\.\s*")?,
            role: compile(&format!(
                r"({roles})\s*(?:[:\-])?\s*((?:{honorifics})\.?\s+[A-Z][a-z]+(?:\s+[A-Z][a-z]+)+)"
            ))?,
        })
    }
}

fn alternation(words: &[String], field: &str) -> Result<String> {
    if words.is_empty() {
        return Err(ProspectorError::Rules(format!("{field} must not be empty")));
    }
    Ok(words.iter().map(|w| regex::escape(w)).collect::<Vec<_>>().join("|"))
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| ProspectorError::Rules(format!("bad pattern {pattern}: {e}")))
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c.is_whitespace() || c == '&'
}

/// One unit found in the text, with the roles mentioned after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedEntity {
    pub name: String,
    /// `(HAS_<ROLE>, person)` in order of appearance.
    pub leaders: Vec<(String, String)>,
}

/// Counts after merging an extraction into a graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub new_nodes: usize,
    pub new_edges: usize,
    pub total_nodes: usize,
    pub total_edges: usize,
}

impl std::fmt::Display for BuildReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Graph: {} nodes, {} edges.", self.total_nodes, self.total_edges)
    }
}

#[derive(Debug, Clone)]
pub struct EntityGraphBuilder {
    rules: ExtractionRules,
    lookahead_chars: usize,
    max_name_chars: usize,
}

impl EntityGraphBuilder {
    pub fn new(config: &GraphConfig, rules: &RulesConfig) -> Result<Self> {
        Ok(Self {
            rules: ExtractionRules::compile(rules)?,
            lookahead_chars: config.lookahead_chars,
            max_name_chars: config.max_name_chars,
        })
    }

    /// Scan text for units and their leaders.
    pub fn extract(&self, text: &str) -> Vec<ExtractedEntity> {
        let mut entities = Vec::new();
        let mut pos = 0;

        while let Some(start) = self.rules.unit_start.find_at(text, pos) {
            let candidate = start.start();
            match self.span_end(text, start.end()) {
                Some(end) => {
                    let raw = text[candidate..end].trim();
                    let name = self.rules.numbering.replace(raw, "").into_owned();
                    if name.chars().count() < self.max_name_chars {
                        let leaders = self.leaders_after(text, end);
                        entities.push(ExtractedEntity { name, leaders });
                    }
                    pos = end;
                }
                None => {
                    pos = candidate + text[candidate..].chars().next().map_or(1, char::len_utf8);
                }
            }
        }
        entities
    }

    /// Shortest name run (at least one char) that is followed by a
    /// terminator, or `None` when a non-name char comes first.
    fn span_end(&self, text: &str, name_start: usize) -> Option<usize> {
        let run_end = text[name_start..]
            .char_indices()
            .find(|&(_, c)| !is_name_char(c))
            .map_or(text.len(), |(i, _)| name_start + i);
        let first = text[name_start..].chars().next()?;
        let search_from = name_start + first.len_utf8();
        if search_from > run_end {
            return None;
        }
        self.rules
            .terminator
            .find_at(text, search_from)
            .map(|m| m.start())
            .filter(|&end| end < run_end)
    }

    fn leaders_after(&self, text: &str, from: usize) -> Vec<(String, String)> {
        let until = text[from..]
            .char_indices()
            .nth(self.lookahead_chars)
            .map_or(text.len(), |(i, _)| from + i);
        self.rules
            .role
            .captures_iter(&text[from..until])
            .map(|caps| {
                let relation = format!("HAS_{}", caps[1].to_uppercase());
                (relation, caps[2].trim().to_string())
            })
            .collect()
    }

    /// Merge everything extracted from `text` into `graph`.
    pub fn build(&self, graph: &mut EntityGraph, text: &str) -> BuildReport {
        let mut report = BuildReport::default();
        let entities = self.extract(text);
        tracing::info!("🕸️ Found {} entity mentions", entities.len());

        for entity in &entities {
            if graph.upsert_node(&entity.name, NodeKind::Department).1 {
                report.new_nodes += 1;
            }
            for (relation, person) in &entity.leaders {
                if !graph.contains(person) {
                    report.new_nodes += 1;
                }
                if graph.upsert_edge(&entity.name, person, relation) {
                    report.new_edges += 1;
                }
            }
        }

        report.total_nodes = graph.node_count();
        report.total_edges = graph.edge_count();
        tracing::info!(
            "✅ {report} (+{} nodes, +{} edges)",
            report.new_nodes,
            report.new_edges
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROSPECTUS: &str = "1. Faculty of Chemical Engineering 2. Department of Polymer Engineering \
        Department of Mining Engineering School of Architecture Director: Dr. Sana Malik, offers programs. \
        Chairman - Engr. Bilal Ahmed Khan, leads the department. 3.";

    fn builder() -> EntityGraphBuilder {
        EntityGraphBuilder::new(&GraphConfig::default(), &RulesConfig::default()).unwrap()
    }

    #[test]
    fn test_extract_units() {
        let names: Vec<String> = builder().extract(PROSPECTUS).into_iter().map(|e| e.name).collect();
        // "School of Architecture" runs into ':' before any terminator
        assert_eq!(
            names,
            vec![
                "Faculty of Chemical Engineering",
                "Department of Polymer Engineering",
                "Department of Mining Engineering",
            ]
        );
    }

    #[test]
    fn test_extract_leaders() {
        let entities = builder().extract(PROSPECTUS);
        assert_eq!(
            entities[2].leaders,
            vec![
                ("HAS_DIRECTOR".to_string(), "Dr. Sana Malik".to_string()),
                ("HAS_CHAIRMAN".to_string(), "Engr. Bilal Ahmed Khan".to_string()),
            ]
        );
    }

    #[test]
    fn test_unit_keywords_case_insensitive() {
        let entities = builder().extract("INSTITUTE OF Geology 4. more text");
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].name, "INSTITUTE OF Geology");
    }

    #[test]
    fn test_roles_case_sensitive() {
        let entities = builder().extract("Department of Physics 1. chairman: Dr. Ali Raza");
        assert_eq!(entities.len(), 1);
        assert!(entities[0].leaders.is_empty());
    }

    #[test]
    fn test_single_word_name_is_not_a_leader() {
        let entities = builder().extract("Department of Physics 1. Head: Dr. Raza, ok");
        assert!(entities[0].leaders.is_empty());
    }

    #[test]
    fn test_long_name_rejected() {
        let text = format!("Department of {} 1.", "Engineering ".repeat(10));
        assert!(builder().extract(&text).is_empty());
    }

    #[test]
    fn test_lookahead_window() {
        let config = GraphConfig { lookahead_chars: 10, ..GraphConfig::default() };
        let builder = EntityGraphBuilder::new(&config, &RulesConfig::default()).unwrap();
        let entities = builder.extract("Department of Physics 1. Dean: Dr. Ali Raza");
        assert!(entities[0].leaders.is_empty());
    }

    #[test]
    fn test_build_graph() {
        let mut graph = EntityGraph::new();
        let report = builder().build(&mut graph, PROSPECTUS);
        assert_eq!(report.total_nodes, 5);
        assert_eq!(report.total_edges, 6);
        assert_eq!(report.new_nodes, 5);
        assert_eq!(report.new_edges, 6);
        assert_eq!(report.to_string(), "Graph: 5 nodes, 6 edges.");
        assert_eq!(graph.kind("Dr. Sana Malik"), Some(NodeKind::Person));
        assert_eq!(graph.kind("Department of Mining Engineering"), Some(NodeKind::Department));
    }

    #[test]
    fn test_get_context() {
        let mut graph = EntityGraph::new();
        builder().build(&mut graph, PROSPECTUS);
        let context = graph.get_context("Who is the chairman of the Department of Mining Engineering?");
        assert_eq!(
            context,
            "Entity: Department of Mining Engineering\n - HAS_DIRECTOR: Dr. Sana Malik\n - HAS_CHAIRMAN: Engr. Bilal Ahmed Khan"
        );
        assert_eq!(graph.get_context("What is the weather?"), "");
    }

    #[test]
    fn test_last_write_wins() {
        let mut graph = EntityGraph::new();
        let report = builder().build(&mut graph, "Department of Physics 1. Dean: Dr. Ali Raza, Head: Dr. Ali Raza.");
        assert_eq!(report.total_edges, 1);
        assert_eq!(
            graph.relations("Department of Physics"),
            vec![("HAS_HEAD".to_string(), "Dr. Ali Raza".to_string())]
        );
    }

    #[test]
    fn test_accretion() {
        let builder = builder();
        let mut graph = EntityGraph::new();
        let first = builder.build(&mut graph, PROSPECTUS);
        let second = builder.build(&mut graph, "Department of Physics 1. Dean: Dr. Ali Raza, ok");
        assert!(second.total_nodes >= first.total_nodes);
        assert!(second.total_edges >= first.total_edges);
        assert_eq!(second.new_nodes, 2);
        assert!(graph.contains("Department of Mining Engineering"));

        // re-ingesting the same text adds nothing
        let again = builder.build(&mut graph, PROSPECTUS);
        assert_eq!(again.new_nodes, 0);
        assert_eq!(again.new_edges, 0);
        assert_eq!(again.total_nodes, second.total_nodes);
    }

    #[test]
    fn test_empty_text() {
        let mut graph = EntityGraph::new();
        let report = builder().build(&mut graph, "");
        assert_eq!(report, BuildReport::default());
    }

    #[test]
    fn test_snapshot_roundtrip_preserves_order() {
        let mut graph = EntityGraph::new();
        builder().build(&mut graph, PROSPECTUS);
        let snapshot = graph.to_snapshot();
        let restored = EntityGraph::from_snapshot(&snapshot).unwrap();
        assert_eq!(restored.to_snapshot(), snapshot);
        assert_eq!(
            restored.get_context("department of polymer engineering"),
            graph.get_context("department of polymer engineering")
        );
    }

    #[test]
    fn test_snapshot_with_dangling_edge() {
        let snapshot = GraphSnapshot {
            nodes: vec![EntityNode { name: "A".into(), kind: NodeKind::Department }],
            edges: vec![RelationEdge { source: "A".into(), target: "B".into(), relation: "HAS_DEAN".into() }],
        };
        assert!(EntityGraph::from_snapshot(&snapshot).is_err());
    }
}
