//! Hybrid context assembly: graph facts first, then retrieved chunks.

pub const GRAPH_HEADER: &str = "--- ENTITY GRAPH ---";
pub const DATA_HEADER: &str = "--- OFFICIAL DATA ---";

/// Keep the chunks mentioning `topic` (case-insensitive). When none do, the
/// unfiltered chunks come back and the flag is set.
pub fn filter_by_topic(chunks: &[String], topic: &str) -> (Vec<String>, bool) {
    let needle = topic.to_lowercase();
    let kept: Vec<String> = chunks
        .iter()
        .filter(|c| c.to_lowercase().contains(&needle))
        .cloned()
        .collect();
    if kept.is_empty() && !chunks.is_empty() {
        (chunks.to_vec(), true)
    } else {
        (kept, false)
    }
}

/// Build the context block and cut it to `max_chars` characters.
pub fn assemble(graph_facts: &str, chunks: &[String], max_chars: usize) -> String {
    let mut context = String::new();
    if !graph_facts.is_empty() {
        context.push_str(GRAPH_HEADER);
        context.push('\n');
        context.push_str(graph_facts);
        context.push_str("\n\n");
    }
    context.push_str(DATA_HEADER);
    context.push('\n');
    context.push_str(&chunks.join("\n\n"));
    truncate_chars(&context, max_chars)
}

/// First `max` chars of `s`.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((cut, _)) => s[..cut].to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunks(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_filter_keeps_matching_chunks() {
        let all = chunks(&["M.Sc. Safety Engineering", "Mining programs", "Industrial SAFETY courses"]);
        let (kept, fell_back) = filter_by_topic(&all, "Safety");
        assert_eq!(kept, chunks(&["M.Sc. Safety Engineering", "Industrial SAFETY courses"]));
        assert!(!fell_back);
    }

    #[test]
    fn test_filter_falls_back_when_nothing_matches() {
        let all = chunks(&["Mining programs", "Polymer programs"]);
        let (kept, fell_back) = filter_by_topic(&all, "Astronomy");
        assert_eq!(kept, all);
        assert!(fell_back);
    }

    #[test]
    fn test_filter_on_empty_retrieval() {
        let (kept, fell_back) = filter_by_topic(&[], "Safety");
        assert!(kept.is_empty());
        assert!(!fell_back);
    }

    #[test]
    fn test_layout_with_graph_facts() {
        let context = assemble("Entity: Department of Physics", &chunks(&["one", "two"]), 20_000);
        assert_eq!(
            context,
            "--- ENTITY GRAPH ---\nEntity: Department of Physics\n\n--- OFFICIAL DATA ---\none\n\ntwo"
        );
    }

    #[test]
    fn test_layout_without_graph_facts() {
        assert_eq!(assemble("", &chunks(&["one"]), 20_000), "--- OFFICIAL DATA ---\none");
    }

    #[test]
    fn test_truncation_is_exact() {
        let big = chunks(&[&"x".repeat(15_000), &"y".repeat(15_000)]);
        let full = assemble("", &big, usize::MAX);
        let cut = assemble("", &big, 20_000);
        assert_eq!(cut.chars().count(), 20_000);
        assert!(full.starts_with(&cut));
    }

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(truncate_chars("ééé", 2), "éé");
        assert_eq!(truncate_chars("ab", 5), "ab");
    }
}
