//! Instruction template sent to the generation endpoint.

/// Wrap the assembled context and the raw question in the step-by-step
/// instructions for eligibility and offered-programs questions.
pub fn build_prompt(context: &str, question: &str) -> String {
    format!(
        r#"You are a logical academic assistant. Answer using ONLY the text provided.

Context:
{context}

Question: {question}

INSTRUCTIONS (Step-by-Step Thinking):

1. **IF checking Eligibility:**
   - Step A: Find the list of eligible degrees in the text.
   - Step B: Check if the user's degree (e.g., Physics) is IN that list.
   - Step C: If it is in the list, answer YES. If not, answer NO.
   - *Warning:* Do not hallucinate a "No" if the word is clearly in the list.

2. **IF checking Offered Programs:**
   - Step A: Locate the "Offered Programs" header under the requested Department.
   - Step B: Scan for the specific keyword (e.g., "Safety").
   - Step C: If found, state the exact program name.

Answer:
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_context_and_question() {
        let prompt = build_prompt("--- OFFICIAL DATA ---\nB.Sc. Physics", "Can I apply with Physics?");
        assert!(prompt.contains("Context:\n--- OFFICIAL DATA ---\nB.Sc. Physics\n"));
        assert!(prompt.contains("Question: Can I apply with Physics?"));
        assert!(prompt.contains("IF checking Eligibility"));
        assert!(prompt.contains("IF checking Offered Programs"));
        assert!(prompt.trim_end().ends_with("Answer:"));
    }
}
