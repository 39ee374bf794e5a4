//! Context assembly and prompt rendering.

use crate::models::Scored;

/// Join retrieved chunk texts with a blank-line separator, preserving
/// retrieval order. Pure concatenation: chunk text is never summarized or
/// mutated. An empty retrieval list yields an empty string.
pub fn assemble_context(retrieved: &[Scored<'_>]) -> String {
    retrieved
        .iter()
        .map(|scored| scored.chunk.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Render a fresh chat prompt in the model's instruction format, inserting
/// the assembled retrieval context into the system segment when present.
pub fn render_chat_prompt(system: &str, context: Option<&str>, user: &str) -> String {
    let system_segment = match context {
        Some(context) if !context.is_empty() => format!(
            "{system}\nUse the following context to answer:\n{context}"
        ),
        _ => system.to_string(),
    };
    format!("<|system|>\n{system_segment}<|end|>\n<|user|>\n{user}<|end|>\n<|assistant|>\n")
}

/// Render a continuation prompt: the prior rendered output concatenated
/// with the new input, no template re-wrap.
pub fn render_continuation_prompt(prior_output: &str, input: &str) -> String {
    format!("{prior_output} {input}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Chunk;

    fn scored(chunks: &[Chunk]) -> Vec<Scored<'_>> {
        chunks
            .iter()
            .map(|chunk| Scored { chunk, score: 0.0 })
            .collect()
    }

    #[test]
    fn test_empty_retrieval_yields_empty_string() {
        assert_eq!(assemble_context(&[]), "");
    }

    #[test]
    fn test_chunks_joined_with_blank_line_in_order() {
        let chunks = vec![Chunk::new("first", 0), Chunk::new("second", 10)];
        assert_eq!(assemble_context(&scored(&chunks)), "first\n\nsecond");
    }

    #[test]
    fn test_chunk_text_is_not_mutated() {
        let chunks = vec![Chunk::new("  spaced   text  ", 0)];
        assert_eq!(assemble_context(&scored(&chunks)), "  spaced   text  ");
    }

    #[test]
    fn test_fresh_prompt_wraps_in_template() {
        let prompt = render_chat_prompt("You are helpful.", None, "hello");
        assert_eq!(
            prompt,
            "<|system|>\nYou are helpful.<|end|>\n<|user|>\nhello<|end|>\n<|assistant|>\n"
        );
    }

    #[test]
    fn test_context_lands_in_system_segment() {
        let prompt = render_chat_prompt("You are helpful.", Some("the sky is blue"), "why?");
        let system_end = prompt.find("<|end|>").unwrap();
        assert!(prompt[..system_end].contains("the sky is blue"));
        assert!(prompt[system_end..].contains("why?"));
    }

    #[test]
    fn test_empty_context_is_ignored() {
        let with_empty = render_chat_prompt("sys", Some(""), "q");
        let without = render_chat_prompt("sys", None, "q");
        assert_eq!(with_empty, without);
    }

    #[test]
    fn test_continuation_has_no_template() {
        let prompt = render_continuation_prompt("prior answer", "next question");
        assert_eq!(prompt, "prior answer next question");
        assert!(!prompt.contains("<|system|>"));
    }
}
