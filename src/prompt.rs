//! Synthesized prompts for the code-oriented contract methods.
//!
//! Kept as pure functions so the synthesis is deterministic for a given
//! input pair.

/// System prompt for `generate_code`. Language-specific when a language is
/// given, language-agnostic otherwise.
pub fn code_system_prompt(language: Option<&str>) -> String {
    match language {
        Some(language) => format!(
            "You are an expert programmer. Generate clean, efficient, and \
             well-documented code. Use the {language} programming language."
        ),
        None => "You are an expert programmer. Generate clean, efficient, and \
                 well-documented code."
            .to_string(),
    }
}

/// Analysis template for `analyze_code`, embedding the code block and the
/// caller's question.
pub fn analysis_prompt(code: &str, question: &str) -> String {
    format!(
        "Code to analyze:\n\
         ```\n\
         {code}\n\
         ```\n\
         \n\
         Question: {question}\n\
         \n\
         Please provide a detailed analysis focusing on:\n\
         - Code quality and best practices\n\
         - Potential bugs or issues\n\
         - Performance considerations\n\
         - Suggestions for improvement\n"
    )
}

/// System prompt for `analyze_code`.
pub fn analysis_system_prompt() -> &'static str {
    "You are an expert code analyst. Provide clear, accurate, and detailed \
     analysis of code. Focus on best practices, potential issues, and \
     improvements."
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_prompt_mentions_language() {
        let prompt = code_system_prompt(Some("Rust"));
        assert!(prompt.contains("Rust programming language"));

        let agnostic = code_system_prompt(None);
        assert!(!agnostic.contains("programming language."));
    }

    #[test]
    fn test_synthesis_is_deterministic() {
        assert_eq!(code_system_prompt(Some("Go")), code_system_prompt(Some("Go")));
        assert_eq!(
            analysis_prompt("fn main() {}", "is this idiomatic?"),
            analysis_prompt("fn main() {}", "is this idiomatic?")
        );
    }

    #[test]
    fn test_analysis_prompt_embeds_code_and_question() {
        let prompt = analysis_prompt("let x = 1;", "why?");
        assert!(prompt.contains("let x = 1;"));
        assert!(prompt.contains("Question: why?"));
        assert!(prompt.contains("Potential bugs"));
    }
}
