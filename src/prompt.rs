//! Prompt templates and response utilities shared by both answer paths.
//!
//! Every prompt is built from an explicit template with required fields,
//! so a missing piece of context is a construction-time error rather than
//! a malformed string at the model boundary.

use crate::models::RankedContext;

/// Degraded answer used when retrieval finds nothing to ground a response
pub fn insufficient_information_answer() -> String {
    "I don't have enough information to answer that. \
     Try rephrasing the question or making it less complex."
        .to_string()
}

/// Build the RAG synthesis prompt: numbered contexts in ranked order,
/// then the question, then the integration instruction.
pub fn synthesis_prompt(question: &str, context: &RankedContext) -> String {
    let numbered = context
        .hits()
        .iter()
        .enumerate()
        .map(|(i, hit)| format!("{}. {}", i + 1, hit.text))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are an expert AI assistant. Use the numbered contexts to answer concisely,\n\
         integrating them into one coherent answer.\n\
         \n\
         **User Question:**\n\
         {question}\n\
         \n\
         **Contexts:**\n\
         {numbered}\n\
         \n\
         Now generate your final answer."
    )
}

/// Build the SQL generation prompt around the serialized schema
pub fn sql_generation_prompt(schema_json: &str, dialect: &str, question: &str) -> String {
    format!(
        "You are an expert SQL generator.\n\
         Below is the exact database schema in JSON:\n\
         {schema_json}\n\
         \n\
         User question:\n\
         {question}\n\
         \n\
         Write exactly one valid SQL statement (no markdown fences) \
         using {dialect} syntax to answer the question.\n"
    )
}

/// Build the second-stage prompt that explains the executed rows
pub fn sql_explanation_prompt(question: &str, sql: &str, rows_json: &str) -> String {
    format!(
        "The human asked: {question}\n\
         \n\
         I ran this SQL:\n\
         {sql}\n\
         \n\
         and got these rows in JSON:\n\
         {rows_json}\n\
         \n\
         Please write a concise, plain-English answer based only on those results."
    )
}

/// Strip accidental markdown fences from a generated statement.
///
/// The generation prompt forbids fences, but the model does not always
/// obey, so the SQL path strips them before execution.
pub fn strip_code_fences(text: &str) -> String {
    let trimmed = text.trim();

    if !trimmed.starts_with("```") {
        return trimmed.to_string();
    }

    let without_open = match trimmed.find('\n') {
        Some(idx) => &trimmed[idx + 1..],
        None => return String::new(),
    };

    let body = without_open
        .strip_suffix("```")
        .unwrap_or(without_open)
        .trim_end_matches('\n');

    body.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RankedContext, RetrievalHit};

    fn context(snippets: &[(&str, f32)]) -> RankedContext {
        let hits = snippets
            .iter()
            .map(|(text, score)| RetrievalHit {
                collection: "skills".to_string(),
                text: text.to_string(),
                score: *score,
            })
            .collect();
        RankedContext::from_hits(hits, 20)
    }

    #[test]
    fn test_synthesis_prompt_numbers_contexts_in_rank_order() {
        let ctx = context(&[("manager fact", 0.4), ("skill fact", 0.91)]);
        let prompt = synthesis_prompt("Who knows SQL?", &ctx);

        assert!(prompt.contains("1. skill fact"));
        assert!(prompt.contains("2. manager fact"));
        assert!(prompt.contains("Who knows SQL?"));
        // Rank order, not insertion order
        assert!(prompt.find("1. skill fact").unwrap() < prompt.find("2. manager fact").unwrap());
    }

    #[test]
    fn test_sql_generation_prompt_embeds_schema_and_dialect() {
        let prompt = sql_generation_prompt(r#"{"products": {}}"#, "PostgreSQL", "How many products?");
        assert!(prompt.contains(r#"{"products": {}}"#));
        assert!(prompt.contains("PostgreSQL syntax"));
        assert!(prompt.contains("exactly one valid SQL statement"));
    }

    #[test]
    fn test_strip_code_fences_plain() {
        assert_eq!(strip_code_fences("  SELECT 1  "), "SELECT 1");
    }

    #[test]
    fn test_strip_code_fences_with_language_tag() {
        let fenced = "```sql\nSELECT COUNT(*) FROM products;\n```";
        assert_eq!(strip_code_fences(fenced), "SELECT COUNT(*) FROM products;");
    }

    #[test]
    fn test_strip_code_fences_without_language_tag() {
        let fenced = "```\nSELECT 1;\n```";
        assert_eq!(strip_code_fences(fenced), "SELECT 1;");
    }
}
