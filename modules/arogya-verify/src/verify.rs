use std::sync::Arc;

use ai_client::{Agent, Gemini, OutputBuilder, PromptBuilder};
use anyhow::Result;
use tracing::info;

use arogya_common::{Language, TrustedSearcher, VerificationResult};

use crate::tools::SearchTrustedSourcesTool;

/// Search turns plus the final structured answer.
const MAX_TOOL_TURNS: usize = 4;

const VERIFY_PREAMBLE: &str = "\
You are a health expert responsible for verifying health claims.

Your task is:
1. You MUST use the 'search_trusted_sources' tool to search for evidence related to the claim before answering. Do not use your general knowledge.
2. Based only on the search results from the tool, classify the claim strictly as one of: \"Verified Claim\" (if proven true by sources), \"Debunked Myth\" (if proven false by sources), \"Unproven Claim\" (if sources show a lack of evidence), or \"Not Applicable\" (if the text is not a health claim).
3. Provide a concise, one-sentence summary for the 'truthfulness' field, explaining the classification based on the search results.
4. Provide helpful, actionable tips for the 'tips' field.
5. Suggest a clear solution or course of action for the 'solution' field.
6. List the full URLs from the search results that you used for verification in the 'sources' field.

Your entire response, including all fields, must be in the same language as the original claim. If the search tool returns no relevant results, classify the claim as \"Unproven Claim\" and explain that no information was found in trusted sources.";

/// Runs one claim through the tool-augmented verification model.
pub struct ClaimVerifier {
    agent: Gemini,
}

impl ClaimVerifier {
    pub fn new(agent: Gemini, searcher: Arc<dyn TrustedSearcher>) -> Self {
        let agent = agent.tool(SearchTrustedSourcesTool::new(searcher));
        Self { agent }
    }

    /// Verify a claim. Fails if the model call errors or never produces
    /// structured output; the handler above converts that to a user message.
    pub async fn verify(&self, claim: &str, language: Language) -> Result<VerificationResult> {
        info!(language = %language, "Verifying health claim");

        let mut result: VerificationResult = self
            .agent
            .prompt(user_prompt(claim, language))
            .preamble(VERIFY_PREAMBLE)
            .multi_turn(MAX_TOOL_TURNS)
            .output::<VerificationResult>()
            .send()
            .await?;
        result.sources = well_formed_sources(result.sources);

        info!(status = %result.status, sources = result.sources.len(), "Claim verified");
        Ok(result)
    }
}

/// The model occasionally echoes bare domains or prose into the sources
/// field; keep only entries that are actual URLs.
fn well_formed_sources(sources: Vec<String>) -> Vec<String> {
    sources
        .into_iter()
        .filter(|s| s.starts_with("https://") || s.starts_with("http://"))
        .collect()
}

fn user_prompt(claim: &str, language: Language) -> String {
    format!(
        "The user has submitted a health claim for verification.\n\
         Claim: \"{}\"\n\
         Language of Claim: \"{}\" ({})",
        claim,
        language.tag(),
        language.name(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use ai_client::StructuredOutput;

    #[test]
    fn test_user_prompt_carries_claim_and_language() {
        let prompt = user_prompt("Drinking turmeric milk daily boosts immunity", Language::En);
        assert!(prompt.contains("Drinking turmeric milk daily boosts immunity"));
        assert!(prompt.contains("\"en\""));
        assert!(prompt.contains("English"));
    }

    #[test]
    fn test_preamble_pins_tool_and_no_evidence_contract() {
        assert!(VERIFY_PREAMBLE.contains("search_trusted_sources"));
        assert!(VERIFY_PREAMBLE.contains("Unproven Claim"));
        assert!(VERIFY_PREAMBLE.contains("Do not use your general knowledge"));
    }

    #[test]
    fn test_sources_keep_only_urls() {
        let sources = vec![
            "https://www.who.int/news-room/fact-sheets".to_string(),
            "who.int".to_string(),
            "See the ICMR guidelines".to_string(),
            "http://icmr.gov.in/guidelines".to_string(),
        ];
        assert_eq!(
            well_formed_sources(sources),
            vec![
                "https://www.who.int/news-room/fact-sheets".to_string(),
                "http://icmr.gov.in/guidelines".to_string(),
            ]
        );
    }

    #[test]
    fn test_result_schema_has_all_fields() {
        let schema = VerificationResult::gemini_schema();
        let properties = schema
            .get("properties")
            .and_then(|p| p.as_object())
            .expect("schema should be an object with properties");
        for field in ["status", "truthfulness", "tips", "solution", "sources"] {
            assert!(properties.contains_key(field), "missing field {field}");
        }

        let schema_str = serde_json::to_string(&schema).unwrap();
        assert!(schema_str.contains("Verified Claim"));
        assert!(schema_str.contains("Not Applicable"));
    }
}
